pub mod print;


use crate::Result;

/// Where the verification flow reports progress. Production uses
/// [`print::PrintOutputter`] over stdout; tests capture into a string.
pub trait Outputter {
    /// A section heading, rendered as a dashed banner.
    fn banner(&mut self, message: &str) -> Result<()>;

    /// A labelled scalar, e.g. an extracted id.
    fn value(&mut self, label: &str, value: &str) -> Result<()>;

    /// A plain progress line.
    fn note(&mut self, message: &str) -> Result<()>;

    /// A raw response body, prettified when it parses as a JSON object.
    fn body(&mut self, body: &str) -> Result<()>;
}

fn prettify_response_body(body: &str) -> String {
    match serde_json::from_str(body) {
        Ok(serde_json::Value::Object(response_body)) => {
            serde_json::to_string_pretty(&response_body).unwrap()
        }
        _ => String::from(body),
    }
}
