use crate::output::{prettify_response_body, Outputter};
use crate::Result;
use std::io::Write;

pub struct PrintOutputter<'a, W: Write> {
    writer: &'a mut W,
}

impl<'a, W: Write> PrintOutputter<'a, W> {
    pub fn new(writer: &mut W) -> PrintOutputter<W> {
        PrintOutputter { writer }
    }
}

impl<'a, W: Write> Outputter for PrintOutputter<'a, W> {
    fn banner(&mut self, message: &str) -> Result<()> {
        let banner = format!(
            "--------------------\n\t{message}\n--------------------\n",
            message = message
        );
        self.writer.write_all(banner.as_bytes())?;
        Ok(())
    }

    fn value(&mut self, label: &str, value: &str) -> Result<()> {
        let line = format!("{label}: {value}\n", label = label, value = value);
        self.writer.write_all(line.as_bytes())?;
        Ok(())
    }

    fn note(&mut self, message: &str) -> Result<()> {
        let line = format!("{}\n", message);
        self.writer.write_all(line.as_bytes())?;
        Ok(())
    }

    fn body(&mut self, body: &str) -> Result<()> {
        let body = format!("{}\n", prettify_response_body(body));
        self.writer.write_all(body.as_bytes())?;
        Ok(())
    }
}
