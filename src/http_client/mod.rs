use crate::Result;
use ::reqwest::Url;
use std::fmt;


pub mod reqwest;

/// Transport seam. The API client is generic over this so tests can swap in
/// a recording fake; production code uses [`reqwest::ReqwestHttpClient`].
pub trait HttpClient {
    fn create(config: ClientConfig) -> Self
    where
        Self: Sized;

    fn execute(&self, request: &Request) -> Result<Response>;
}

#[derive(Debug, Default, Clone)]
pub struct ClientConfig {
    pub accept_invalid_certs: bool,
}

impl ClientConfig {
    pub fn new(accept_invalid_certs: bool) -> Self {
        ClientConfig {
            accept_invalid_certs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match *self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        };
        f.write_str(method)
    }
}

/// Request payload. The token endpoint is the only form-encoded call on the
/// API; everything else carries JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Json(String),
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub target: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status_code: u16,
    pub status: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// The body, or an empty string when the server sent none.
    pub fn into_body(self) -> String {
        self.body.unwrap_or_default()
    }
}
