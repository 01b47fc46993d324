use crate::http_client::{Body, ClientConfig, HttpClient, Method, Request, Response};
use crate::Result;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::HeaderMap;
use std::convert::{TryFrom, TryInto};

pub struct ReqwestHttpClient {
    client: Client,
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::create(ClientConfig::default())
    }
}

impl HttpClient for ReqwestHttpClient {
    fn create(config: ClientConfig) -> ReqwestHttpClient
    where
        Self: Sized,
    {
        let client = Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .expect("default TLS backend");

        ReqwestHttpClient { client }
    }

    fn execute(&self, request: &Request) -> Result<Response> {
        let Request {
            method,
            target,
            headers,
            body,
        } = request;
        let mut request_builder = self.client.request(method.into(), target.clone());
        request_builder = set_headers(headers, request_builder);
        if let Some(body) = body {
            request_builder = set_body(body, request_builder);
        }
        let response = request_builder.send()?;

        response.try_into()
    }
}

fn set_headers(
    headers: &[(String, String)],
    mut request_builder: RequestBuilder,
) -> RequestBuilder {
    for (key, value) in headers {
        request_builder = request_builder.header(key, value);
    }
    request_builder
}

fn set_body(body: &Body, request_builder: RequestBuilder) -> RequestBuilder {
    match body {
        Body::Json(json) => request_builder.body(json.clone()),
        Body::Form(fields) => request_builder.form(fields),
    }
}

impl From<&Method> for reqwest::Method {
    fn from(method: &Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

struct Headers(Vec<(String, String)>);

impl TryFrom<reqwest::blocking::Response> for Response {
    type Error = anyhow::Error;

    fn try_from(response: reqwest::blocking::Response) -> Result<Self> {
        let Headers(headers) = response.headers().try_into()?;
        Ok(Response {
            status_code: response.status().as_u16(),
            status: response.status().to_string(),
            headers,
            body: match response.text()? {
                body if !body.is_empty() => Some(body),
                _ => None,
            },
        })
    }
}

impl TryFrom<&HeaderMap> for Headers {
    type Error = anyhow::Error;

    fn try_from(value: &HeaderMap) -> Result<Self> {
        let mut headers = vec![];
        for (header_name, header_value) in value.iter() {
            headers.push((header_name.to_string(), header_value.to_str()?.to_string()))
        }
        Ok(Headers(headers))
    }
}
