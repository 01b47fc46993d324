//! The rules service client. Every operation maps one-to-one onto an
//! endpoint under `<host>/api/v1` and returns the raw response body; any
//! non-2xx status becomes an error carrying the status line.

use crate::http_client::reqwest::ReqwestHttpClient;
use crate::http_client::{Body, ClientConfig, HttpClient, Method, Request};
use crate::model::{Configuration, NewVersion, PartnerName, QpsUpdate, Rule, TokenResponse};
use crate::Result;
use anyhow::{anyhow, bail, Context};
use reqwest::Url;
use serde::Serialize;


const CONTENT_TYPE_JSON: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

/// Session lifecycle: [`ApiClient::get_token`] moves the client from
/// `Anonymous` to `Authenticated`, after which [`ApiClient::auth_header`]
/// can hand out bearer options.
#[derive(Debug, Clone)]
enum Session {
    Anonymous,
    Authenticated(BearerToken),
}

/// Per-call header configuration. The service recognizes two options: a
/// content type and a bearer authorization. Callers pass these explicitly
/// on every operation, so which calls authenticate is visible at the call
/// site.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    content_type: Option<&'static str>,
    authorization: Option<BearerToken>,
}

impl CallOptions {
    pub fn none() -> CallOptions {
        CallOptions::default()
    }

    pub fn json() -> CallOptions {
        CallOptions {
            content_type: Some(CONTENT_TYPE_JSON),
            authorization: None,
        }
    }

    pub fn authorization(mut self, token: BearerToken) -> CallOptions {
        self.authorization = Some(token);
        self
    }

    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![];
        if let Some(content_type) = self.content_type {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }
        if let Some(token) = &self.authorization {
            headers.push(("Authorization".to_string(), token.header_value()));
        }
        headers
    }
}

pub struct ApiClient<C: HttpClient = ReqwestHttpClient> {
    base: Url,
    http: C,
    session: Session,
}

impl ApiClient<ReqwestHttpClient> {
    pub fn new(host: &str, config: ClientConfig) -> Result<ApiClient> {
        Self::with_http_client(host, ReqwestHttpClient::create(config))
    }
}

impl<C: HttpClient> ApiClient<C> {
    /// Build a client over any transport. The API lives under `/api/v1` on
    /// the given host.
    pub fn with_http_client(host: &str, http: C) -> Result<ApiClient<C>> {
        let mut base = Url::parse(host).with_context(|| format!("invalid host URL: {}", host))?;
        base.path_segments_mut()
            .map_err(|_| anyhow!("host URL cannot carry a path: {}", host))?
            .pop_if_empty()
            .extend(["api", "v1"]);
        Ok(ApiClient {
            base,
            http,
            session: Session::Anonymous,
        })
    }

    /// Bearer options for the current session. Fails until
    /// [`get_token`](Self::get_token) has run.
    pub fn auth_header(&self) -> Result<CallOptions> {
        match &self.session {
            Session::Authenticated(token) => Ok(CallOptions::none().authorization(token.clone())),
            Session::Anonymous => bail!("not authenticated: call get_token first"),
        }
    }

    /// Exchange credentials for a bearer token (OAuth2 password grant) and
    /// store it as the session token. Returns the raw token response.
    pub fn get_token(&mut self, username: &str, password: &str) -> Result<String> {
        let url = self.endpoint(&["oauth2", "token"])?;
        let form = vec![
            ("username".to_string(), username.to_string()),
            ("password".to_string(), password.to_string()),
            ("grant_type".to_string(), "password".to_string()),
        ];
        let body = self.execute(Method::Post, url, CallOptions::none(), Some(Body::Form(form)))?;
        let token: TokenResponse =
            serde_json::from_str(&body).context("token response without accessToken")?;
        self.session = Session::Authenticated(BearerToken(token.access_token));
        Ok(body)
    }

    pub fn get_user(&self, options: CallOptions) -> Result<String> {
        let url = self.endpoint(&["user"])?;
        self.get(url, options)
    }

    pub fn get_user_demand_config(&self, options: CallOptions) -> Result<String> {
        let url = self.endpoint(&["user", "configuration", "demand-partner"])?;
        self.get(url, options)
    }

    pub fn create_dp(&self, name: &str, options: CallOptions) -> Result<String> {
        let url = self.endpoint(&["demand-partners"])?;
        self.post_json(
            url,
            &PartnerName {
                name: name.to_string(),
            },
            options,
        )
    }

    pub fn get_dp(&self, dp_id: &str, options: CallOptions) -> Result<String> {
        let url = self.endpoint(&["demand-partners", dp_id])?;
        self.get(url, options)
    }

    pub fn get_all_dps(&self, limit: u32, offset: u32, options: CallOptions) -> Result<String> {
        let mut url = self.endpoint(&["demand-partners"])?;
        paginate(&mut url, limit, offset);
        self.get(url, options)
    }

    pub fn create_sp(&self, name: &str, options: CallOptions) -> Result<String> {
        let url = self.endpoint(&["supply-partners"])?;
        self.post_json(
            url,
            &PartnerName {
                name: name.to_string(),
            },
            options,
        )
    }

    pub fn get_sp(&self, sp_id: &str, options: CallOptions) -> Result<String> {
        let url = self.endpoint(&["supply-partners", sp_id])?;
        self.get(url, options)
    }

    pub fn get_all_sps(&self, limit: u32, offset: u32, options: CallOptions) -> Result<String> {
        let mut url = self.endpoint(&["supply-partners"])?;
        paginate(&mut url, limit, offset);
        self.get(url, options)
    }

    /// Link a demand partner to a supply partner. The response carries the
    /// id of the version the new configuration produced, under `vId`.
    pub fn add_config(
        &self,
        dp_id: &str,
        sp_id: &str,
        config: &Configuration,
        options: CallOptions,
    ) -> Result<String> {
        let url = self.endpoint(&["demand-partners", dp_id, "supply-partners", sp_id])?;
        self.post_json(url, config, options)
    }

    pub fn get_config(&self, dp_id: &str, sp_id: &str, options: CallOptions) -> Result<String> {
        let url = self.endpoint(&["demand-partners", dp_id, "supply-partners", sp_id])?;
        self.get(url, options)
    }

    pub fn get_all_configs_for_dp(&self, dp_id: &str, options: CallOptions) -> Result<String> {
        let url = self.endpoint(&["demand-partners", dp_id, "supply-partners"])?;
        self.get(url, options)
    }

    pub fn get_version(&self, v_id: &str, options: CallOptions) -> Result<String> {
        let url = self.endpoint(&["versions", v_id])?;
        self.get(url, options)
    }

    pub fn create_empty_version(
        &self,
        sp_id: &str,
        max_qps: u64,
        options: CallOptions,
    ) -> Result<String> {
        let url = self.endpoint(&["versions", "create"])?;
        self.post_json(
            url,
            &NewVersion {
                sp_id: sp_id.to_string(),
                max_qps,
            },
            options,
        )
    }

    pub fn get_all_versions(&self, limit: u32, offset: u32, options: CallOptions) -> Result<String> {
        let mut url = self.endpoint(&["versions"])?;
        paginate(&mut url, limit, offset);
        self.get(url, options)
    }

    /// Fork a new version from an existing one, duplicating its rules under
    /// fresh ids.
    pub fn copy_version(&self, v_id: &str, options: CallOptions) -> Result<String> {
        let url = self.endpoint(&["versions", v_id, "copy"])?;
        self.execute(Method::Post, url, options, None)
    }

    pub fn update_version_qps(
        &self,
        v_id: &str,
        update: &QpsUpdate,
        options: CallOptions,
    ) -> Result<String> {
        let url = self.endpoint(&["versions", v_id, "qps"])?;
        self.post_json(url, update, options)
    }

    /// Terminal transition: the version becomes the active configuration
    /// and stops accepting mutations.
    pub fn publish(&self, v_id: &str, options: CallOptions) -> Result<String> {
        let url = self.endpoint(&["versions", v_id, "publish"])?;
        self.execute(Method::Post, url, options, None)
    }

    pub fn save_rule(&self, v_id: &str, rule: &Rule, options: CallOptions) -> Result<String> {
        let url = self.endpoint(&["versions", v_id, "rule", "add"])?;
        self.post_json(url, rule, options)
    }

    pub fn update_rule(&self, v_id: &str, rule: &Rule, options: CallOptions) -> Result<String> {
        let url = self.endpoint(&["versions", v_id, "rule", "replace"])?;
        self.post_json(url, rule, options)
    }

    pub fn remove_rule(&self, v_id: &str, r_id: &str, options: CallOptions) -> Result<String> {
        let url = self.endpoint(&["versions", v_id, "rule", "remove", r_id])?;
        self.execute(Method::Delete, url, options, None)
    }

    pub fn get_rule(&self, r_id: &str, options: CallOptions) -> Result<String> {
        let url = self.endpoint(&["rules", r_id])?;
        self.get(url, options)
    }

    /// Search feature values of one attribute within a partner pairing.
    #[allow(clippy::too_many_arguments)]
    pub fn get_features(
        &self,
        dp_id: &str,
        sp_id: &str,
        sp_type_id: &str,
        attr: &str,
        query: &str,
        limit: u32,
        offset: u32,
        options: CallOptions,
    ) -> Result<String> {
        let mut url = self.endpoint(&["features"])?;
        url.query_pairs_mut()
            .append_pair("dpId", dp_id)
            .append_pair("spId", sp_id)
            .append_pair("spTypeId", sp_type_id)
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string())
            .append_pair("attr", attr)
            .append_pair("q", query);
        self.get(url, options)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("base URL cannot be extended: {}", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: Url, options: CallOptions) -> Result<String> {
        self.execute(Method::Get, url, options, None)
    }

    fn post_json<T: Serialize>(&self, url: Url, payload: &T, options: CallOptions) -> Result<String> {
        let json = serde_json::to_string(payload)?;
        self.execute(Method::Post, url, options, Some(Body::Json(json)))
    }

    fn execute(
        &self,
        method: Method,
        url: Url,
        options: CallOptions,
        body: Option<Body>,
    ) -> Result<String> {
        let request_line = format!("{} {}", method, url);
        let request = Request {
            method,
            target: url,
            headers: options.headers(),
            body,
        };
        let response = self.http.execute(&request)?;
        if !response.is_success() {
            let detail = match &response.body {
                Some(body) => format!(": {}", body),
                None => String::new(),
            };
            bail!("{} failed with {}{}", request_line, response.status, detail);
        }
        Ok(response.into_body())
    }
}

fn paginate(url: &mut Url, limit: u32, offset: u32) {
    url.query_pairs_mut()
        .append_pair("limit", &limit.to_string())
        .append_pair("offset", &offset.to_string());
}
