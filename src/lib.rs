//! # rules-api-client
//!
//! A client for the demand/supply partner rules service REST API, plus the
//! `verify-api` binary that exercises the whole surface end to end against a
//! running service.
//!
//! The API manages four kinds of server-owned resources:
//!
//! - **demand partners** and **supply partners** (buyers and exchanges),
//! - **configurations** linking one demand partner to one supply partner,
//! - **versions**, the mutable rule sets produced by configurations, and
//! - **rules**, per-attribute allow/exclude conditions inside a version.
//!
//! All calls are synchronous and return the raw JSON response body; parsing
//! is left to the caller apart from the small extraction helpers in
//! [`model`]. Authentication is a password-grant token exchange, after which
//! [`api::ApiClient::auth_header`] produces the bearer options for calls
//! that need them:
//!
//! ```no_run
//! use rules_api_client::api::{ApiClient, CallOptions};
//! use rules_api_client::http_client::ClientConfig;
//! use rules_api_client::model;
//!
//! # fn main() -> rules_api_client::Result<()> {
//! let mut client = ApiClient::new("http://localhost:9000", ClientConfig::default())?;
//! client.get_token("neil-test", "secret")?;
//! let user = client.get_user(client.auth_header()?)?;
//! let dp_id = model::extract_dp_id(&user)?;
//! let dp = client.get_dp(&dp_id, CallOptions::none())?;
//! println!("{}", dp);
//! # Ok(())
//! # }
//! ```
//!
//! The verification flow in [`verify`] is the scripted acceptance run:
//! authenticate, create a demand and a supply partner, link them with a
//! configuration, then push a version through rule add/replace/remove,
//! copy, QPS update, and publish.

pub mod api;
pub mod http_client;
pub mod model;
pub mod output;
pub mod verify;

pub type Result<T> = anyhow::Result<T>;

pub use api::{ApiClient, CallOptions};
pub use http_client::ClientConfig;
