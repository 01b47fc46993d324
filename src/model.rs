//! Wire shapes for the rules service, plus the handful of field-extraction
//! helpers the verification flow uses. Request bodies are typed and
//! serialized with serde; response bodies stay raw strings, so the helpers
//! here go through `serde_json::Value`.

use crate::Result;
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct PartnerName {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigEndpoint {
    pub host: String,
    pub port: u16,
}

/// Body of `POST /demand-partners/{dpId}/supply-partners/{spId}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub max_qps: u64,
    pub config_endpoint: ConfigEndpoint,
}

/// Body of `POST /versions/create`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVersion {
    pub sp_id: String,
    pub max_qps: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    Allow,
    Exclude,
}

/// Per-attribute condition: what to do for matching values, what to do when
/// the attribute is absent from the request, and the exception list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub default: Policy,
    pub undefined: Policy,
    pub exceptions: Vec<String>,
}

/// A traffic-shaping rule. `id` is omitted when adding a rule and set when
/// replacing one. Attribute keys observed on the wire: carrier, handset,
/// os, wifi, appAndSite, adSize, country, region, city, zip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub conditions: BTreeMap<String, Condition>,
}

/// Body of `POST /versions/{id}/qps`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QpsUpdate {
    pub max_qps: u64,
    pub rules: Vec<RuleQps>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleQps {
    pub id: String,
    pub desired_qps: u64,
}

/// The slice of a `GET /versions/{id}` response the verification flow needs
/// to read back: enough to address rules by position when building a
/// [`QpsUpdate`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: String,
    pub max_qps: u64,
    #[serde(default)]
    pub rules: Vec<VersionRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionRule {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
}

/// Pull a top-level field out of a raw response body. Numeric ids are
/// rendered as their decimal form.
pub fn extract_id(field: &str, body: &str) -> Result<String> {
    let value: serde_json::Value =
        serde_json::from_str(body).with_context(|| format!("response is not JSON: {}", body))?;
    match value.get(field) {
        Some(serde_json::Value::String(id)) => Ok(id.clone()),
        Some(serde_json::Value::Number(id)) => Ok(id.to_string()),
        Some(other) => Err(anyhow!("field '{}' is not an id: {}", field, other)),
        None => Err(anyhow!("no field '{}' in response: {}", field, body)),
    }
}

/// The authenticated user's demand partner id, at `organization.id.dpId`.
pub fn extract_dp_id(body: &str) -> Result<String> {
    let value: serde_json::Value =
        serde_json::from_str(body).with_context(|| format!("response is not JSON: {}", body))?;
    value
        .pointer("/organization/id/dpId")
        .and_then(serde_json::Value::as_str)
        .map(String::from)
        .ok_or_else(|| anyhow!("no organization.id.dpId in response: {}", body))
}

/// The ids of every entry under `supplyPartners`.
pub fn extract_sp_ids(body: &str) -> Result<Vec<String>> {
    let value: serde_json::Value =
        serde_json::from_str(body).with_context(|| format!("response is not JSON: {}", body))?;
    value
        .get("supplyPartners")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| anyhow!("no supplyPartners list in response: {}", body))?
        .iter()
        .map(|entry| {
            entry
                .get("id")
                .and_then(serde_json::Value::as_str)
                .map(String::from)
                .ok_or_else(|| anyhow!("supply partner entry without id: {}", entry))
        })
        .collect()
}

pub fn extract_first_sp_id(body: &str) -> Result<String> {
    extract_sp_ids(body)?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("empty supplyPartners list in response: {}", body))
}
