//! The end-to-end verification sequence: a fixed, ordered walk across the
//! whole API surface, printing each response for human inspection. This is
//! the acceptance run behind the `verify-api` binary; it stops at the first
//! failing call.

use crate::api::{ApiClient, CallOptions};
use crate::http_client::HttpClient;
use crate::model::{
    self, Condition, ConfigEndpoint, Configuration, Policy, QpsUpdate, Rule, RuleQps, Version,
};
use crate::output::Outputter;
use crate::Result;
use anyhow::Context;
use std::collections::BTreeMap;
use uuid::Uuid;


pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Run the whole verification sequence against the service behind `client`.
///
/// Order matters: partners must exist before configurations, configurations
/// produce the version the rule steps mutate, and the published copy is the
/// terminal step.
pub fn run<C: HttpClient>(
    client: &mut ApiClient<C>,
    out: &mut dyn Outputter,
    credentials: &Credentials,
) -> Result<()> {
    let base_id = run_suffix();
    out.value("base", &base_id)?;

    // Authentication and the caller's own organization context.
    out.banner("Auth")?;
    let token = client.get_token(&credentials.username, &credentials.password)?;
    out.value("token", &model::extract_id("accessToken", &token)?)?;
    let authenticated_user = client.get_user(client.auth_header()?)?;
    out.value("authenticatedUser", &authenticated_user)?;
    let authenticated_dp_id = model::extract_dp_id(&authenticated_user)?;
    out.value("authenticated dpId", &authenticated_dp_id)?;
    let authenticated_supply_partners = client.get_user_demand_config(client.auth_header()?)?;
    out.value(
        "authenticated SupplyPartners",
        &authenticated_supply_partners,
    )?;
    let authenticated_sp_ids = model::extract_sp_ids(&authenticated_supply_partners)?;
    out.value("authenticated spIds", &authenticated_sp_ids.join(", "))?;
    let authenticated_sp_id = authenticated_sp_ids
        .first()
        .context("authenticated user has no supply partners")?;
    out.value("using first spId", authenticated_sp_id)?;

    // Partner creation is administrative and bypasses auth on this service.
    out.banner("Demand Partners")?;
    let dp_id = model::extract_id(
        "id",
        &client.create_dp(&format!("dsp-{}", base_id), CallOptions::json())?,
    )?;
    out.value("dp_id", &dp_id)?;
    out.body(&client.get_dp(&dp_id, CallOptions::none())?)?;
    out.body(&client.get_all_dps(5, 0, CallOptions::none())?)?;

    out.banner("Exchanges (Supply Partners)")?;
    let sp_id = model::extract_id(
        "id",
        &client.create_sp(&format!("exchange-{}", base_id), CallOptions::json())?,
    )?;
    out.value("sp_id", &sp_id)?;
    out.body(&client.get_sp(&sp_id, CallOptions::none())?)?;
    out.body(&client.get_all_sps(5, 0, CallOptions::none())?)?;

    out.banner("Configurations")?;
    out.body(&client.get_config(&authenticated_dp_id, authenticated_sp_id, CallOptions::none())?)?;
    out.body(&client.get_all_configs_for_dp(&authenticated_dp_id, CallOptions::none())?)?;
    let config = Configuration {
        max_qps: 20000,
        config_endpoint: ConfigEndpoint {
            host: "rules-verify-test.example.com".to_string(),
            port: 9000,
        },
    };
    let v_id = model::extract_id(
        "vId",
        &client.add_config(&dp_id, &sp_id, &config, CallOptions::json())?,
    )?;
    out.value("New configuration created version id", &v_id)?;

    out.banner("Versions")?;
    out.body(&client.get_all_versions(10, 0, client.auth_header()?)?)?;
    out.body(&client.get_all_configs_for_dp(&dp_id, client.auth_header()?)?)?;

    out.banner("Create Empty Version for Authenticated User")?;
    let ev = client.create_empty_version(authenticated_sp_id, 10017, client.auth_header()?)?;
    let ev_id = model::extract_id("id", &ev)?;
    out.value("Empty Version Id", &ev_id)?;
    out.body(&client.get_all_versions(10, 0, client.auth_header()?)?)?;

    out.banner("Rules")?;
    let rule = sample_rule(&run_suffix());
    let r_id = model::extract_id("id", &client.save_rule(&v_id, &rule, CallOptions::json())?)?;
    out.value("rule id", &r_id)?;
    out.body(&client.get_rule(&r_id, CallOptions::none())?)?;

    let rule_update = updated_rule(&r_id, &run_suffix());
    client.update_rule(&v_id, &rule_update, CallOptions::json())?;
    out.body(&client.get_rule(&r_id, CallOptions::none())?)?;
    out.note("should only be one (1) rule")?;
    out.body(&client.get_version(&v_id, CallOptions::none())?)?;
    client.save_rule(&v_id, &rule, CallOptions::json())?;
    out.note("should only be two (2) rules")?;
    out.body(&client.get_version(&v_id, CallOptions::none())?)?;

    let rr_id = model::extract_id("id", &client.save_rule(&ev_id, &rule, CallOptions::json())?)?;
    out.note("before remove")?;
    out.body(&client.get_version(&ev_id, CallOptions::none())?)?;
    out.value("removing rule", &rr_id)?;
    out.body(&client.remove_rule(&ev_id, &rr_id, CallOptions::none())?)?;
    out.note("after remove")?;
    out.body(&client.get_version(&ev_id, CallOptions::none())?)?;

    out.note("orig:")?;
    out.body(&client.get_version(&v_id, CallOptions::none())?)?;
    let cv_id = model::extract_id("id", &client.copy_version(&v_id, CallOptions::none())?)?;
    out.note("copy:")?;
    out.body(&client.get_version(&cv_id, CallOptions::none())?)?;

    out.note("update qps")?;
    let copied: Version = serde_json::from_str(&client.get_version(&cv_id, CallOptions::none())?)
        .context("copied version did not parse")?;
    let qps = QpsUpdate {
        max_qps: 12000,
        rules: vec![
            RuleQps {
                id: copied
                    .rules
                    .first()
                    .context("copied version has no rules")?
                    .id
                    .clone(),
                desired_qps: 34000,
            },
            RuleQps {
                id: copied
                    .rules
                    .get(1)
                    .context("copied version has fewer than two rules")?
                    .id
                    .clone(),
                desired_qps: 7000,
            },
        ],
    };
    client.update_version_qps(&cv_id, &qps, CallOptions::json())?;
    out.note("after update")?;
    out.body(&client.get_version(&cv_id, CallOptions::none())?)?;

    out.note("publish...")?;
    out.body(&client.publish(&cv_id, CallOptions::none())?)?;

    Ok(())
}

/// Lowercase suffix so repeated runs create distinct partner and rule names.
fn run_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..10].to_string()
}

fn condition(default: Policy, undefined: Policy, exceptions: &[&str]) -> Condition {
    Condition {
        default,
        undefined,
        exceptions: exceptions.iter().map(|e| e.to_string()).collect(),
    }
}

/// The full ten-attribute rule the add step submits.
fn sample_rule(suffix: &str) -> Rule {
    use Policy::{Allow, Exclude};
    let mut conditions = BTreeMap::new();
    conditions.insert(
        "carrier".to_string(),
        condition(Allow, Allow, &["AT&T", "Verizon"]),
    );
    conditions.insert(
        "handset".to_string(),
        condition(Exclude, Allow, &["F536F6D652D4D4647-F536F6D652D4D6F64656C"]),
    );
    conditions.insert(
        "os".to_string(),
        condition(Exclude, Allow, &["F536F6D652D4F53-F536F6D652D56657273696F6E"]),
    );
    conditions.insert("wifi".to_string(), condition(Exclude, Exclude, &[]));
    conditions.insert(
        "appAndSite".to_string(),
        condition(Allow, Exclude, &["e5276ba5-2746-12b5-c64a-1112a5d5c421"]),
    );
    conditions.insert(
        "adSize".to_string(),
        condition(Exclude, Exclude, &["1024x768"]),
    );
    conditions.insert("country".to_string(), condition(Allow, Exclude, &["US"]));
    conditions.insert(
        "region".to_string(),
        condition(Exclude, Exclude, &["Some-Region"]),
    );
    conditions.insert(
        "city".to_string(),
        condition(Allow, Exclude, &["Some-City"]),
    );
    conditions.insert("zip".to_string(), condition(Allow, Exclude, &["02114"]));

    Rule {
        id: None,
        name: format!("rule-{}", suffix),
        conditions,
    }
}

/// The replacement variant: narrower carrier exceptions, flipped os
/// policies, and no region or city conditions.
fn updated_rule(id: &str, suffix: &str) -> Rule {
    use Policy::{Allow, Exclude};
    let mut conditions = BTreeMap::new();
    conditions.insert("carrier".to_string(), condition(Allow, Allow, &["AT&T"]));
    conditions.insert(
        "handset".to_string(),
        condition(Exclude, Allow, &["F536F6D652D4D4647-F536F6D652D4D6F64656C"]),
    );
    conditions.insert(
        "os".to_string(),
        condition(Allow, Exclude, &["F536F6D652D4F53-F536F6D652D56657273696F6E"]),
    );
    conditions.insert("wifi".to_string(), condition(Exclude, Exclude, &[]));
    conditions.insert(
        "appAndSite".to_string(),
        condition(Allow, Exclude, &["e5276ba5-2746-12b5-c64a-1112a5d5c421"]),
    );
    conditions.insert(
        "adSize".to_string(),
        condition(Exclude, Exclude, &["1024x768"]),
    );
    conditions.insert("country".to_string(), condition(Allow, Exclude, &["US"]));
    conditions.insert("zip".to_string(), condition(Allow, Exclude, &["02114"]));

    Rule {
        id: Some(id.to_string()),
        name: format!("rule-upd-{}", suffix),
        conditions,
    }
}
