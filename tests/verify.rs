use crate::common::DebugWriter;
use httpmock::Method::{DELETE, GET, POST};
use httpmock::MockServer;
use rules_api_client::api::ApiClient;
use rules_api_client::http_client::ClientConfig;
use rules_api_client::output::print::PrintOutputter;
use rules_api_client::verify::{self, Credentials};

mod common;

/// Mocks the whole API surface the verification sequence touches and runs
/// it end to end, asserting the terminal steps fire and that the extracted
/// ids flow through the printed output.
#[test]
fn full_verification_flow() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/api/v1/oauth2/token");
        then.status(200).body(r#"{"accessToken":"tok-verify"}"#);
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/user")
            .header("Authorization", "Bearer tok-verify");
        then.status(200)
            .body(r#"{"organization":{"id":{"dpId":"dp-auth"},"name":"org"}}"#);
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/user/configuration/demand-partner")
            .header("Authorization", "Bearer tok-verify");
        then.status(200)
            .body(r#"{"supplyPartners":[{"id":"sp-auth"},{"id":"sp-other"}]}"#);
    });

    server.mock(|when, then| {
        when.method(POST).path("/api/v1/demand-partners");
        then.status(200).body(r#"{"id":"dp-new","name":"dsp"}"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/demand-partners/dp-new");
        then.status(200).body(r#"{"id":"dp-new","name":"dsp"}"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/demand-partners");
        then.status(200).body(r#"{"demandPartners":[]}"#);
    });

    server.mock(|when, then| {
        when.method(POST).path("/api/v1/supply-partners");
        then.status(200).body(r#"{"id":"sp-new","name":"exchange"}"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/supply-partners/sp-new");
        then.status(200).body(r#"{"id":"sp-new","name":"exchange"}"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/supply-partners");
        then.status(200).body(r#"{"supplyPartners":[]}"#);
    });

    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/demand-partners/dp-auth/supply-partners/sp-auth");
        then.status(200).body(r#"{"maxQps":1000}"#);
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/demand-partners/dp-auth/supply-partners");
        then.status(200).body(r#"{"configurations":[]}"#);
    });
    let add_config = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/demand-partners/dp-new/supply-partners/sp-new");
        then.status(200).body(r#"{"vId":"v-cfg"}"#);
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/demand-partners/dp-new/supply-partners");
        then.status(200).body(r#"{"configurations":[]}"#);
    });

    server.mock(|when, then| {
        when.method(GET).path("/api/v1/versions");
        then.status(200).body(r#"{"versions":[]}"#);
    });
    let create_empty = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/versions/create")
            .header("Authorization", "Bearer tok-verify");
        then.status(200)
            .body(r#"{"id":"ev-new","maxQps":10017,"rules":[]}"#);
    });

    let add_rule = server.mock(|when, then| {
        when.method(POST).path("/api/v1/versions/v-cfg/rule/add");
        then.status(200).body(r#"{"id":"r-new"}"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/rules/r-new");
        then.status(200).body(r#"{"id":"r-new","name":"rule"}"#);
    });
    let replace_rule = server.mock(|when, then| {
        when.method(POST).path("/api/v1/versions/v-cfg/rule/replace");
        then.status(200).body(r#"{"id":"r-new"}"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/versions/v-cfg");
        then.status(200).body(
            r#"{"id":"v-cfg","maxQps":20000,"rules":[{"id":"r-new","name":"rule"}]}"#,
        );
    });

    let add_rule_to_empty = server.mock(|when, then| {
        when.method(POST).path("/api/v1/versions/ev-new/rule/add");
        then.status(200).body(r#"{"id":"rr-new"}"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/versions/ev-new");
        then.status(200)
            .body(r#"{"id":"ev-new","maxQps":10017,"rules":[]}"#);
    });
    let remove_rule = server.mock(|when, then| {
        when.method(DELETE)
            .path("/api/v1/versions/ev-new/rule/remove/rr-new");
        then.status(200).body("{}");
    });

    let copy_version = server.mock(|when, then| {
        when.method(POST).path("/api/v1/versions/v-cfg/copy");
        then.status(200).body(r#"{"id":"cv-new"}"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/versions/cv-new");
        then.status(200).body(
            r#"{"id":"cv-new","maxQps":20000,"rules":[{"id":"cr-1","name":"rule"},{"id":"cr-2","name":"rule"}]}"#,
        );
    });
    let update_qps = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/versions/cv-new/qps")
            .json_body(serde_json::json!({
                "maxQps": 12000,
                "rules": [
                    {"id": "cr-1", "desiredQps": 34000},
                    {"id": "cr-2", "desiredQps": 7000}
                ]
            }));
        then.status(200).body("{}");
    });
    let publish = server.mock(|when, then| {
        when.method(POST).path("/api/v1/versions/cv-new/publish");
        then.status(200).body(r#"{"id":"cv-new","published":true}"#);
    });

    let mut client = ApiClient::new(&server.base_url(), ClientConfig::default()).unwrap();
    let writer = &mut DebugWriter(String::new());
    let mut outputter = PrintOutputter::new(writer);
    let credentials = Credentials {
        username: "neil-test".to_string(),
        password: "T3stM3Now".to_string(),
    };

    verify::run(&mut client, &mut outputter, &credentials).unwrap();

    add_config.assert();
    create_empty.assert();
    add_rule.assert_hits(2);
    replace_rule.assert();
    add_rule_to_empty.assert();
    remove_rule.assert();
    copy_version.assert();
    update_qps.assert();
    publish.assert();

    let DebugWriter(output) = writer;
    assert!(output.contains("token: tok-verify"), "{}", output);
    assert!(output.contains("authenticated dpId: dp-auth"), "{}", output);
    assert!(
        output.contains("authenticated spIds: sp-auth, sp-other"),
        "{}",
        output
    );
    assert!(output.contains("using first spId: sp-auth"), "{}", output);
    assert!(output.contains("dp_id: dp-new"), "{}", output);
    assert!(output.contains("sp_id: sp-new"), "{}", output);
    assert!(
        output.contains("New configuration created version id: v-cfg"),
        "{}",
        output
    );
    assert!(output.contains("Empty Version Id: ev-new"), "{}", output);
    assert!(output.contains("rule id: r-new"), "{}", output);
    assert!(output.contains("removing rule: rr-new"), "{}", output);
}

/// The flow must stop at the first failing call, which includes the token
/// exchange itself.
#[test]
fn flow_halts_when_authentication_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/oauth2/token");
        then.status(401).body(r#"{"error":"bad credentials"}"#);
    });
    let never_hit = server.mock(|when, then| {
        when.method(GET).path("/api/v1/user");
        then.status(200).body("{}");
    });

    let mut client = ApiClient::new(&server.base_url(), ClientConfig::default()).unwrap();
    let writer = &mut DebugWriter(String::new());
    let mut outputter = PrintOutputter::new(writer);
    let credentials = Credentials {
        username: "neil-test".to_string(),
        password: "wrong".to_string(),
    };

    let err = verify::run(&mut client, &mut outputter, &credentials).unwrap_err();
    assert!(err.to_string().contains("401"), "{}", err);
    never_hit.assert_hits(0);
}
