//! DNSPod provider tests against a local mock API
//!
//! Every test starts a wiremock server standing in for `dnsapi.cn` and checks
//! the form fields sent and the decoding of the answer.

use recsync_core::config::LoginToken;
use recsync_core::record::Record;
use recsync_core::traits::DnsProvider;
use recsync_core::Error;
use recsync_provider_dnspod::DnspodProvider;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "10000,secret";

async fn setup() -> (MockServer, DnspodProvider, LoginToken) {
    let server = MockServer::start().await;
    let provider = DnspodProvider::with_base_url(server.uri()).expect("provider builds");
    (server, provider, LoginToken::new(TOKEN))
}

#[tokio::test]
async fn list_domains_sends_token_and_decodes_ids() {
    let (server, provider, token) = setup().await;

    Mock::given(method("POST"))
        .and(path("/Domain.List"))
        .and(body_string_contains("login_token=10000%2Csecret"))
        .and(body_string_contains("format=json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"code": "1", "message": "Action completed successful"},
            "domains": [
                {"id": 2059079, "name": "example.com"},
                {"id": 2059080, "name": "example.org"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let domains = provider.list_domains(&token).await.unwrap();

    assert_eq!(domains.len(), 2);
    assert_eq!(domains[0].id, "2059079");
    assert_eq!(domains[1].name, "example.org");
}

#[tokio::test]
async fn list_domains_failure_status_is_provider_error() {
    let (server, provider, token) = setup().await;

    Mock::given(method("POST"))
        .and(path("/Domain.List"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"code": "-1", "message": "Login failed"}
        })))
        .mount(&server)
        .await;

    let err = provider.list_domains(&token).await.unwrap_err();

    assert!(matches!(err, Error::ProviderApi { ref code, .. } if code == "-1"));
}

#[tokio::test]
async fn list_records_decodes_records() {
    let (server, provider, token) = setup().await;

    Mock::given(method("POST"))
        .and(path("/Record.List"))
        .and(body_string_contains("domain_id=2059079"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"code": "1", "message": "Action completed successful"},
            "records": [
                {"id": "16894439", "name": "www", "type": "A", "line": "default",
                 "value": "1.2.3.4", "enabled": "1", "ttl": "600"},
                {"id": "16894440", "name": "ftp", "type": "A", "line": "default",
                 "value": "1.2.3.4", "enabled": "0", "ttl": "600"}
            ]
        })))
        .mount(&server)
        .await;

    let records = provider.list_records(&token, "2059079").await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "16894439");
    assert_eq!(records[0].record_type, "A");
    assert!(records[0].enabled);
    assert!(!records[1].enabled);
}

#[tokio::test]
async fn list_records_empty_domain_is_not_an_error() {
    let (server, provider, token) = setup().await;

    Mock::given(method("POST"))
        .and(path("/Record.List"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"code": "10", "message": "No records"}
        })))
        .mount(&server)
        .await;

    let records = provider.list_records(&token, "2059079").await.unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn create_record_sends_fields_and_returns_status() {
    let (server, provider, token) = setup().await;

    Mock::given(method("POST"))
        .and(path("/Record.Create"))
        .and(body_string_contains("domain_id=2059079"))
        .and(body_string_contains("sub_domain=www"))
        .and(body_string_contains("record_type=A"))
        .and(body_string_contains("record_line=default"))
        .and(body_string_contains("value=5.6.7.8"))
        .and(body_string_contains("ttl=600"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"code": "1", "message": "Action completed successful"},
            "record": {"id": "16894441", "name": "www", "status": "enable"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record: Record = "www a default 5.6.7.8 ttl:600".parse().unwrap();
    let status = provider.create_record(&token, "2059079", &record).await.unwrap();

    assert!(status.is_success());
}

#[tokio::test]
async fn rejected_create_is_returned_not_raised() {
    let (server, provider, token) = setup().await;

    Mock::given(method("POST"))
        .and(path("/Record.Create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"code": "104", "message": "Record already exists"}
        })))
        .mount(&server)
        .await;

    let record: Record = "www A default 1.2.3.4".parse().unwrap();
    let status = provider.create_record(&token, "2059079", &record).await.unwrap();

    assert!(!status.is_success());
    assert_eq!(status.code, "104");
}

#[tokio::test]
async fn modify_record_sends_record_id() {
    let (server, provider, token) = setup().await;

    Mock::given(method("POST"))
        .and(path("/Record.Modify"))
        .and(body_string_contains("record_id=16894439"))
        .and(body_string_contains("value=5.6.7.8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"code": "1", "message": "Action completed successful"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record: Record = "www A default 5.6.7.8".parse().unwrap();
    let status = provider
        .modify_record(&token, "2059079", "16894439", &record)
        .await
        .unwrap();

    assert!(status.is_success());
}

#[tokio::test]
async fn http_error_status_is_http_error() {
    let (server, provider, token) = setup().await;

    Mock::given(method("POST"))
        .and(path("/Record.List"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = provider.list_records(&token, "2059079").await.unwrap_err();

    assert!(matches!(err, Error::Http(ref msg) if msg.contains("502")));
}

#[tokio::test]
async fn missing_status_block_is_http_error() {
    let (server, provider, token) = setup().await;

    Mock::given(method("POST"))
        .and(path("/Domain.List"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"domains": []})))
        .mount(&server)
        .await;

    let err = provider.list_domains(&token).await.unwrap_err();

    assert!(matches!(err, Error::Http(_)));
}
