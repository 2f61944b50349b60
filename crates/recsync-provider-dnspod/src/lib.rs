// # DNSPod DNS Provider
//
// This crate provides a DNSPod provider for recsync, speaking the token
// based form API at `https://dnsapi.cn`.
//
// ## Behavior
//
// - One HTTP request per trait call
// - No retry, backoff or rate limiting
// - No caching; every listing hits the API
// - HTTP timeout of 30 seconds
// - The login token is sent in the request body and never logged
//
// ## API Reference
//
// Every call is a form POST carrying `login_token` and `format=json`. The
// response always has a `status` object whose `code` is `"1"` on success.
//
// - List domains: POST `/Domain.List`
// - List records: POST `/Record.List` (`domain_id`)
// - Create record: POST `/Record.Create` (`domain_id`, `sub_domain`, `record_type`, `record_line`, `value`, ...)
// - Modify record: POST `/Record.Modify` (same as create, plus `record_id`)

use async_trait::async_trait;
use recsync_core::config::LoginToken;
use recsync_core::record::Record;
use recsync_core::traits::{ApiStatus, DnsProvider, ProviderDomain, ProviderRecord};
use recsync_core::{Error, Result};
use serde_json::Value;
use std::time::Duration;

/// DNSPod API base URL
pub const DNSPOD_API_BASE: &str = "https://dnsapi.cn";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Status code DNSPod returns when a domain has no records
const EMPTY_RECORD_LIST_CODE: &str = "10";

/// DNSPod DNS provider
///
/// Stateless: holds only the HTTP client and the API base URL. The login
/// token arrives with each call.
#[derive(Debug, Clone)]
pub struct DnspodProvider {
    /// API base URL without trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl DnspodProvider {
    /// Create a provider talking to the public DNSPod API
    pub fn new() -> Result<Self> {
        Self::with_base_url(DNSPOD_API_BASE)
    }

    /// Create a provider talking to another base URL (tests, proxies)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .user_agent(concat!("recsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::config("DNSPod API base URL cannot be empty"));
        }

        Ok(Self { base_url, client })
    }

    /// The API base URL in use
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST one API action and decode its JSON body
    ///
    /// # Parameters
    ///
    /// - `action`: API action, e.g. `Record.List`
    /// - `token`: Login token
    /// - `params`: Action-specific form parameters
    ///
    /// # Returns
    ///
    /// The decoded body together with its status block. A non-success status
    /// is not an error here; callers decide.
    async fn call(
        &self,
        action: &str,
        token: &LoginToken,
        params: Vec<(String, String)>,
    ) -> Result<(ApiStatus, Value)> {
        let url = format!("{}/{}", self.base_url, action);
        tracing::debug!("POST {}", url);

        let mut form = vec![
            ("login_token".to_string(), token.expose().to_string()),
            ("format".to_string(), "json".to_string()),
        ];
        form.extend(params);

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", action, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return match status.as_u16() {
                401 | 403 => Err(Error::http(format!(
                    "{}: access denied. Status: {}",
                    action, status
                ))),
                429 => Err(Error::http(format!(
                    "{}: rate limit exceeded. Status: {}",
                    action, status
                ))),
                500..=599 => Err(Error::http(format!(
                    "{}: DNSPod server error: {} - {}",
                    action, status, error_text
                ))),
                _ => Err(Error::http(format!(
                    "{} failed: {} - {}",
                    action, status, error_text
                ))),
            };
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| Error::http(format!("{}: failed to parse response: {}", action, e)))?;

        let status = parse_status(&json)?;
        tracing::debug!("{} returned status {} ({})", action, status.code, status.message);
        Ok((status, json))
    }
}

#[async_trait]
impl DnsProvider for DnspodProvider {
    async fn list_domains(&self, token: &LoginToken) -> Result<Vec<ProviderDomain>> {
        let (status, json) = self.call("Domain.List", token, Vec::new()).await?;
        status.into_result()?;
        parse_domains(&json)
    }

    async fn list_records(&self, token: &LoginToken, domain_id: &str) -> Result<Vec<ProviderRecord>> {
        let params = vec![("domain_id".to_string(), domain_id.to_string())];
        let (status, json) = self.call("Record.List", token, params).await?;
        if status.code == EMPTY_RECORD_LIST_CODE {
            return Ok(Vec::new());
        }
        status.into_result()?;
        parse_records(&json)
    }

    async fn create_record(
        &self,
        token: &LoginToken,
        domain_id: &str,
        record: &Record,
    ) -> Result<ApiStatus> {
        let mut params = vec![("domain_id".to_string(), domain_id.to_string())];
        params.extend(record.form_fields());
        let (status, _) = self.call("Record.Create", token, params).await?;
        Ok(status)
    }

    async fn modify_record(
        &self,
        token: &LoginToken,
        domain_id: &str,
        record_id: &str,
        record: &Record,
    ) -> Result<ApiStatus> {
        let mut params = vec![
            ("domain_id".to_string(), domain_id.to_string()),
            ("record_id".to_string(), record_id.to_string()),
        ];
        params.extend(record.form_fields());
        let (status, _) = self.call("Record.Modify", token, params).await?;
        Ok(status)
    }

    fn provider_name(&self) -> &'static str {
        "dnspod"
    }
}

/// Read the `status` block of a response
fn parse_status(json: &Value) -> Result<ApiStatus> {
    let status = &json["status"];
    let code = json_string(&status["code"])
        .ok_or_else(|| Error::http("Invalid response format: status.code is missing"))?;
    let message = json_string(&status["message"]).unwrap_or_default();
    Ok(ApiStatus::new(code, message))
}

fn parse_domains(json: &Value) -> Result<Vec<ProviderDomain>> {
    let domains = json["domains"]
        .as_array()
        .ok_or_else(|| Error::http("Invalid response format: domains is not an array"))?;

    domains
        .iter()
        .map(|domain| -> Result<ProviderDomain> {
            let id = json_string(&domain["id"])
                .ok_or_else(|| Error::http("Invalid response format: domain.id is missing"))?;
            let name = domain["name"]
                .as_str()
                .ok_or_else(|| Error::http("Invalid response format: domain.name is not a string"))?;
            Ok(ProviderDomain::new(id, name))
        })
        .collect()
}

fn parse_records(json: &Value) -> Result<Vec<ProviderRecord>> {
    let Some(records) = json["records"].as_array() else {
        return Ok(Vec::new());
    };

    records
        .iter()
        .map(|record| -> Result<ProviderRecord> {
            let field = |key: &str| {
                json_string(&record[key]).ok_or_else(|| {
                    Error::http(format!("Invalid response format: record.{} is missing", key))
                })
            };

            Ok(ProviderRecord {
                id: field("id")?,
                name: field("name")?,
                record_type: field("type")?,
                line: field("line")?,
                value: field("value")?,
                enabled: json_flag(&record["enabled"]).unwrap_or(true),
                ttl: json_string(&record["ttl"]).and_then(|ttl| ttl.parse().ok()),
            })
        })
        .collect()
}

/// A JSON string or number as text
fn json_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A JSON `"1"`/`"0"`, number or boolean as a flag
fn json_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => s.trim().parse::<i64>().ok().map(|n| n != 0),
        _ => None,
    }
}
