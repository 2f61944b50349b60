// # DNS Provider Trait
//
// Defines the interface for reading and writing DNS records via a provider API.
//
// ## Implementations
//
// - DNSPod token API: `recsync-provider-dnspod` crate
//
// ## Usage
//
// ```rust,ignore
// use recsync_core::{DnsProvider, LoginToken};
//
// async fn show(provider: &dyn DnsProvider, token: &LoginToken) -> recsync_core::Result<()> {
//     for domain in provider.list_domains(token).await? {
//         for record in provider.list_records(token, &domain.id).await? {
//             println!("{} {} {}", domain.name, record.name, record.value);
//         }
//     }
//     Ok(())
// }
// ```

use crate::config::LoginToken;
use crate::record::Record;
use async_trait::async_trait;
use std::fmt;

/// Status code the provider uses to signal success
pub const SUCCESS_CODE: &str = "1";

/// A domain hosted by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDomain {
    /// Provider-assigned domain id
    pub id: String,
    /// Domain name (e.g., "example.com")
    pub name: String,
}

impl ProviderDomain {
    /// Create a new provider domain
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A DNS record as currently stored by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRecord {
    /// Opaque provider record id
    pub id: String,
    /// Host label (`@`, `www`, ...)
    pub name: String,
    /// Record type (A, CNAME, MX, ...)
    pub record_type: String,
    /// Routing line the record answers on
    pub line: String,
    /// Record value
    pub value: String,
    /// Whether the record is enabled
    pub enabled: bool,
    /// Time-to-live, when reported
    pub ttl: Option<u32>,
}

impl ProviderRecord {
    /// Create an enabled provider record without TTL information
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        record_type: impl Into<String>,
        line: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            record_type: record_type.into(),
            line: line.into(),
            value: value.into(),
            enabled: true,
            ttl: None,
        }
    }

    /// Set the enabled flag
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Status block returned by every provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiStatus {
    /// Status code (`"1"` means success)
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl ApiStatus {
    /// Create a status from a code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// A successful status
    pub fn success() -> Self {
        Self::new(SUCCESS_CODE, "Action completed successful")
    }

    /// Whether the provider reported success
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Convert a non-success status into an error
    pub fn into_result(self) -> crate::Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(crate::Error::provider_api(self.code, self.message))
        }
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = if self.is_success() { "success" } else { "failed" };
        write!(f, "{} {}", result, self.code)
    }
}

/// Trait for DNS provider implementations
///
/// Providers are stateless and single-shot: each method performs exactly one
/// API call and never retries. The login token is passed to every call so
/// that callers control where credentials flow.
///
/// # Errors
///
/// The list methods turn a non-success status into
/// [`Error::ProviderApi`](crate::Error::ProviderApi). The write methods return
/// the [`ApiStatus`] as-is so the caller can report a rejected record and move
/// on; only transport or decoding failures are `Err`.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List every domain on the account
    async fn list_domains(&self, token: &LoginToken) -> Result<Vec<ProviderDomain>, crate::Error>;

    /// List every record of a domain
    async fn list_records(
        &self,
        token: &LoginToken,
        domain_id: &str,
    ) -> Result<Vec<ProviderRecord>, crate::Error>;

    /// Create a record in a domain
    async fn create_record(
        &self,
        token: &LoginToken,
        domain_id: &str,
        record: &Record,
    ) -> Result<ApiStatus, crate::Error>;

    /// Rewrite an existing record in place
    async fn modify_record(
        &self,
        token: &LoginToken,
        domain_id: &str,
        record_id: &str,
        record: &Record,
    ) -> Result<ApiStatus, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
