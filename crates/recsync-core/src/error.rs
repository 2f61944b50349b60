//! Error types for recsync
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for recsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for recsync
#[derive(Error, Debug)]
pub enum Error {
    /// A record literal does not follow `sub_domain type line value [attr:value ...]`
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// The config references a domain the provider does not host
    #[error("Error on cfg file: no such domain {0} on the provider")]
    UnknownDomain(String),

    /// A record declared as new already exists on the provider (strict mode)
    #[error("domain {domain}: new record {record} already exists on the provider")]
    AlreadyExists {
        /// Domain name
        domain: String,
        /// Offending record, formatted as a literal
        record: String,
    },

    /// A record declared as old does not exist on the provider (strict mode)
    #[error("domain {domain}: old record {record} does not exist on the provider")]
    NotFound {
        /// Domain name
        domain: String,
        /// Offending record, formatted as a literal
        record: String,
    },

    /// The provider answered with a non-success status code
    #[error("Provider API error: code {code}: {message}")]
    ProviderApi {
        /// Status code reported by the provider
        code: String,
        /// Status message reported by the provider
        message: String,
    },

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a malformed record error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRecord(msg.into())
    }

    /// Create an unknown domain error
    pub fn unknown_domain(domain: impl Into<String>) -> Self {
        Self::UnknownDomain(domain.into())
    }

    /// Create an "already exists" error
    pub fn already_exists(domain: impl Into<String>, record: impl ToString) -> Self {
        Self::AlreadyExists {
            domain: domain.into(),
            record: record.to_string(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(domain: impl Into<String>, record: impl ToString) -> Self {
        Self::NotFound {
            domain: domain.into(),
            record: record.to_string(),
        }
    }

    /// Create a provider API error from a status code and message
    pub fn provider_api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderApi {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error is a strict-mode reconciliation violation
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. } | Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_messages() {
        let err = Error::already_exists("example.com", "www A default 1.2.3.4");
        assert!(err.is_violation());
        assert_eq!(
            err.to_string(),
            "domain example.com: new record www A default 1.2.3.4 already exists on the provider"
        );

        let err = Error::not_found("example.com", "www A default 1.2.3.4");
        assert!(err.is_violation());
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_provider_api_is_not_violation() {
        let err = Error::provider_api("-1", "Login failed");
        assert!(!err.is_violation());
        assert_eq!(err.to_string(), "Provider API error: code -1: Login failed");
    }
}
