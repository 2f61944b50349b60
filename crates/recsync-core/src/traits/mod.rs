//! Core traits for recsync
//!
//! - [`DnsProvider`]: List, create and modify DNS records via provider APIs

pub mod dns_provider;

pub use dns_provider::{ApiStatus, DnsProvider, ProviderDomain, ProviderRecord, SUCCESS_CODE};
