//! Test doubles and common utilities for contract tests
//!
//! This module provides an in-memory provider that counts calls and records
//! what was sent, without implementing any real API. Accepted creates are
//! added to the domain's records so later listings see them.

#![allow(dead_code)]

use recsync_core::config::LoginToken;
use recsync_core::error::{Error, Result};
use recsync_core::record::Record;
use recsync_core::traits::{ApiStatus, DnsProvider, ProviderDomain, ProviderRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Token used by every test config
pub const TEST_TOKEN: &str = "10000,test-token";

/// A call received by the mock provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create {
        domain_id: String,
        record: String,
    },
    Modify {
        domain_id: String,
        record_id: String,
        record: String,
    },
}

/// A mock DnsProvider that tracks calls
pub struct MockDnsProvider {
    /// Domains returned by list_domains()
    domains: Vec<ProviderDomain>,
    /// Records per domain id
    records: Arc<Mutex<HashMap<String, Vec<ProviderRecord>>>>,
    /// Status returned by write calls, keyed by formatted record literal
    rejections: HashMap<String, ApiStatus>,
    /// Domain ids whose record listing fails
    failing_lists: Vec<String>,
    /// Whether list_domains() fails
    fail_domain_list: bool,
    /// Call counter for list_records()
    list_call_count: Arc<AtomicUsize>,
    /// Write calls, in order
    calls: Arc<Mutex<Vec<Call>>>,
    /// Tokens seen on every call
    tokens: Arc<Mutex<Vec<String>>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self {
            domains: Vec::new(),
            records: Arc::new(Mutex::new(HashMap::new())),
            rejections: HashMap::new(),
            failing_lists: Vec::new(),
            fail_domain_list: false,
            list_call_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            tokens: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a domain with its current records
    pub fn with_domain(mut self, id: &str, name: &str, records: Vec<ProviderRecord>) -> Self {
        self.domains.push(ProviderDomain::new(id, name));
        self.records.lock().unwrap().insert(id.to_string(), records);
        self
    }

    /// Make write calls for `record` return `code`
    pub fn rejecting(mut self, record: &str, code: &str) -> Self {
        let literal = record.parse::<Record>().unwrap().to_string();
        self.rejections
            .insert(literal, ApiStatus::new(code, "rejected by mock"));
        self
    }

    /// Make record listing for `domain_id` fail
    pub fn failing_list(mut self, domain_id: &str) -> Self {
        self.failing_lists.push(domain_id.to_string());
        self
    }

    /// Make domain listing fail
    pub fn failing_domain_list(mut self) -> Self {
        self.fail_domain_list = true;
        self
    }

    /// Create a new MockDnsProvider that shares counters and records with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            domains: other.domains.clone(),
            records: Arc::clone(&other.records),
            rejections: other.rejections.clone(),
            failing_lists: other.failing_lists.clone(),
            fail_domain_list: other.fail_domain_list,
            list_call_count: Arc::clone(&other.list_call_count),
            calls: Arc::clone(&other.calls),
            tokens: Arc::clone(&other.tokens),
        }
    }

    /// Get the number of times list_records() was called
    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    /// Get the write calls, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the number of write calls
    pub fn write_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Get every token the provider was called with
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }

    fn note_token(&self, token: &LoginToken) {
        self.tokens.lock().unwrap().push(token.expose().to_string());
    }

    fn status_for(&self, record: &Record) -> ApiStatus {
        self.rejections
            .get(&record.to_string())
            .cloned()
            .unwrap_or_else(ApiStatus::success)
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_domains(&self, token: &LoginToken) -> Result<Vec<ProviderDomain>> {
        self.note_token(token);
        if self.fail_domain_list {
            return Err(Error::provider_api("-1", "Login failed"));
        }
        Ok(self.domains.clone())
    }

    async fn list_records(&self, token: &LoginToken, domain_id: &str) -> Result<Vec<ProviderRecord>> {
        self.note_token(token);
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        if self.failing_lists.iter().any(|id| id == domain_id) {
            return Err(Error::provider_api("6", "Domain id invalid"));
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(domain_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_record(
        &self,
        token: &LoginToken,
        domain_id: &str,
        record: &Record,
    ) -> Result<ApiStatus> {
        self.note_token(token);
        self.calls.lock().unwrap().push(Call::Create {
            domain_id: domain_id.to_string(),
            record: record.to_string(),
        });
        let status = self.status_for(record);
        if status.is_success() {
            let mut records = self.records.lock().unwrap();
            let domain_records = records.entry(domain_id.to_string()).or_default();
            let id = format!("created-{}", domain_records.len());
            domain_records.push(ProviderRecord::new(
                id,
                record.sub_domain.clone(),
                record.record_type.clone(),
                record.record_line.clone(),
                record.value.clone(),
            ));
        }
        Ok(status)
    }

    async fn modify_record(
        &self,
        token: &LoginToken,
        domain_id: &str,
        record_id: &str,
        record: &Record,
    ) -> Result<ApiStatus> {
        self.note_token(token);
        self.calls.lock().unwrap().push(Call::Modify {
            domain_id: domain_id.to_string(),
            record_id: record_id.to_string(),
            record: record.to_string(),
        });
        Ok(self.status_for(record))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Shorthand for a provider record
pub fn provider_record(id: &str, literal: &str) -> ProviderRecord {
    let record: Record = literal.parse().unwrap();
    ProviderRecord::new(
        id,
        record.sub_domain,
        record.record_type,
        record.record_line,
        record.value,
    )
}

/// Build a config with the test token followed by `sections`
pub fn config_with(sections: &str) -> recsync_core::SyncConfig {
    format!("[auth]\nlogin_token = {}\n\n{}", TEST_TOKEN, sections)
        .parse()
        .expect("test config parses")
}
