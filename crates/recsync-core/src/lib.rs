// # recsync-core
//
// Core library for declarative DNS record reconciliation.
//
// ## Architecture Overview
//
// - **Record**: Parses and formats the `sub_domain type line value [attr:value ...]` literal
// - **find_match**: Decides whether a declared record exists among provider records
// - **Reconciler**: Turns declared records plus provider records into create/modify actions
// - **DomainSession**: Runs list → plan → execute for one domain
// - **SyncEngine**: Lists domains, validates the config against them, drives every session
// - **DnsProvider**: Trait for the provider API (list domains, list/create/modify records)
//
// ## Design Principles
//
// 1. **Pure Core**: Matching and reconciliation never perform I/O
// 2. **Explicit Credentials**: The login token is passed to every provider call
// 3. **Fresh State**: Provider records are read live for each operation, never cached
// 4. **Declared Order**: Domains and records are processed in config order

pub mod traits;
pub mod record;
pub mod matcher;
pub mod reconcile;
pub mod session;
pub mod engine;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{ApiStatus, DnsProvider, ProviderDomain, ProviderRecord};
pub use record::Record;
pub use matcher::find_match;
pub use reconcile::{Action, CreatePolicy, Enforcement, Plan, ReconcileOptions, Reconciler, Violation};
pub use session::{ActionOutcome, DomainSession, SessionReport};
pub use engine::{DomainOutcome, DomainResult, Mode, RunSummary, SyncEngine};
pub use config::{DeclaredRecords, DomainConfig, LoginToken, Reassignment, SyncConfig};
pub use error::{Error, Result};
