//! Top-level sync engine
//!
//! The SyncEngine is responsible for:
//! - Listing the provider's domains once per invocation
//! - Checking every configured domain is hosted by the provider
//! - Running one [`DomainSession`] per configured domain, in config order
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐      ┌──────────────┐      ┌───────────────┐
//! │ SyncConfig  │─────▶│  SyncEngine  │─────▶│ DomainSession │ (one per domain)
//! └─────────────┘      └──────────────┘      └───────────────┘
//!                             │                      │
//!                             ▼                      ▼
//!                      ┌──────────────┐      ┌──────────────┐
//!                      │ DnsProvider  │◀─────│  Reconciler  │ (pure)
//!                      │ (list/write) │      └──────────────┘
//!                      └──────────────┘
//! ```
//!
//! ## Failure Semantics
//!
//! Listing domains and the unknown-domain check are fatal for the whole run.
//! After that, each domain stands alone: a strict-mode violation or a failed
//! record listing aborts that domain only and the next domain still runs.

use crate::config::{DomainConfig, SyncConfig};
use crate::error::{Error, Result};
use crate::reconcile::{Plan, ReconcileOptions};
use crate::session::{DomainSession, SessionReport};
use crate::traits::{DnsProvider, ProviderDomain, ProviderRecord};
use tracing::{error, info};

/// Reconciliation mode for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Show what would happen, change nothing
    Preview,
    /// Create declared new records
    Create,
    /// Apply declared reassignments
    Modify,
    /// Create, then modify
    Apply,
}

/// What happened to one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainOutcome {
    /// Preview plan
    Planned(Plan),
    /// Executed actions
    Applied(SessionReport),
}

/// Per-domain result of a run
#[derive(Debug)]
pub struct DomainResult {
    /// Domain name
    pub domain: String,
    /// Outcome, or the error that aborted the domain
    pub outcome: Result<DomainOutcome>,
}

/// Results of a run, in config order
#[derive(Debug, Default)]
pub struct RunSummary {
    /// One entry per configured domain
    pub results: Vec<DomainResult>,
}

impl RunSummary {
    /// Whether any domain aborted or any action was rejected
    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| match &r.outcome {
            Err(_) => true,
            Ok(DomainOutcome::Applied(report)) => report.failure_count() > 0,
            Ok(DomainOutcome::Planned(_)) => false,
        })
    }
}

/// Core sync engine
///
/// ## Lifecycle
///
/// 1. Connect with [`SyncEngine::connect()`] (lists domains, validates config)
/// 2. Inspect with [`domains()`](Self::domains) / [`records()`](Self::records)
///    or reconcile with [`run()`](Self::run)
/// 3. Drop
pub struct SyncEngine {
    /// Provider client
    provider: Box<dyn DnsProvider>,

    /// Parsed configuration
    config: SyncConfig,

    /// Options for create/modify runs
    options: ReconcileOptions,

    /// Provider domains, as listed at connect time
    domains: Vec<ProviderDomain>,
}

impl SyncEngine {
    /// Connect to the provider and validate the configuration against it
    ///
    /// # Returns
    ///
    /// - `Ok(SyncEngine)`: every configured domain exists on the provider
    /// - `Err(Error::ProviderApi)`: the domain listing failed
    /// - `Err(Error::UnknownDomain)`: a configured domain is not hosted
    pub async fn connect(
        provider: Box<dyn DnsProvider>,
        config: SyncConfig,
        options: ReconcileOptions,
    ) -> Result<Self> {
        config.validate()?;

        let domains = provider.list_domains(&config.login_token).await?;
        info!(
            "{} reports {} domain(s)",
            provider.provider_name(),
            domains.len()
        );

        for configured in &config.domains {
            if !domains.iter().any(|d| d.name == configured.name) {
                return Err(Error::unknown_domain(&configured.name));
            }
        }

        Ok(Self {
            provider,
            config,
            options,
            domains,
        })
    }

    /// Domains hosted by the provider
    pub fn domains(&self) -> &[ProviderDomain] {
        &self.domains
    }

    /// Records of every provider domain
    ///
    /// Fails on the first domain whose listing fails.
    pub async fn records(&self) -> Result<Vec<(ProviderDomain, Vec<ProviderRecord>)>> {
        let mut all = Vec::with_capacity(self.domains.len());
        for domain in &self.domains {
            let records = self
                .provider
                .list_records(&self.config.login_token, &domain.id)
                .await?;
            all.push((domain.clone(), records));
        }
        Ok(all)
    }

    /// Run a reconciliation mode over every configured domain
    pub async fn run(&self, mode: Mode) -> RunSummary {
        let mut summary = RunSummary::default();

        for configured in &self.config.domains {
            let outcome = self.run_domain(configured, mode).await;
            if let Err(e) = &outcome {
                error!("domain {}: {}", configured.name, e);
            }
            summary.results.push(DomainResult {
                domain: configured.name.clone(),
                outcome,
            });
        }

        summary
    }

    async fn run_domain(&self, configured: &DomainConfig, mode: Mode) -> Result<DomainOutcome> {
        let domain = self
            .domains
            .iter()
            .find(|d| d.name == configured.name)
            .ok_or_else(|| Error::unknown_domain(&configured.name))?;

        let session = DomainSession::new(
            self.provider.as_ref(),
            &self.config.login_token,
            domain,
            &configured.records,
            self.options,
        );

        match mode {
            Mode::Preview => session.preview().await.map(DomainOutcome::Planned),
            Mode::Create => session.create_all().await.map(DomainOutcome::Applied),
            Mode::Modify => session.modify_all().await.map(DomainOutcome::Applied),
            Mode::Apply => session.apply_all().await.map(DomainOutcome::Applied),
        }
    }
}
