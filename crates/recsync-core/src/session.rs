//! Per-domain reconciliation against a live provider
//!
//! A [`DomainSession`] binds one provider domain to its declared records and
//! runs the list → plan → execute sequence for each operation mode. Records
//! are fetched fresh for every operation; nothing is cached.

use crate::config::{DeclaredRecords, LoginToken};
use crate::error::{Error, Result};
use crate::reconcile::{Action, Enforcement, Plan, ReconcileOptions, Reconciler, Violation};
use crate::traits::{ApiStatus, DnsProvider, ProviderDomain, ProviderRecord};
use std::fmt;
use tracing::{debug, error, info};

/// Result of one executed action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// The action that was sent
    pub action: Action,
    /// Provider status, or the transport error that prevented one
    pub result: std::result::Result<ApiStatus, String>,
}

impl ActionOutcome {
    /// Whether the provider accepted the action
    pub fn is_success(&self) -> bool {
        matches!(&self.result, Ok(status) if status.is_success())
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            Action::Create(record) => write!(f, "new record: {}", record)?,
            Action::Modify { old, new, .. } => write!(f, "modify record: {} to {}", old, new)?,
        }
        match &self.result {
            Ok(status) => write!(f, " {}", status),
            Err(message) => write!(f, " failed ({})", message),
        }
    }
}

/// Everything a session did for one domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Executed actions, in order
    pub outcomes: Vec<ActionOutcome>,
    /// Lenient-mode violations
    pub warnings: Vec<Violation>,
}

impl SessionReport {
    /// Number of actions the provider rejected or never received
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }

    fn extend(&mut self, other: SessionReport) {
        self.outcomes.extend(other.outcomes);
        self.warnings.extend(other.warnings);
    }
}

/// One domain bound to its declared records
pub struct DomainSession<'a> {
    provider: &'a dyn DnsProvider,
    token: &'a LoginToken,
    domain: &'a ProviderDomain,
    declared: &'a DeclaredRecords,
    options: ReconcileOptions,
}

impl<'a> DomainSession<'a> {
    /// Create a session
    ///
    /// # Parameters
    ///
    /// - `provider`: Provider client
    /// - `token`: Login token sent with every call
    /// - `domain`: Provider domain (id and name)
    /// - `declared`: Declared records of that domain
    /// - `options`: Enforcement and create policy for create/modify runs
    pub fn new(
        provider: &'a dyn DnsProvider,
        token: &'a LoginToken,
        domain: &'a ProviderDomain,
        declared: &'a DeclaredRecords,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            provider,
            token,
            domain,
            declared,
            options,
        }
    }

    /// The provider domain this session works on
    pub fn domain(&self) -> &ProviderDomain {
        self.domain
    }

    /// Fetch the domain's records from the provider
    pub async fn list_records(&self) -> Result<Vec<ProviderRecord>> {
        let records = self
            .provider
            .list_records(self.token, &self.domain.id)
            .await?;
        debug!(
            "domain {}: provider reports {} record(s)",
            self.domain.name,
            records.len()
        );
        Ok(records)
    }

    /// Create every declared new record that is missing
    ///
    /// Fails with [`Error::Config`] when the domain declares no `new` key.
    pub async fn create_all(&self) -> Result<SessionReport> {
        if !self.declared.has_new_records() {
            return Err(Error::config(format!(
                "No new records declared for domain {}",
                self.domain.name
            )));
        }

        let existing = self.list_records().await?;
        let plan = self
            .reconciler(&existing, self.options)
            .plan_creates(self.declared.new_records())?;
        Ok(self.execute(plan).await)
    }

    /// Apply every declared reassignment whose preconditions hold
    pub async fn modify_all(&self) -> Result<SessionReport> {
        let existing = self.list_records().await?;
        let plan = self
            .reconciler(&existing, self.options)
            .plan_modifies(self.declared.reassignments())?;
        Ok(self.execute(plan).await)
    }

    /// Create, then modify, whichever groups the domain declares
    ///
    /// Both groups are checked against one listing before the first write,
    /// so a strict violation in either leaves the domain untouched. Once
    /// creates have been sent the modify step re-reads the provider and
    /// skips, with a warning, any pair that no longer applies.
    pub async fn apply_all(&self) -> Result<SessionReport> {
        let existing = self.list_records().await?;
        let plan = self
            .reconciler(&existing, self.options)
            .plan_all(self.declared)?;

        let (creates, modifies): (Vec<Action>, Vec<Action>) = plan
            .actions
            .into_iter()
            .partition(|action| matches!(action, Action::Create(_)));

        if creates.is_empty() {
            return Ok(self
                .execute(Plan {
                    actions: modifies,
                    warnings: plan.warnings,
                })
                .await);
        }

        let mut report = self
            .execute(Plan {
                actions: creates,
                warnings: plan.warnings,
            })
            .await;

        if self.declared.has_reassignments() {
            let modifies = self.replan_modifies(modifies, &report).await;
            report.extend(self.execute(modifies).await);
        }

        Ok(report)
    }

    /// Plan the modify step again after creates were sent
    ///
    /// Falls back to `planned` when the provider cannot be listed; its record
    /// ids were read before any write.
    async fn replan_modifies(&self, planned: Vec<Action>, report: &SessionReport) -> Plan {
        let fresh = match self.list_records().await {
            Ok(records) => records,
            Err(e) => {
                error!(
                    "domain {}: re-listing before modify failed, using earlier listing: {}",
                    self.domain.name, e
                );
                return Plan {
                    actions: planned,
                    warnings: Vec::new(),
                };
            }
        };

        let options = ReconcileOptions {
            enforcement: Enforcement::Lenient,
            ..self.options
        };
        // Lenient planning never fails
        let mut plan = self
            .reconciler(&fresh, options)
            .plan_modifies(self.declared.reassignments())
            .unwrap_or_default();
        plan.warnings.retain(|w| !report.warnings.contains(w));
        plan
    }

    /// Compute what [`apply_all`](Self::apply_all) would do without doing it
    ///
    /// Always lenient: violations show up as warnings in the plan.
    pub async fn preview(&self) -> Result<Plan> {
        let existing = self.list_records().await?;
        let options = ReconcileOptions {
            enforcement: Enforcement::Lenient,
            ..self.options
        };
        self.reconciler(&existing, options).plan_all(self.declared)
    }

    fn reconciler<'r>(
        &'r self,
        existing: &'r [ProviderRecord],
        options: ReconcileOptions,
    ) -> Reconciler<'r> {
        Reconciler::new(&self.domain.name, existing, options)
    }

    async fn execute(&self, plan: Plan) -> SessionReport {
        let mut report = SessionReport {
            outcomes: Vec::with_capacity(plan.actions.len()),
            warnings: plan.warnings,
        };

        for action in plan.actions {
            let result = match &action {
                Action::Create(record) => {
                    self.provider
                        .create_record(self.token, &self.domain.id, record)
                        .await
                }
                Action::Modify { record_id, new, .. } => {
                    self.provider
                        .modify_record(self.token, &self.domain.id, record_id, new)
                        .await
                }
            };

            let outcome = ActionOutcome {
                result: result.map_err(|e| e.to_string()),
                action,
            };

            if outcome.is_success() {
                info!("domain {}: {}", self.domain.name, outcome);
            } else {
                error!("domain {}: {}", self.domain.name, outcome);
            }
            report.outcomes.push(outcome);
        }

        report
    }
}
