//! Reconciliation of declared records against provider records
//!
//! The [`Reconciler`] is pure: it looks at one domain's provider records and
//! decides which create/modify calls are needed. It never talks to the
//! provider, so every rule here is testable without a network.
//!
//! ## Rules
//!
//! 1. A record declared as new that already exists is a violation.
//! 2. (modify only) An old record that does not exist is a violation.
//! 3. A reassignment becomes a modify action iff its old record exists and
//!    its new record does not; otherwise it is skipped without comment.
//! 4. A new record that does not exist becomes a create action.
//!
//! Under [`Enforcement::Strict`] the first violation is returned as an error
//! and no plan is produced. Under [`Enforcement::Lenient`] violations are
//! logged, collected into [`Plan::warnings`] and planning continues.

use crate::config::{DeclaredRecords, Reassignment};
use crate::error::{Error, Result};
use crate::matcher::{exists, find_match};
use crate::record::Record;
use crate::traits::ProviderRecord;
use std::fmt;
use tracing::{debug, warn};

/// How precondition violations are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Enforcement {
    /// Any violation aborts the domain
    #[default]
    Strict,
    /// Violations are reported and skipped
    Lenient,
}

/// What to do with a new record that already exists in lenient mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CreatePolicy {
    /// Leave existing records alone
    #[default]
    SkipExisting,
    /// Send the create call anyway and let the provider reject duplicates
    AlwaysAttempt,
}

/// Reconciliation settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Violation policy
    pub enforcement: Enforcement,
    /// Handling of already-existing new records
    pub create_policy: CreatePolicy,
}

impl ReconcileOptions {
    /// Strict options with the default create policy
    pub fn strict() -> Self {
        Self::default()
    }

    /// Lenient options with the default create policy
    pub fn lenient() -> Self {
        Self {
            enforcement: Enforcement::Lenient,
            ..Self::default()
        }
    }

    /// Set the create policy
    pub fn with_create_policy(mut self, create_policy: CreatePolicy) -> Self {
        self.create_policy = create_policy;
        self
    }
}

/// A provider call the plan asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Create a record
    Create(Record),
    /// Rewrite the provider record `record_id` (currently `old`) into `new`
    Modify {
        /// Provider id of the record matching `old`
        record_id: String,
        /// Declared old record
        old: Record,
        /// Declared new record
        new: Record,
    },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create(record) => write!(f, "create record: {}", record),
            Action::Modify { old, new, .. } => write!(f, "modify record: {} to {}", old, new),
        }
    }
}

/// A precondition that did not hold in lenient mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Declared-new record already exists
    AlreadyExists(Record),
    /// Declared-old record does not exist
    NotFound(Record),
}

impl Violation {
    fn into_error(self, domain: &str) -> Error {
        match self {
            Violation::AlreadyExists(record) => Error::already_exists(domain, record),
            Violation::NotFound(record) => Error::not_found(domain, record),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::AlreadyExists(record) => {
                write!(f, "new record {} already exists", record)
            }
            Violation::NotFound(record) => write!(f, "old record {} does not exist", record),
        }
    }
}

/// Ordered actions plus the warnings collected while planning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Actions in execution order
    pub actions: Vec<Action>,
    /// Lenient-mode violations
    pub warnings: Vec<Violation>,
}

impl Plan {
    /// Whether the plan has nothing to do
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Append another plan after this one
    pub fn extend(&mut self, other: Plan) {
        self.actions.extend(other.actions);
        self.warnings.extend(other.warnings);
    }
}

/// Computes actions for one domain from a snapshot of its provider records
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    domain: &'a str,
    existing: &'a [ProviderRecord],
    options: ReconcileOptions,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler
    ///
    /// # Parameters
    ///
    /// - `domain`: Domain name, used in violation messages
    /// - `existing`: Provider records of that domain, in provider order
    /// - `options`: Enforcement and create policy
    pub fn new(domain: &'a str, existing: &'a [ProviderRecord], options: ReconcileOptions) -> Self {
        Self {
            domain,
            existing,
            options,
        }
    }

    /// Plan the create flow (rules 1 and 4)
    pub fn plan_creates(&self, new_records: &[Record]) -> Result<Plan> {
        let mut plan = Plan::default();

        for record in new_records {
            if exists(record, self.existing) {
                self.violation(&mut plan, Violation::AlreadyExists(record.clone()))?;
            }
        }

        for record in new_records {
            let attempt = match self.options.create_policy {
                CreatePolicy::SkipExisting => !exists(record, self.existing),
                CreatePolicy::AlwaysAttempt => true,
            };
            if attempt {
                plan.actions.push(Action::Create(record.clone()));
            } else {
                debug!("domain {}: skipping existing record {}", self.domain, record);
            }
        }

        Ok(plan)
    }

    /// Plan the modify flow (rules 1, 2 and 3)
    pub fn plan_modifies(&self, reassignments: &[Reassignment]) -> Result<Plan> {
        let mut plan = Plan::default();

        for pair in reassignments {
            if exists(&pair.new, self.existing) {
                self.violation(&mut plan, Violation::AlreadyExists(pair.new.clone()))?;
            }
        }

        for pair in reassignments {
            if !exists(&pair.old, self.existing) {
                self.violation(&mut plan, Violation::NotFound(pair.old.clone()))?;
            }
        }

        for pair in reassignments {
            match find_match(&pair.old, self.existing) {
                Some(record_id) if !exists(&pair.new, self.existing) => {
                    plan.actions.push(Action::Modify {
                        record_id: record_id.to_string(),
                        old: pair.old.clone(),
                        new: pair.new.clone(),
                    });
                }
                _ => {}
            }
        }

        Ok(plan)
    }

    /// Plan both flows, creates first
    pub fn plan_all(&self, declared: &DeclaredRecords) -> Result<Plan> {
        let mut plan = self.plan_creates(declared.new_records())?;
        plan.extend(self.plan_modifies(declared.reassignments())?);
        Ok(plan)
    }

    fn violation(&self, plan: &mut Plan, violation: Violation) -> Result<()> {
        match self.options.enforcement {
            Enforcement::Strict => Err(violation.into_error(self.domain)),
            Enforcement::Lenient => {
                warn!("domain {}: {}", self.domain, violation);
                plan.warnings.push(violation);
                Ok(())
            }
        }
    }
}
