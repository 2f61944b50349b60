//! Configuration types for recsync
//!
//! The config file is INI formatted. The `auth` section carries the login
//! token; every section whose name contains a dot describes one domain:
//!
//! ```ini
//! [auth]
//! login_token = 12345,0123456789abcdef
//!
//! [example.com]
//! new = www A default 1.2.3.4, mail MX default mx.example.com. mx:10
//! ftp A default 1.2.3.4 = ftp A default 5.6.7.8
//! ```
//!
//! The `new` key lists records to create. Any other key is an old record
//! that should be rewritten into the record given as its value.

use crate::error::{Error, Result};
use crate::record::Record;
use ini::Ini;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Section holding credentials
pub const AUTH_SECTION: &str = "auth";

/// Key of the login token inside the auth section
pub const LOGIN_TOKEN_KEY: &str = "login_token";

/// Key listing records to create inside a domain section
pub const NEW_KEY: &str = "new";

/// Provider login token (`id,token`)
///
/// `Debug` and `Display` never reveal the token.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginToken(String);

impl LoginToken {
    /// Wrap a login token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building API requests only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LoginToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LoginToken(<REDACTED>)")
    }
}

impl fmt::Display for LoginToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<REDACTED>")
    }
}

/// An old → new record pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    /// Record expected to exist on the provider
    pub old: Record,
    /// Record it should become
    pub new: Record,
}

impl Reassignment {
    /// Create a reassignment
    pub fn new(old: Record, new: Record) -> Self {
        Self { old, new }
    }
}

/// Desired state of one domain, in declared order
///
/// Built once from the config and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredRecords {
    new_records: Option<Vec<Record>>,
    reassignments: Vec<Reassignment>,
}

impl DeclaredRecords {
    /// Create a declared record set
    ///
    /// `new_records` is `None` when the section has no `new` key.
    pub fn new(new_records: Option<Vec<Record>>, reassignments: Vec<Reassignment>) -> Self {
        Self {
            new_records,
            reassignments,
        }
    }

    /// Records to create, empty when no `new` key was given
    pub fn new_records(&self) -> &[Record] {
        self.new_records.as_deref().unwrap_or_default()
    }

    /// Whether the section declared a `new` key
    pub fn has_new_records(&self) -> bool {
        self.new_records.is_some()
    }

    /// Old → new pairs
    pub fn reassignments(&self) -> &[Reassignment] {
        &self.reassignments
    }

    /// Whether the section declared any reassignment
    pub fn has_reassignments(&self) -> bool {
        !self.reassignments.is_empty()
    }

    /// Parse the comma separated value of a `new` key
    ///
    /// Empty fragments (e.g. from a trailing comma) are skipped.
    pub fn parse_new_list(value: &str) -> Result<Vec<Record>> {
        value
            .split(',')
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .map(Record::from_str)
            .collect()
    }
}

/// Configuration of one domain section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainConfig {
    /// Domain name, as named by the section
    pub name: String,
    /// Declared records
    pub records: DeclaredRecords,
}

/// Main recsync configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Token sent with every provider call
    pub login_token: LoginToken,

    /// Domain sections, in file order
    pub domains: Vec<DomainConfig>,
}

impl SyncConfig {
    /// Read and parse a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        let config: Self = text.parse()?;
        tracing::debug!(
            "Loaded {} domain section(s) from {}",
            config.domains.len(),
            path.display()
        );
        Ok(config)
    }

    /// Look up a domain section by name
    pub fn domain(&self, name: &str) -> Option<&DomainConfig> {
        self.domains.iter().find(|d| d.name == name)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.login_token.expose().trim().is_empty() {
            return Err(Error::config("auth.login_token cannot be empty"));
        }

        for (index, domain) in self.domains.iter().enumerate() {
            if self.domains[..index].iter().any(|d| d.name == domain.name) {
                return Err(Error::config(format!(
                    "Domain section [{}] appears more than once",
                    domain.name
                )));
            }
        }

        Ok(())
    }

    fn domain_from_section<'a>(
        name: &str,
        entries: impl Iterator<Item = (&'a str, &'a str)>,
    ) -> Result<DomainConfig> {
        let mut new_records = None;
        let mut reassignments = Vec::new();

        for (key, value) in entries {
            if key == NEW_KEY {
                let records = DeclaredRecords::parse_new_list(value)
                    .map_err(|e| Error::config(format!("[{}] new: {}", name, e)))?;
                new_records = Some(records);
                continue;
            }

            let old: Record = key
                .parse()
                .map_err(|e| Error::config(format!("[{}] key: {}", name, e)))?;
            let new: Record = value
                .parse()
                .map_err(|e| Error::config(format!("[{}] value: {}", name, e)))?;
            reassignments.push(Reassignment::new(old, new));
        }

        Ok(DomainConfig {
            name: name.to_string(),
            records: DeclaredRecords::new(new_records, reassignments),
        })
    }
}

impl FromStr for SyncConfig {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let ini = Ini::load_from_str(text)
            .map_err(|e| Error::config(format!("Invalid config file: {}", e)))?;

        let login_token = ini
            .section(Some(AUTH_SECTION))
            .ok_or_else(|| Error::config("Missing [auth] section"))?
            .get(LOGIN_TOKEN_KEY)
            .ok_or_else(|| Error::config("Missing login_token in [auth] section"))?;

        let mut domains = Vec::new();
        for (section, properties) in ini.iter() {
            let Some(name) = section else {
                continue;
            };
            if !name.contains('.') {
                if name != AUTH_SECTION {
                    tracing::debug!("Ignoring non-domain section [{}]", name);
                }
                continue;
            }
            domains.push(Self::domain_from_section(name, properties.iter())?);
        }

        let config = Self {
            login_token: LoginToken::new(login_token.trim()),
            domains,
        };
        config.validate()?;
        Ok(config)
    }
}
