//! Declared DNS records
//!
//! A record literal is a whitespace-separated tuple:
//!
//! ```text
//! sub_domain record_type record_line value [attr:value ...]
//! ```
//!
//! The same literal form is used for config keys, config values and log
//! output, so `Display` renders a string that parses back into an equal
//! [`Record`].

use crate::error::{Error, Result};
use crate::traits::ProviderRecord;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Parameter names the provider API uses for its own purposes
///
/// An extra attribute with one of these names would overwrite a core field
/// or a protocol parameter in the request form.
const RESERVED_ATTRS: &[&str] = &[
    "sub_domain",
    "record_type",
    "record_line",
    "value",
    "login_token",
    "format",
    "domain_id",
    "record_id",
];

/// A DNS record declared in the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Host label (`@`, `www`, ...)
    pub sub_domain: String,
    /// Record type, always upper case
    pub record_type: String,
    /// Routing line selector
    pub record_line: String,
    /// Record value
    pub value: String,
    /// Optional attributes such as `ttl` or `mx`
    pub extras: BTreeMap<String, String>,
}

impl Record {
    /// Create a record without extra attributes
    pub fn new(
        sub_domain: impl Into<String>,
        record_type: impl AsRef<str>,
        record_line: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            sub_domain: sub_domain.into(),
            record_type: record_type.as_ref().to_ascii_uppercase(),
            record_line: record_line.into(),
            value: value.into(),
            extras: BTreeMap::new(),
        }
    }

    /// Add an extra attribute
    pub fn with_extra(mut self, attr: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(attr.into(), value.into());
        self
    }

    /// Whether a provider record is the same record
    ///
    /// Only host, type, line and value take part; extra attributes and
    /// provider-side fields (`id`, `enabled`) are ignored.
    pub fn matches(&self, other: &ProviderRecord) -> bool {
        self.sub_domain == other.name
            && self.record_type == other.record_type
            && self.record_line == other.line
            && self.value == other.value
    }

    /// Request parameters describing this record for create/modify calls
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("sub_domain".to_string(), self.sub_domain.clone()),
            ("record_type".to_string(), self.record_type.clone()),
            ("record_line".to_string(), self.record_line.clone()),
            ("value".to_string(), self.value.clone()),
        ];
        fields.extend(self.extras.iter().map(|(k, v)| (k.clone(), v.clone())));
        fields
    }
}

impl FromStr for Record {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(Error::malformed(format!(
                "'{}': record must have at least 4 attributes: \
                 sub_domain, record_type, record_line, value",
                text.trim()
            )));
        }

        let mut record = Record::new(tokens[0], tokens[1], tokens[2], tokens[3]);

        for token in &tokens[4..] {
            let (attr, value) = token.split_once(':').ok_or_else(|| {
                Error::malformed(format!(
                    "'{}': extra attribute '{}' must use the form attr:value",
                    text.trim(),
                    token
                ))
            })?;

            if attr.is_empty() {
                return Err(Error::malformed(format!(
                    "'{}': extra attribute '{}' has an empty name",
                    text.trim(),
                    token
                )));
            }

            if RESERVED_ATTRS.contains(&attr) {
                return Err(Error::malformed(format!(
                    "'{}': '{}' cannot be given as an extra attribute",
                    text.trim(),
                    attr
                )));
            }

            record.extras.insert(attr.to_string(), value.to_string());
        }

        Ok(record)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.sub_domain, self.record_type, self.record_line, self.value
        )?;
        for (attr, value) in &self.extras {
            write!(f, " {}:{}", attr, value)?;
        }
        Ok(())
    }
}
