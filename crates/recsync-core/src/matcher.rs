//! Existence checks of declared records against provider records

use crate::record::Record;
use crate::traits::ProviderRecord;

/// Find the provider record a declared record refers to
///
/// Scans `provider_records` in order and returns the id of the first record
/// that [`Record::matches`]. When the provider holds duplicates, list order
/// decides. `None` means the record does not exist yet.
pub fn find_match<'a>(record: &Record, provider_records: &'a [ProviderRecord]) -> Option<&'a str> {
    provider_records
        .iter()
        .find(|candidate| record.matches(candidate))
        .map(|candidate| candidate.id.as_str())
}

/// Whether a declared record exists among the provider records
pub fn exists(record: &Record, provider_records: &[ProviderRecord]) -> bool {
    find_match(record, provider_records).is_some()
}
