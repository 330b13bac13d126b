use serde::Deserialize;
use std::{fmt, str::FromStr};
use tracing::{debug, warn};

use super::{
    error::AnalysisError,
    frequency::FrequencyMap,
    timestamp::{extract_datetime, RegistrationSlot},
};
use crate::attendees::RecordSource;

/// What to do with a row whose registration timestamp does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ErrorPolicy {
    /// Fail the whole analysis, naming the offending row.
    #[default]
    Abort,
    /// Log the row, leave it out of the counts and keep going.
    Skip,
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(ErrorPolicy::Abort),
            "skip" => Ok(ErrorPolicy::Skip),
            other => Err(format!("unknown timestamp policy {:?}", other)),
        }
    }
}

impl TryFrom<String> for ErrorPolicy {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Abort => f.write_str("abort"),
            ErrorPolicy::Skip => f.write_str("skip"),
        }
    }
}

/// Counts from one pass over the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally<K: Ord> {
    pub counts: FrequencyMap<K>,
    /// Rows left out under [`ErrorPolicy::Skip`].
    pub skipped: u64,
}

impl<K: Ord> Default for Tally<K> {
    fn default() -> Self {
        Self {
            counts: FrequencyMap::new(),
            skipped: 0,
        }
    }
}

/// Rewind `source` and count every row under the key `key_of` picks from its
/// registration slot.
pub fn count_registrations<S, K, F>(
    source: &mut S,
    policy: ErrorPolicy,
    key_of: F,
) -> Result<Tally<K>, AnalysisError>
where
    S: RecordSource,
    K: Ord,
    F: Fn(RegistrationSlot) -> K,
{
    source.rewind()?;
    let mut tally = Tally::default();

    for record in source.records() {
        let record = record?;
        let value = record.regdate().unwrap_or_default();
        match extract_datetime(value) {
            Ok(slot) => tally.counts.increment(key_of(slot)),
            Err(err) => match policy {
                ErrorPolicy::Abort => {
                    return Err(AnalysisError::MalformedTimestamp {
                        row: record.row(),
                        id: record.id().to_string(),
                        source: err,
                    })
                }
                ErrorPolicy::Skip => {
                    warn!(row = record.row(), id = record.id(), "skipping row: {}", err);
                    tally.skipped += 1;
                }
            },
        }
    }

    debug!(
        counted = tally.counts.total(),
        skipped = tally.skipped,
        "registration pass done"
    );
    Ok(tally)
}

/// Registrations per hour of day (0..=23).
pub fn count_by_hour<S: RecordSource>(
    source: &mut S,
    policy: ErrorPolicy,
) -> Result<Tally<u32>, AnalysisError> {
    count_registrations(source, policy, |slot| slot.hour)
}

/// Registrations per day of week (0..=6, Sunday = 0).
pub fn count_by_day<S: RecordSource>(
    source: &mut S,
    policy: ErrorPolicy,
) -> Result<Tally<u32>, AnalysisError> {
    count_registrations(source, policy, |slot| slot.weekday)
}
