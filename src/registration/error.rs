use thiserror::Error;

use crate::attendees::SourceError;

/// A registration timestamp that does not read as `MM/DD/YY HH:MM`, or names
/// a date/time that cannot exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed registration timestamp {value:?}: {reason}")]
pub struct TimestampError {
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("row {row} (id {id:?}): {source}")]
    MalformedTimestamp {
        row: u64,
        id: String,
        #[source]
        source: TimestampError,
    },

    #[error("no registrations to find a peak in")]
    EmptyFrequencyMap,

    #[error(transparent)]
    Source(#[from] SourceError),
}
