//! Registration-time statistics: when attendees signed up, by hour of day and
//! by day of week, and which of those buckets peaked.

pub mod bucket;
pub mod error;
pub mod frequency;
pub mod peaks;
pub mod report;
pub mod timestamp;

pub use bucket::{count_by_day, count_by_hour, count_registrations, ErrorPolicy, Tally};
pub use error::{AnalysisError, TimestampError};
pub use frequency::FrequencyMap;
pub use peaks::{find_peaks, PeakSet};
pub use report::{day_name, render_statistics, DAY_NAMES};
pub use timestamp::{extract_datetime, RegistrationSlot, CENTURY_PIVOT};

use tracing::info;

use crate::attendees::RecordSource;

/// Hour and day counts for one roster, with their peaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationStats {
    pub hour_counts: FrequencyMap<u32>,
    pub peak_hours: PeakSet<u32>,
    pub day_counts: FrequencyMap<u32>,
    pub peak_days: PeakSet<u32>,
    /// Rows left out under [`ErrorPolicy::Skip`].
    pub skipped: u64,
}

/// Count registrations by hour and by day, one rewound pass each, and find the
/// peaks of both. An empty roster surfaces as
/// [`AnalysisError::EmptyFrequencyMap`].
pub fn analyze_registration_times<S: RecordSource>(
    source: &mut S,
    policy: ErrorPolicy,
) -> Result<RegistrationStats, AnalysisError> {
    let hours = count_by_hour(source, policy)?;
    let peak_hours = find_peaks(&hours.counts)?;

    let days = count_by_day(source, policy)?;
    let peak_days = find_peaks(&days.counts)?;

    info!(
        registrations = hours.counts.total(),
        skipped = hours.skipped,
        peak_hours = ?peak_hours.keys(),
        peak_days = ?peak_days.keys(),
        "analyzed registration times"
    );

    Ok(RegistrationStats {
        hour_counts: hours.counts,
        peak_hours,
        day_counts: days.counts,
        peak_days,
        skipped: hours.skipped,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    use crate::attendees::{AttendeeRecord, MemorySource};

    pub fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,event_manager::registration=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    /// Roster with an id column and a `regdate` column; ids count from 1.
    pub fn roster(regdates: &[&str]) -> MemorySource {
        let headers = Arc::new(vec![String::new(), "regdate".to_string()]);
        let records = regdates
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let row = i as u64 + 1;
                let values = vec![row.to_string(), d.to_string()];
                AttendeeRecord::new(row, Arc::clone(&headers), values)
            })
            .collect();
        MemorySource::new(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::roster;

    #[test]
    fn test_new_year_sunday() {
        let mut source = roster(&["1/1/17 10:00", "1/1/17 10:15", "1/1/17 14:00"]);
        let stats = analyze_registration_times(&mut source, ErrorPolicy::Abort).unwrap();

        assert_eq!(stats.hour_counts, FrequencyMap::from_counts([(10, 2), (14, 1)]));
        assert_eq!(stats.peak_hours.keys(), &[10]);
        assert_eq!(stats.day_counts, FrequencyMap::from_counts([(0, 3)]));
        assert_eq!(stats.peak_days.keys(), &[0]);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn test_tied_days() {
        // Saturday 2008-11-15, Sunday 2008-11-16
        let mut source = roster(&[
            "11/15/08 09:00",
            "11/16/08 09:00",
            "11/16/08 18:00",
            "11/15/08 20:00",
        ]);
        let stats = analyze_registration_times(&mut source, ErrorPolicy::Abort).unwrap();
        assert_eq!(stats.peak_days.keys(), &[0, 6]);
        assert_eq!(stats.peak_hours.keys(), &[9]);
    }

    #[test]
    fn test_empty_roster() {
        let mut source = roster(&[]);
        assert!(matches!(
            analyze_registration_times(&mut source, ErrorPolicy::Abort),
            Err(AnalysisError::EmptyFrequencyMap)
        ));
    }

    #[test]
    fn test_all_rows_skipped_is_empty() {
        let mut source = roster(&["??", "!!"]);
        assert!(matches!(
            analyze_registration_times(&mut source, ErrorPolicy::Skip),
            Err(AnalysisError::EmptyFrequencyMap)
        ));
    }
}
