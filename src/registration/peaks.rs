use super::{error::AnalysisError, frequency::FrequencyMap};

/// Every key tied at a frequency map's maximum count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeakSet<K> {
    keys: Vec<K>,
    count: u64,
}

impl<K> PeakSet<K> {
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// The shared maximum count.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn contains(&self, key: &K) -> bool
    where
        K: PartialEq,
    {
        self.keys.contains(key)
    }
}

/// Find the maximum count in `map` and return all keys that reach it.
/// Ties are all reported.
pub fn find_peaks<K: Ord + Clone>(map: &FrequencyMap<K>) -> Result<PeakSet<K>, AnalysisError> {
    let count = map.max_count().ok_or(AnalysisError::EmptyFrequencyMap)?;
    let keys = map
        .iter()
        .filter(|(_, n)| *n == count)
        .map(|(k, _)| k.clone())
        .collect();
    Ok(PeakSet { keys, count })
}
