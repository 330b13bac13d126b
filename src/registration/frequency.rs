use std::collections::BTreeMap;

/// Occurrence count per discrete key. Iteration is in ascending key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyMap<K: Ord> {
    counts: BTreeMap<K, u64>,
}

impl<K: Ord> Default for FrequencyMap<K> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }
}

impl<K: Ord> FrequencyMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `key`, starting unseen keys at 1.
    pub fn increment(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    pub fn get(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn max_count(&self) -> Option<u64> {
        self.counts.values().copied().max()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Build from explicit `(key, count)` pairs; zero counts are dropped and
    /// repeated keys accumulate.
    pub fn from_counts<I: IntoIterator<Item = (K, u64)>>(pairs: I) -> Self {
        let mut counts = BTreeMap::new();
        for (key, n) in pairs {
            if n > 0 {
                *counts.entry(key).or_insert(0) += n;
            }
        }
        Self { counts }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> + '_ {
        self.counts.iter().map(|(k, c)| (k, *c))
    }
}

impl<K: Ord> FromIterator<K> for FrequencyMap<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut map = Self::new();
        for key in iter {
            map.increment(key);
        }
        map
    }
}
