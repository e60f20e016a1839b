use dashmap::DashMap;

use crate::models::{Category, CounterKey, Snapshot, Tally, TimeBucket};

/// Concurrent `(category, minute) -> Tally` aggregate.
///
/// Each tally lives behind its DashMap shard lock, so both counts of a single
/// key are always updated and read together. Keys are created on first write
/// and never removed for the lifetime of the store.
#[derive(Debug, Default)]
pub struct CounterStore {
    tallies: DashMap<CounterKey, Tally>,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Add to the tally for the current UTC minute
    pub fn increment(&self, category: Category, views: u64, clicks: u64) {
        self.increment_in(category, TimeBucket::now(), views, clicks);
    }

    pub fn increment_in(&self, category: Category, bucket: TimeBucket, views: u64, clicks: u64) {
        let mut tally = self
            .tallies
            .entry(CounterKey::new(category, bucket))
            .or_default();
        tally.view = tally.view.saturating_add(views);
        tally.click = tally.click.saturating_add(clicks);
    }

    pub fn get(&self, key: &CounterKey) -> Option<Tally> {
        self.tallies.get(key).map(|tally| *tally)
    }

    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    /// Copy every tally out of the store.
    ///
    /// Every pair is read under its shard lock. Writes to other keys that race
    /// with the copy may or may not be included.
    pub fn snapshot(&self) -> Snapshot {
        self.tallies
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}
