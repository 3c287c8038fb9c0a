use std::collections::HashMap;
use std::fmt;

use crate::owner::OwnerId;

/// Per-owner millisecond bookkeeping. Untracked owners read as zero.
///
/// The scheduler keeps two of these: accumulated time usage and the
/// timestamp of each owner's latest selection.
#[derive(Clone, Default)]
pub struct UsageMap {
    values: HashMap<OwnerId, f64>,
}

impl UsageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, owner: OwnerId) -> f64 {
        self.values.get(&owner).copied().unwrap_or(0.0)
    }

    pub fn add(&mut self, owner: OwnerId, delta: f64) {
        *self.values.entry(owner).or_insert(0.0) += delta;
    }

    pub fn set(&mut self, owner: OwnerId, value: f64) {
        self.values.insert(owner, value);
    }

    /// Erase an owner's entry, returning the previous value if it was tracked.
    pub fn remove(&mut self, owner: OwnerId) -> Option<f64> {
        self.values.remove(&owner)
    }

    pub fn contains(&self, owner: OwnerId) -> bool {
        self.values.contains_key(&owner)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OwnerId, f64)> + '_ {
        self.values.iter().map(|(id, value)| (*id, *value))
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl fmt::Debug for UsageMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsageMap")
            .field("tracked", &self.values.len())
            .finish()
    }
}
