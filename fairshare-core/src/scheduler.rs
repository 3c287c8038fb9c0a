use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::clock::{Clock, MonotonicClock};
use crate::config::SchedulerConfig;
use crate::owner::{Owner, OwnerId, OwnerName};
use crate::registry::OwnerRegistry;
use crate::usage::UsageMap;

/// Point-in-time view of one owner's queue and usage accounting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OwnerUsage {
    pub id: OwnerId,
    pub name: OwnerName,
    pub queued: usize,
    pub time_usage_ms: f64,
    pub last_usage_ms: f64,
    pub score: f64,
    pub current: bool,
}

/// Time-usage fair scheduler over per-owner queues.
///
/// Every selection first closes the timing interval of the previously
/// selected owner, crediting the elapsed wall time to it, then picks the
/// eligible owner (non-empty queue) with the lowest [`ScoringPolicy`] score
/// and starts timing it. Exact ties go to the owner registered first.
///
/// The scheduler is single-timeline: all mutation goes through `&mut self`.
/// Share it across tasks with [`SharedScheduler`].
///
/// [`ScoringPolicy`]: crate::config::ScoringPolicy
/// [`SharedScheduler`]: crate::shared::SharedScheduler
pub struct Scheduler<T, C = MonotonicClock> {
    owners: OwnerRegistry<T>,
    time_usage: UsageMap,
    last_usage: UsageMap,
    current: Option<OwnerId>,
    clock: C,
    config: SchedulerConfig,
}

impl<T> Scheduler<T, MonotonicClock> {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self::with_config_and_clock(config, MonotonicClock::new())
    }
}

impl<T> Default for Scheduler<T, MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Clock> Scheduler<T, C> {
    pub fn with_clock(clock: C) -> Self {
        Self::with_config_and_clock(SchedulerConfig::default(), clock)
    }

    pub fn with_config_and_clock(config: SchedulerConfig, clock: C) -> Self {
        Self {
            owners: OwnerRegistry::new(),
            time_usage: UsageMap::new(),
            last_usage: UsageMap::new(),
            current: None,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn owners(&self) -> &OwnerRegistry<T> {
        &self.owners
    }

    /// Registered owner for `name`, if any. Never installs an entry; an
    /// unknown name is equivalent to an owner with an empty queue.
    pub fn get_owner(&self, name: impl Into<OwnerName>) -> Option<&Owner<T>> {
        self.owners.lookup(name.into().as_str())
    }

    /// Queued item count for `name`; zero for unknown owners.
    pub fn queue_len(&self, name: impl Into<OwnerName>) -> usize {
        self.get_owner(name).map_or(0, Owner::len)
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Total queued items across all owners.
    pub fn pending(&self) -> usize {
        self.owners.iter().map(Owner::len).sum()
    }

    /// Accumulated milliseconds credited to each owner.
    pub fn time_usage(&self) -> &UsageMap {
        &self.time_usage
    }

    /// Start timestamp of each owner's most recent selection.
    pub fn last_usage(&self) -> &UsageMap {
        &self.last_usage
    }

    /// Owner currently being timed.
    pub fn current_owner(&self) -> Option<&Owner<T>> {
        self.current.and_then(|id| self.owners.get(id))
    }

    pub fn is_timing(&self) -> bool {
        self.current.is_some()
    }

    /// Close the current timing interval, crediting the elapsed time to the
    /// owner being timed. No-op when idle.
    pub fn stop(&mut self) {
        let Some(current) = self.current.take() else {
            return;
        };

        let now = self.clock.now();
        let started = self.last_usage.get(current);
        let mut elapsed = now - started;
        if elapsed < 0.0 {
            warn!(
                owner = current.0,
                started_at = started,
                now,
                "clock reading went backwards; crediting no time"
            );
            elapsed = 0.0;
        }

        self.time_usage.add(current, elapsed);
        trace!(owner = current.0, elapsed_ms = elapsed, "stopped timing owner");
    }

    /// Run one selection and start timing the winner.
    fn select(&mut self) -> Option<OwnerId> {
        self.stop();

        let policy = self.config.scoring;
        let mut preferred: Option<(OwnerId, f64)> = None;
        for owner in self.owners.iter().filter(|owner| !owner.is_empty()) {
            let id = owner.id();
            let score = policy.score(self.time_usage.get(id), self.last_usage.get(id));
            match preferred {
                Some((_, best)) if score >= best => {}
                _ => preferred = Some((id, score)),
            }
        }

        let (id, score) = preferred?;
        let now = self.clock.now();
        self.current = Some(id);
        self.last_usage.set(id, now);

        if let Some(owner) = self.owners.get(id) {
            debug!(
                owner = %owner.name(),
                score,
                started_at = now,
                queued = owner.len(),
                "selected owner"
            );
        }
        Some(id)
    }

    /// Select the next owner and remove its head item.
    pub fn pop_next(&mut self) -> Option<T> {
        let id = self.select()?;
        self.owners.get_mut(id)?.pop()
    }

    /// Select the next owner and borrow its head item without removing it.
    pub fn peek_next(&mut self) -> Option<&T> {
        let id = self.select()?;
        self.owners.get(id)?.peek()
    }

    /// Remove an owner together with its usage accounting. If it was being
    /// timed, the open interval is discarded.
    pub fn remove_owner(&mut self, name: impl Into<OwnerName>) -> Option<Owner<T>> {
        let name = name.into();
        let owner = self.owners.remove(name.as_str())?;
        self.forget(owner.id());
        debug!(owner = %name, queued = owner.len(), "removed owner");
        Some(owner)
    }

    /// Rename an owner. Queue, usage accounting and timing state follow the
    /// owner. An owner already holding `to` is displaced and returned with its
    /// accounting erased.
    pub fn rename_owner(
        &mut self,
        from: impl Into<OwnerName>,
        to: impl Into<OwnerName>,
    ) -> Option<Owner<T>> {
        let displaced = self.owners.rename(from, to)?;
        self.forget(displaced.id());
        debug!(
            owner = %displaced.name(),
            queued = displaced.len(),
            "rename displaced owner"
        );
        Some(displaced)
    }

    fn forget(&mut self, id: OwnerId) {
        if self.current == Some(id) {
            self.current = None;
        }
        self.time_usage.remove(id);
        self.last_usage.remove(id);
    }

    fn usage_for(&self, owner: &Owner<T>) -> OwnerUsage {
        let id = owner.id();
        let time_usage_ms = self.time_usage.get(id);
        let last_usage_ms = self.last_usage.get(id);
        OwnerUsage {
            id,
            name: owner.name().clone(),
            queued: owner.len(),
            time_usage_ms,
            last_usage_ms,
            score: self.config.scoring.score(time_usage_ms, last_usage_ms),
            current: self.current == Some(id),
        }
    }

    pub fn usage_of(&self, name: impl Into<OwnerName>) -> Option<OwnerUsage> {
        self.get_owner(name).map(|owner| self.usage_for(owner))
    }

    /// Usage view of every registered owner in registration order.
    pub fn snapshot(&self) -> Vec<OwnerUsage> {
        self.owners
            .iter()
            .map(|owner| self.usage_for(owner))
            .collect()
    }
}

impl<T: PartialEq, C: Clock> Scheduler<T, C> {
    /// Queue items for `owner`, registering it on first use. Items already
    /// queued for that owner are skipped. Returns how many were appended.
    pub fn add<I>(&mut self, owner: impl Into<OwnerName>, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        self.owners.get_or_create(owner).add(items)
    }
}

impl<T: Clone, C: Clock> Scheduler<T, C> {
    /// Fairly pick the next item. With `destroy` the item is removed from its
    /// owner's queue, otherwise a copy is returned and the queue is left as is.
    /// Returns `None` when no owner has queued work.
    pub fn next(&mut self, destroy: bool) -> Option<T> {
        let id = self.select()?;
        self.owners.get_mut(id)?.next(destroy)
    }
}

impl<T, C> fmt::Debug for Scheduler<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("owner_count", &self.owners.len())
            .field("pending", &self.owners.iter().map(Owner::len).sum::<usize>())
            .field("current", &self.current)
            .field("scoring", &self.config.scoring)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::ScoringPolicy;

    fn scheduler_at(millis: f64) -> (Scheduler<u32, ManualClock>, ManualClock) {
        let clock = ManualClock::starting_at(millis);
        (Scheduler::with_clock(clock.clone()), clock)
    }

    fn queue_of(scheduler: &Scheduler<u32, ManualClock>, name: &str) -> Vec<u32> {
        scheduler
            .get_owner(name)
            .map(|owner| owner.iter().copied().collect())
            .unwrap_or_default()
    }

    #[test]
    fn empty_scheduler_returns_none_and_stays_idle() {
        let (mut scheduler, _clock) = scheduler_at(1_000.0);
        assert_eq!(scheduler.next(true), None);
        assert!(!scheduler.is_timing());

        scheduler.add("idle", []);
        assert_eq!(scheduler.owner_count(), 1);
        assert_eq!(scheduler.next(true), None);
        assert_eq!(scheduler.next(false), None);
        assert!(scheduler.current_owner().is_none());
    }

    #[test]
    fn destructive_next_removes_exactly_one() {
        let (mut scheduler, _clock) = scheduler_at(1_000.0);
        scheduler.add("u", [1, 2, 3]);

        assert_eq!(scheduler.next(true), Some(1));
        assert_eq!(queue_of(&scheduler, "u"), vec![2, 3]);
    }

    #[test]
    fn peek_is_idempotent_and_keeps_item() {
        let (mut scheduler, _clock) = scheduler_at(1_000.0);
        scheduler.add("u", [7, 8]);

        assert_eq!(scheduler.next(false), Some(7));
        assert_eq!(scheduler.next(false), Some(7));
        assert_eq!(scheduler.peek_next(), Some(&7));
        assert_eq!(queue_of(&scheduler, "u"), vec![7, 8]);
    }

    #[test]
    fn add_suppresses_duplicates() {
        let (mut scheduler, _clock) = scheduler_at(1_000.0);
        assert_eq!(scheduler.add("u", [4, 4, 5]), 2);
        assert_eq!(queue_of(&scheduler, "u"), vec![4, 5]);
        assert_eq!(scheduler.pending(), 2);
    }

    #[test]
    fn stop_credits_exactly_the_elapsed_interval() {
        let (mut scheduler, clock) = scheduler_at(100.0);
        scheduler.add("x", [1]);

        assert_eq!(scheduler.next(false), Some(1));
        let id = scheduler.current_owner().map(Owner::id).expect("timing x");
        assert_eq!(scheduler.last_usage().get(id), 100.0);

        clock.set(150.0);
        scheduler.stop();

        assert_eq!(scheduler.time_usage().get(id), 50.0);
        assert!(!scheduler.is_timing());

        clock.set(400.0);
        scheduler.stop();
        assert_eq!(scheduler.time_usage().get(id), 50.0);
    }

    #[test]
    fn next_closes_previous_interval_even_without_work() {
        let (mut scheduler, clock) = scheduler_at(1_000.0);
        scheduler.add("a", [1]);
        assert_eq!(scheduler.pop_next(), Some(1));

        clock.advance_millis(30.0);
        assert_eq!(scheduler.pop_next(), None);

        let usage = scheduler.usage_of("a").expect("registered");
        assert_eq!(usage.time_usage_ms, 30.0);
        assert!(!usage.current);
        assert!(!scheduler.is_timing());
    }

    #[test]
    fn owner_without_usage_is_preferred() {
        let (mut scheduler, clock) = scheduler_at(1_000.0);
        scheduler.add("a", [1, 2]);
        scheduler.add("b", [10]);

        assert_eq!(scheduler.next(true), Some(1));
        clock.advance_millis(10.0);
        assert_eq!(scheduler.next(true), Some(10));
        clock.advance_millis(10.0);
        assert_eq!(scheduler.next(true), Some(2));
        clock.advance_millis(10.0);
        assert_eq!(scheduler.next(true), None);
    }

    #[test]
    fn scoring_policies_can_disagree() {
        fn run(policy: ScoringPolicy) -> Vec<u32> {
            let clock = ManualClock::starting_at(10.0);
            let config = SchedulerConfig { scoring: policy };
            let mut scheduler = Scheduler::with_config_and_clock(config, clock.clone());
            scheduler.add("a", [1, 2, 3]);
            scheduler.add("b", [10, 20, 30]);

            let mut picked = Vec::new();
            picked.extend(scheduler.next(true));
            clock.set(110.0);
            picked.extend(scheduler.next(true));
            clock.set(120.0);
            picked.extend(scheduler.next(true));
            picked
        }

        // a: 100ms used, last selected at 10 -> 1_000; b: 10ms used at 110 -> 1_100.
        assert_eq!(run(ScoringPolicy::UsageTimesLastSelection), vec![1, 10, 2]);
        assert_eq!(run(ScoringPolicy::LeastTimeUsed), vec![1, 10, 20]);
    }

    #[test]
    fn rename_preserves_queue_and_usage() {
        let (mut scheduler, clock) = scheduler_at(1_000.0);
        scheduler.add("a", [1, 2]);

        assert_eq!(scheduler.next(false), Some(1));
        clock.advance_millis(20.0);
        scheduler.stop();
        let id = scheduler.get_owner("a").map(Owner::id).expect("a registered");

        assert!(scheduler.rename_owner("a", "b").is_none());

        assert!(scheduler.get_owner("a").is_none());
        assert_eq!(scheduler.queue_len("a"), 0);
        assert_eq!(scheduler.get_owner("b").map(Owner::id), Some(id));
        assert_eq!(scheduler.time_usage().get(id), 20.0);
        assert_eq!(scheduler.last_usage().get(id), 1_000.0);

        scheduler.add("b", [3]);
        assert_eq!(queue_of(&scheduler, "b"), vec![1, 2, 3]);

        scheduler.add("a", [9]);
        let fresh = scheduler.get_owner("a").map(Owner::id).expect("fresh a");
        assert_ne!(fresh, id);
        assert_eq!(queue_of(&scheduler, "a"), vec![9]);
    }

    #[test]
    fn rename_mid_interval_keeps_timing_the_same_owner() {
        let (mut scheduler, clock) = scheduler_at(1_000.0);
        scheduler.add("a", [1]);
        assert_eq!(scheduler.next(false), Some(1));

        scheduler.rename_owner("a", "renamed");
        clock.advance_millis(40.0);
        scheduler.stop();

        let usage = scheduler.usage_of("renamed").expect("renamed owner");
        assert_eq!(usage.time_usage_ms, 40.0);
    }

    #[test]
    fn rename_onto_existing_owner_erases_displaced_accounting() {
        let (mut scheduler, clock) = scheduler_at(1_000.0);
        scheduler.add("b", [5]);
        assert_eq!(scheduler.next(true), Some(5));
        clock.advance_millis(10.0);
        scheduler.stop();
        let displaced_id = scheduler.get_owner("b").map(Owner::id).expect("b");

        scheduler.add("a", [1]);
        let displaced = scheduler.rename_owner("a", "b").expect("b displaced");

        assert_eq!(displaced.id(), displaced_id);
        assert!(!scheduler.time_usage().contains(displaced_id));
        assert!(!scheduler.last_usage().contains(displaced_id));
        assert_eq!(queue_of(&scheduler, "b"), vec![1]);
    }

    #[test]
    fn remove_owner_erases_usage_and_clears_current() {
        let (mut scheduler, clock) = scheduler_at(1_000.0);
        scheduler.add("a", [1, 2]);
        assert_eq!(scheduler.next(true), Some(1));
        let id = scheduler.current_owner().map(Owner::id).expect("timing a");

        clock.advance_millis(5.0);
        let removed = scheduler.remove_owner("a").expect("a removed");

        assert_eq!(removed.iter().copied().collect::<Vec<_>>(), vec![2]);
        assert!(!scheduler.is_timing());
        assert!(!scheduler.time_usage().contains(id));
        assert!(!scheduler.last_usage().contains(id));
        assert!(scheduler.remove_owner("a").is_none());
    }

    #[test]
    fn snapshot_lists_owners_in_registration_order() {
        let (mut scheduler, clock) = scheduler_at(1_000.0);
        scheduler.add("first", [1]);
        scheduler.add(2u32, [2, 3]);
        assert_eq!(scheduler.next(true), Some(1));
        clock.advance_millis(25.0);

        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].name.as_str(), "first");
        assert!(snapshot[0].current);
        assert_eq!(snapshot[0].queued, 0);
        assert_eq!(snapshot[0].last_usage_ms, 1_000.0);
        assert_eq!(snapshot[1].name.as_str(), "2");
        assert_eq!(snapshot[1].queued, 2);
        assert_eq!(snapshot[1].score, 0.0);

        let json = serde_json::to_value(&snapshot[1]).expect("serialize usage");
        assert_eq!(json["name"], "2");
        assert_eq!(json["queued"], 2);
    }

    #[test]
    fn backwards_clock_credits_nothing() {
        let (mut scheduler, clock) = scheduler_at(500.0);
        scheduler.add("a", [1]);
        assert_eq!(scheduler.next(false), Some(1));

        clock.set(400.0);
        scheduler.stop();
        assert_eq!(scheduler.usage_of("a").map(|u| u.time_usage_ms), Some(0.0));
    }
}
