//! # Fairshare Core
//!
//! Per-owner work queues with a time-usage based fairness policy. The
//! scheduler decides *which owner's item runs next*; executing the item is
//! left to the embedding service.
//!
//! ## Overview
//!
//! - [`owner`]: owners, their queues, and owner identifiers
//! - [`registry`]: name-addressed owner registry with explicit create paths
//! - [`usage`]: per-owner time bookkeeping keyed by stable owner handles
//! - [`scheduler`]: the selection algorithm and usage accounting
//! - [`shared`]: a lock-guarded handle for multi-task embedders
//! - [`clock`]: monotonic and manually driven time sources
//! - [`config`]: scoring knobs
//!
//! ## Examples
//!
//! ```
//! use fairshare_core::{ManualClock, Scheduler};
//!
//! let clock = ManualClock::starting_at(1_000.0);
//! let mut scheduler = Scheduler::with_clock(clock.clone());
//! scheduler.add("alice", ["render-1", "render-2"]);
//! scheduler.add("bob", ["export-1"]);
//!
//! assert_eq!(scheduler.next(true), Some("render-1"));
//! clock.advance_millis(250.0);
//! // alice has now been credited time, bob has not.
//! assert_eq!(scheduler.next(true), Some("export-1"));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Time sources
pub mod clock;
/// Scheduler configuration
pub mod config;
/// Owners and their queues
pub mod owner;
/// Owner registry
pub mod registry;
/// Fair selection
pub mod scheduler;
/// Shared scheduler handle
pub mod shared;
/// Usage bookkeeping
pub mod usage;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{SchedulerConfig, ScoringPolicy};
pub use owner::{Owner, OwnerId, OwnerName};
pub use registry::OwnerRegistry;
pub use scheduler::{OwnerUsage, Scheduler};
pub use shared::SharedScheduler;
pub use usage::UsageMap;
