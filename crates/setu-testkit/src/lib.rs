//! Setu Testing Infrastructure
//!
//! Deterministic doubles for every effect interface the store consumes, plus
//! fixtures that wire them together. Tier doubles support fault injection so
//! fallback, partial-ingest and timeout paths can be driven from tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! setu-testkit = { path = "../setu-testkit" }
//! ```
//!
//! ```rust,no_run
//! use setu_testkit::*;
//!
//! # async fn demo() {
//! let harness = TestHarness::new();
//! harness.content.fail_reads();
//! // build the store from harness.tiers() and harness.catalog ...
//! # }
//! ```

pub mod clock;
pub mod fixtures;
pub mod ledger;
pub mod strategies;
pub mod tiers;

pub use clock::{FixedClock, SteppingClock};
pub use fixtures::*;
pub use ledger::MemoryLedger;
pub use tiers::{MemoryTier, TierFaults};
