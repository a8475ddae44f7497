//! # Scheduled MPC with Beaver tuples
//!
//! A layered runtime for secure multi-party computation over secret-shared
//! boolean (and arithmetic) circuits, honest-but-curious setting. Two or
//! more parties jointly evaluate a circuit over private inputs; nothing
//! beyond explicit output gates is revealed.
//!
//! The layers, leaves first:
//!
//! - [channel_utils] — ordered typed channels between pairs of parties;
//! - [engine] — input-masking PRGs, the open-to-all/open-to-party
//!   collectives, Beaver-tuple consumption, batched non-free execution;
//! - [scheduler] — wire keeper, gate keeper levels, and the four scheduler
//!   variants the frontend computes against;
//! - [metrics] — observational counters.
//!
//! [scheduler::lazy::LazyScheduler] is the production configuration: it
//! defers gates into levels and executes each non-free level with two
//! network roundtrips no matter how many gates it holds.

pub mod channel_utils;
pub mod engine;
pub mod errors;
pub mod metrics;
pub mod scheduler;

#[cfg(test)]
mod scheduler_tests;
