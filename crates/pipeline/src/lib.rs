//! Simulation orchestration pipeline.
//!
//! Drives a simulation's life against the Ap Predict engine: building the
//! launch payload, launching (with the pre-launch reset), polling progress
//! for batches of simulations, and fetching and persisting result payloads
//! once a run reports done.

pub mod error;
pub mod fetcher;
pub mod launcher;
pub mod payload;
pub mod poller;
