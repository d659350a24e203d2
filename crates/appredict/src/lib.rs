//! Ap Predict REST client library.
//!
//! Wraps the simulation engine's HTTP surface (run launch, progress
//! polling, STOP, result retrieval) using [`reqwest`], along with the
//! `{"success": ..}` / `{"error": ..}` envelope helpers and per-command
//! result schema validation.

pub mod api;
pub mod commands;
pub mod envelope;
pub mod schema;
