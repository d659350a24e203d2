//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers check ownership explicitly via the `apportal_core::auth`
//! predicates, delegate to the repositories in `apportal_db` (and to
//! `apportal_pipeline` for launch/poll operations), and map errors via
//! [`crate::error::AppError`].

pub mod catalog;
pub mod simulation;
