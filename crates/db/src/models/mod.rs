//! Entity models and insert payloads.
//!
//! Each submodule contains `FromRow` + `Serialize` structs matching the
//! database rows, plus plain insert payload structs consumed by the
//! repositories (request-level DTOs with validation live in the API crate).

pub mod cell_model;
pub mod simulation;
