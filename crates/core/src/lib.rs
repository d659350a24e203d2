//! Domain logic for the AP Portal simulation service.
//!
//! Pure types and functions shared by the persistence, pipeline and API
//! crates: simulation status and progress labels, concentration-unit
//! conversion, authorization predicates, chart and spreadsheet formatting.
//! Nothing in this crate performs I/O.

pub mod auth;
pub mod charts;
pub mod concentration;
pub mod error;
pub mod naming;
pub mod pk_data;
pub mod status;
pub mod types;
pub mod units;
pub mod workbook;

pub use error::CoreError;
