//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod cell_model_repo;
pub mod ion_current_repo;
pub mod simulation_repo;

pub use cell_model_repo::CellModelRepo;
pub use ion_current_repo::IonCurrentRepo;
pub use simulation_repo::SimulationRepo;
