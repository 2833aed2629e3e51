pub mod config;
pub mod extract;
pub mod io;
pub mod physics;
pub mod plot;
pub mod request;
pub mod simulation;
pub mod solver;
pub mod store;

pub use config::AppConfig;
pub use request::{InputError, RawRequest, SimulationRequest};
pub use simulation::{FailureKind, SimulationOutcome, SimulationRun, Simulator};
pub use store::{ResultStore, SimulationRecord, StorageError};
