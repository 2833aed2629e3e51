//! Flight solver.
//!
//! The orchestrator only sees the [`FlightSolver`] and [`FlightData`]
//! traits. [`PointMassSolver`] is the shipped implementation: a 3DOF
//! point-mass model with a launch rail, a constant-thrust solid motor and
//! ISA standard atmosphere, integrated with RK4.

pub mod adapter;
pub mod dynamics;
pub mod environment;
pub mod event;
pub mod flight;
pub mod integrator;
pub mod motor;
pub mod state;
pub mod vehicle;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::request::SimulationRequest;

pub use environment::{AtmosphericModel, Environment};
pub use flight::{Flight, FlightSummary};
pub use motor::{MotorBuilder, SolidMotor};
pub use state::{column, SolutionRow, State, SOLUTION_COLUMNS};
pub use vehicle::Rocket;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("invalid {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("flight results read before post-processing")]
    NotPostProcessed,
    #[error("integration diverged at t = {time:.3} s")]
    Diverged { time: f64 },
    #[error("{0}")]
    Other(String),
}

/// Reject non-finite values.
pub(crate) fn finite(name: &'static str, value: f64) -> Result<f64, SolverError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SolverError::InvalidParameter { name, value, reason: "must be a finite number" })
    }
}

/// Reject non-finite and non-positive values.
pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64, SolverError> {
    if finite(name, value)? > 0.0 {
        Ok(value)
    } else {
        Err(SolverError::InvalidParameter { name, value, reason: "must be greater than zero" })
    }
}

/// Reject non-finite and negative values.
pub(crate) fn non_negative(name: &'static str, value: f64) -> Result<f64, SolverError> {
    if finite(name, value)? >= 0.0 {
        Ok(value)
    } else {
        Err(SolverError::InvalidParameter { name, value, reason: "must not be negative" })
    }
}

// ---------------------------------------------------------------------------
// Solver configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub dt: f64,       // integration timestep, s
    pub max_time: f64, // hard stop, s
    pub atmosphere: AtmosphericModel,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            dt: 0.01,         // 100 Hz
            max_time: 300.0,  // 5 min ceiling
            atmosphere: AtmosphericModel::StandardAtmosphere,
        }
    }
}

// ---------------------------------------------------------------------------
// Solver seam
// ---------------------------------------------------------------------------

/// Post-processed flight output.
pub trait FlightData {
    /// Apogee above sea level, `None` when the flight never climbed.
    fn apogee(&self) -> Result<Option<f64>, SolverError>;

    /// Time-ordered solution rows in the [`SolutionRow`] layout.
    fn solution(&self) -> Result<&[SolutionRow], SolverError>;
}

/// Trait for flight solvers.
///
/// Implementations must hand back post-processed output: anything read from
/// [`FlightData`] is final.
pub trait FlightSolver {
    type Output: FlightData;

    /// Configure environment, motor, vehicle and flight from the request and
    /// run them to completion.
    fn solve(
        &self,
        request: &SimulationRequest,
        launch_time: NaiveDateTime,
    ) -> Result<Self::Output, SolverError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// Default solver: point-mass flight from [`adapter::run_solver`].
#[derive(Debug, Clone, Default)]
pub struct PointMassSolver {
    pub config: SolverConfig,
}

impl PointMassSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }
}

impl FlightSolver for PointMassSolver {
    type Output = Flight;

    fn solve(
        &self,
        request: &SimulationRequest,
        launch_time: NaiveDateTime,
    ) -> Result<Flight, SolverError> {
        adapter::run_solver(request, launch_time, &self.config)
    }

    fn name(&self) -> &str {
        "point-mass"
    }
}
