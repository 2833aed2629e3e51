//! Orchestration: schema, solve, extract, render, persist.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::extract::{extract, Extraction};
use crate::plot;
use crate::request::{RawRequest, SimulationRequest};
use crate::solver::{FlightData, FlightSolver, PointMassSolver, SolutionRow, SolverError};
use crate::store::{NewRecord, ResultStore};

pub const NO_FLIGHT_DATA: &str =
    "the simulation produced no valid results or the flight could not be processed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidInput,
    Solver,
    NoFlightData,
    Render,
    /// A panic caught at the orchestrator boundary.
    Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SimulationOutcome {
    Success {
        apogee: Option<f64>,
        /// Relative to the static root, e.g. `generated_plots/20240504_090703.png`.
        image_path: String,
    },
    Failure { kind: FailureKind, message: String },
}

impl SimulationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

fn failure(kind: FailureKind, message: String) -> SimulationOutcome {
    error!(?kind, %message, "simulation failed");
    SimulationOutcome::Failure { kind, message }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

/// Runs requests end to end against one solver, store and plot directory.
///
/// Holds no mutable state; independent runs may share a `Simulator` across
/// threads when the solver allows it.
pub struct Simulator<S = PointMassSolver> {
    solver: S,
    config: AppConfig,
    store: ResultStore,
}

impl Simulator<PointMassSolver> {
    pub fn new(config: AppConfig) -> Self {
        Self::with_solver(PointMassSolver::new(config.solver.clone()), config)
    }
}

impl<S: FlightSolver> Simulator<S> {
    pub fn with_solver(solver: S, config: AppConfig) -> Self {
        let store = config.store();
        Self { solver, config, store }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Parse string fields, then [`simulate`](Self::simulate).
    pub fn simulate_raw(&self, raw: &RawRequest) -> SimulationOutcome {
        match SimulationRequest::parse(raw) {
            Ok(request) => self.simulate(&request),
            Err(e) => failure(FailureKind::InvalidInput, e.to_string()),
        }
    }

    pub fn simulate(&self, request: &SimulationRequest) -> SimulationOutcome {
        self.simulate_at(request, Local::now().naive_local())
    }

    /// Run with an explicit start time, which names the image and stamps
    /// the record.
    pub fn simulate_at(&self, request: &SimulationRequest, run_time: NaiveDateTime) -> SimulationOutcome {
        self.execute(request, run_time, false).outcome
    }

    /// Like [`simulate_raw`](Self::simulate_raw), also handing back the
    /// solver rows the image was drawn from.
    pub fn run_raw(&self, raw: &RawRequest) -> SimulationRun {
        match SimulationRequest::parse(raw) {
            Ok(request) => self.run_at(&request, Local::now().naive_local()),
            Err(e) => SimulationRun::failed(failure(FailureKind::InvalidInput, e.to_string())),
        }
    }

    pub fn run_at(&self, request: &SimulationRequest, run_time: NaiveDateTime) -> SimulationRun {
        self.execute(request, run_time, true)
    }

    fn execute(&self, request: &SimulationRequest, run_time: NaiveDateTime, keep_solution: bool) -> SimulationRun {
        let started = Instant::now();

        match self.store.ensure_schema() {
            Ok(status) => debug!(?status, "schema ready"),
            Err(e) => warn!(db_path = %self.store.path().display(), error = %e, "schema setup failed"),
        }

        let produced = panic::catch_unwind(AssertUnwindSafe(|| {
            self.solve_and_render(request, run_time, keep_solution)
        }));
        let Produced { apogee, image_path, solution } = match produced {
            Ok(Ok(done)) => done,
            Ok(Err(outcome)) => return SimulationRun::failed(outcome),
            Err(payload) => {
                let message = panic_message(payload);
                return SimulationRun::failed(failure(
                    FailureKind::Internal,
                    format!("error during simulation: {message}"),
                ));
            }
        };

        // Storage problems never fail a run that solved and rendered
        let record = NewRecord {
            timestamp: run_time,
            request: request.clone(),
            apogee,
            graph_image_path: image_path.clone(),
        };
        if let Err(e) = self.store.insert(&record) {
            error!(db_path = %self.store.path().display(), error = %e, "result not stored");
        }

        info!(
            solver = self.solver.name(),
            apogee = ?apogee,
            image = %image_path,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "simulation complete"
        );
        SimulationRun {
            outcome: SimulationOutcome::Success { apogee, image_path },
            solution,
        }
    }

    fn solve_and_render(
        &self,
        request: &SimulationRequest,
        run_time: NaiveDateTime,
        keep_solution: bool,
    ) -> Result<Produced, SimulationOutcome> {
        let solver_failure = |e: SolverError| failure(FailureKind::Solver, format!("error during simulation: {e}"));

        let flight = self.solver.solve(request, run_time).map_err(solver_failure)?;
        let (apogee, trajectory) = match extract(&flight).map_err(solver_failure)? {
            Extraction::Data { apogee, trajectory } => (apogee, trajectory),
            Extraction::NoFlightData => {
                return Err(failure(FailureKind::NoFlightData, NO_FLIGHT_DATA.to_string()))
            }
        };

        let plots = plot::render(&trajectory, &self.config.plot_dir(), run_time, &self.config.plot)
            .map_err(|e| failure(FailureKind::Render, format!("error during simulation: {e}")))?;

        let solution = if keep_solution {
            Some(flight.solution().map_err(solver_failure)?.to_vec())
        } else {
            None
        };
        Ok(Produced {
            apogee,
            image_path: self.config.relative_image_path(&plots.file_name),
            solution,
        })
    }
}

struct Produced {
    apogee: Option<f64>,
    image_path: String,
    solution: Option<Vec<SolutionRow>>,
}

/// Outcome of one run plus, on success, the full solver rows behind it.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub outcome: SimulationOutcome,
    pub solution: Option<Vec<SolutionRow>>,
}

impl SimulationRun {
    fn failed(outcome: SimulationOutcome) -> Self {
        Self { outcome, solution: None }
    }
}
