//! Pulls apogee and the plotted trajectory columns out of solver output.

use serde::Serialize;

use crate::solver::{column, FlightData, SolutionRow, SolverError};

/// The columns of a solution row the rest of the pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectorySample {
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,  // altitude ASL
    pub vz: f64, // vertical velocity
}

impl TrajectorySample {
    pub fn from_row(row: &SolutionRow) -> Self {
        Self {
            time: row[column::TIME],
            x: row[column::POS_X],
            y: row[column::POS_Y],
            z: row[column::POS_Z],
            vz: row[column::VEL_Z],
        }
    }
}

pub type Trajectory = Vec<TrajectorySample>;

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Data { apogee: Option<f64>, trajectory: Trajectory },
    /// The solver returned an empty solution.
    NoFlightData,
}

/// Round half away from zero to two decimals.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn extract<F: FlightData + ?Sized>(flight: &F) -> Result<Extraction, SolverError> {
    let rows = flight.solution()?;
    if rows.is_empty() {
        return Ok(Extraction::NoFlightData);
    }
    let apogee = flight.apogee()?.filter(|a| a.is_finite()).map(round2);
    let trajectory = rows.iter().map(TrajectorySample::from_row).collect();
    Ok(Extraction::Data { apogee, trajectory })
}
