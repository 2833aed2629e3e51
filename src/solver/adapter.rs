//! Request-to-solver marshaling: environment, motor, vehicle and flight,
//! built in that order from the eight request scalars.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::request::SimulationRequest;

use super::environment::{Environment, LAUNCH_SITE_TIMEZONE};
use super::flight::Flight;
use super::motor::{MotorBuilder, SolidMotor};
use super::vehicle::{Rocket, CANSAT_MOTOR_POSITION};
use super::{SolverConfig, SolverError};

/// Launch site at `elevation`, dated to the run.
pub fn build_environment(
    elevation: f64,
    launch_time: NaiveDateTime,
    config: &SolverConfig,
) -> Result<Environment, SolverError> {
    let mut env = Environment::launch_site(elevation)?;
    env.set_date(launch_time, LAUNCH_SITE_TIMEZONE);
    env.set_atmospheric_model(config.atmosphere);
    Ok(env)
}

/// CanSat motor; only thrust and burn time come from the request.
pub fn build_motor(request: &SimulationRequest) -> Result<SolidMotor, SolverError> {
    MotorBuilder::new(request.average_thrust, request.burn_time).build()
}

pub fn build_rocket(request: &SimulationRequest, motor: SolidMotor) -> Result<Rocket, SolverError> {
    let mut rocket = Rocket::cansat(request.cansat_mass, request.drag_coefficient)?;
    rocket.add_motor(motor, CANSAT_MOTOR_POSITION);
    Ok(rocket)
}

/// Build and fly the CanSat described by `request`, returning a
/// post-processed [`Flight`].
pub fn run_solver(
    request: &SimulationRequest,
    launch_time: NaiveDateTime,
    config: &SolverConfig,
) -> Result<Flight, SolverError> {
    let environment = build_environment(request.elevation, launch_time, config)?;
    let motor = build_motor(request)?;
    debug!(
        propellant_kg = motor.propellant_mass(),
        impulse_ns = motor.total_impulse(),
        "motor configured"
    );
    let rocket = build_rocket(request, motor)?;

    let mut flight = Flight::new(
        rocket,
        environment,
        request.rail_length,
        request.inclination,
        request.heading,
        config,
    )?;
    flight.post_process();

    if let Ok(summary) = flight.summary() {
        debug!(
            apogee = ?summary.apogee,
            flight_time = summary.flight_time,
            max_speed = summary.max_speed,
            "flight solved"
        );
    }
    Ok(flight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::FlightData;
    use chrono::NaiveDate;

    fn launch_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 4)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn reference_request_reaches_positive_apogee() {
        let req = SimulationRequest::form_defaults();
        let flight = run_solver(&req, launch_time(), &SolverConfig::default()).unwrap();
        let apogee = flight.apogee().unwrap().unwrap();
        assert!(apogee >= 0.0);
        assert!(apogee > req.elevation);
        assert!(!flight.solution().unwrap().is_empty());
    }

    #[test]
    fn environment_is_dated_at_launch_site() {
        let env = build_environment(1.0, launch_time(), &SolverConfig::default()).unwrap();
        assert_eq!(env.date, Some(launch_time()));
        assert_eq!(env.timezone, LAUNCH_SITE_TIMEZONE);
        assert_eq!(env.elevation, 1.0);
    }

    #[test]
    fn rocket_carries_request_mass_and_drag() {
        let req = SimulationRequest::form_defaults();
        let rocket = build_rocket(&req, build_motor(&req).unwrap()).unwrap();
        assert_eq!(rocket.mass, 0.5);
        assert_eq!(rocket.power_on_drag, 0.8);
        assert_eq!(rocket.power_off_drag, 0.8);
        assert_eq!(rocket.motor.as_ref().map(|m| m.position), Some(CANSAT_MOTOR_POSITION));
    }

    #[test]
    fn invalid_request_is_a_typed_error() {
        let req = SimulationRequest { burn_time: 0.0, ..SimulationRequest::form_defaults() };
        let err = run_solver(&req, launch_time(), &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, SolverError::InvalidParameter { name: "burn_time", .. }));

        let req = SimulationRequest { heading: f64::NAN, ..SimulationRequest::form_defaults() };
        assert!(run_solver(&req, launch_time(), &SolverConfig::default()).is_err());
    }

    #[test]
    fn heavier_cansat_flies_lower() {
        let light = SimulationRequest::form_defaults();
        let heavy = SimulationRequest { cansat_mass: 0.8, ..light.clone() };
        let cfg = SolverConfig::default();
        let a = run_solver(&light, launch_time(), &cfg).unwrap().apogee().unwrap().unwrap();
        let b = run_solver(&heavy, launch_time(), &cfg).unwrap().apogee().unwrap().unwrap();
        assert!(b < a, "{b} >= {a}");
    }
}
