use nalgebra::Vector3;

use super::dynamics::{FlightModel, Phase};
use super::environment::Environment;
use super::event::{
    ApogeeDetector, BurnoutDetector, EventDetector, EventKind, FlightEvent, ImpactDetector,
};
use super::integrator::rk4_step;
use super::state::{SolutionRow, State};
use super::vehicle::Rocket;
use super::{finite, positive, FlightData, SolverConfig, SolverError};

/// Derived quantities, available after [`Flight::post_process`].
#[derive(Debug, Clone, PartialEq)]
pub struct FlightSummary {
    pub apogee: Option<f64>,      // m above sea level
    pub apogee_time: Option<f64>, // s
    pub out_of_rail_time: Option<f64>,
    pub out_of_rail_velocity: Option<f64>, // m/s
    pub burnout_time: Option<f64>,
    pub max_speed: f64,
    pub impact_velocity: Option<f64>,
    pub flight_time: f64,
}

/// Unit launch direction: `inclination` above the horizon, `heading`
/// clockwise from north (ENU frame).
pub fn rail_axis(inclination_deg: f64, heading_deg: f64) -> Vector3<f64> {
    let (incl, head) = (inclination_deg.to_radians(), heading_deg.to_radians());
    Vector3::new(incl.cos() * head.sin(), incl.cos() * head.cos(), incl.sin())
}

// ---------------------------------------------------------------------------
// Flight
// ---------------------------------------------------------------------------

/// A solved flight from the rail to ground impact (or the time limit).
///
/// Construction integrates the trajectory; [`post_process`](Self::post_process)
/// must run before apogee, solution, events or summary can be read.
#[derive(Debug, Clone)]
pub struct Flight {
    pub rocket: Rocket,
    pub environment: Environment,
    pub rail_length: f64,
    pub inclination: f64,
    pub heading: f64,
    rail_axis: Vector3<f64>,
    states: Vec<State>,
    rail_exit_index: Option<usize>,
    events: Vec<FlightEvent>,
    solution: Vec<SolutionRow>,
    summary: Option<FlightSummary>,
}

impl Flight {
    pub fn new(
        rocket: Rocket,
        environment: Environment,
        rail_length: f64,
        inclination: f64,
        heading: f64,
        config: &SolverConfig,
    ) -> Result<Self, SolverError> {
        positive("rail_length", rail_length)?;
        positive("dt", config.dt)?;
        positive("max_time", config.max_time)?;
        let mut flight = Self {
            rail_axis: rail_axis(finite("inclination", inclination)?, finite("heading", heading)?),
            rocket,
            environment,
            rail_length,
            inclination,
            heading,
            states: Vec::new(),
            rail_exit_index: None,
            events: Vec::new(),
            solution: Vec::new(),
            summary: None,
        };
        flight.integrate(config)?;
        Ok(flight)
    }

    /// Run from ignition on the pad to ground impact or `max_time`.
    fn integrate(&mut self, config: &SolverConfig) -> Result<(), SolverError> {
        let model = FlightModel {
            rocket: &self.rocket,
            environment: &self.environment,
            rail_axis: self.rail_axis,
        };
        let origin = Vector3::new(0.0, 0.0, self.environment.elevation);
        let ground = origin.z;

        let mut state = State {
            time: 0.0,
            pos: origin,
            vel: Vector3::zeros(),
            mass: self.rocket.total_mass(),
        };

        let capacity = (config.max_time / config.dt) as usize + 1;
        let mut states = Vec::with_capacity(capacity.min(100_000));
        states.push(state.clone());

        let mut phase = Phase::Rail;
        let mut rail_exit_index = None;

        while state.time < config.max_time {
            state = rk4_step(&state, &model, phase, config.dt);

            if !(state.pos.iter().chain(state.vel.iter()).all(|v| v.is_finite())) {
                return Err(SolverError::Diverged { time: state.time });
            }

            if phase == Phase::Rail && (state.pos - origin).dot(&self.rail_axis) >= self.rail_length {
                phase = Phase::Free;
                rail_exit_index = Some(states.len());
            }

            // Ground impact: descending through the launch elevation
            if state.vel.z < 0.0 && state.pos.z <= ground {
                state.pos.z = ground;
                states.push(state);
                break;
            }

            states.push(state.clone());
        }

        self.states = states;
        self.rail_exit_index = rail_exit_index;
        Ok(())
    }

    /// Detect events and derive the solution rows and summary. Idempotent.
    pub fn post_process(&mut self) {
        if self.summary.is_some() {
            return;
        }
        let ground = self.environment.elevation;

        let mut events = Vec::new();
        if let Some(i) = self.rail_exit_index {
            let s = &self.states[i];
            events.push(FlightEvent { time: s.time, kind: EventKind::RailExit, state: s.clone() });
        }

        let mut detectors: Vec<Box<dyn EventDetector>> = vec![
            Box::new(BurnoutDetector::new(self.rocket.burn_time())),
            Box::new(ApogeeDetector::default()),
            Box::new(ImpactDetector::new(ground)),
        ];
        for pair in self.states.windows(2) {
            for detector in detectors.iter_mut() {
                if let Some(kind) = detector.check(&pair[0], &pair[1]) {
                    events.push(FlightEvent { time: pair[1].time, kind, state: pair[1].clone() });
                }
            }
        }
        events.sort_by(|a, b| a.time.total_cmp(&b.time));

        let top = self
            .states
            .iter()
            .max_by(|a, b| a.pos.z.total_cmp(&b.pos.z))
            .filter(|s| s.pos.z > ground);
        let event_state = |kind: EventKind| events.iter().find(|e| e.kind == kind).map(|e| &e.state);
        let rail_exit = event_state(EventKind::RailExit);

        let summary = FlightSummary {
            apogee: top.map(|s| s.pos.z),
            apogee_time: top.map(|s| s.time),
            out_of_rail_time: rail_exit.map(|s| s.time),
            out_of_rail_velocity: rail_exit.map(|s| s.vel.norm()),
            burnout_time: event_state(EventKind::Burnout).map(|s| s.time),
            max_speed: self.states.iter().map(|s| s.vel.norm()).fold(0.0_f64, f64::max),
            impact_velocity: event_state(EventKind::Impact).map(|s| s.vel.norm()),
            flight_time: self.states.last().map_or(0.0, |s| s.time),
        };

        self.solution = self.states.iter().map(|s| s.to_row(&self.rail_axis)).collect();
        self.events = events;
        self.summary = Some(summary);
    }

    pub fn is_post_processed(&self) -> bool {
        self.summary.is_some()
    }

    pub fn summary(&self) -> Result<&FlightSummary, SolverError> {
        self.summary.as_ref().ok_or(SolverError::NotPostProcessed)
    }

    pub fn events(&self) -> Result<&[FlightEvent], SolverError> {
        self.summary()?;
        Ok(&self.events)
    }

    pub fn rail_axis(&self) -> Vector3<f64> {
        self.rail_axis
    }
}

impl FlightData for Flight {
    fn apogee(&self) -> Result<Option<f64>, SolverError> {
        Ok(self.summary()?.apogee)
    }

    fn solution(&self) -> Result<&[SolutionRow], SolverError> {
        self.summary()?;
        Ok(&self.solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::motor::MotorBuilder;
    use crate::solver::state::column;
    use crate::solver::vehicle::CANSAT_MOTOR_POSITION;

    fn cansat(thrust: f64) -> Rocket {
        let mut r = Rocket::cansat(0.5, 0.8).unwrap();
        r.add_motor(MotorBuilder::new(thrust, 3.5).build().unwrap(), CANSAT_MOTOR_POSITION);
        r
    }

    fn fly(thrust: f64, inclination: f64, heading: f64) -> Flight {
        let env = Environment::launch_site(1.0).unwrap();
        let mut f = Flight::new(cansat(thrust), env, 2.0, inclination, heading, &SolverConfig::default())
            .unwrap();
        f.post_process();
        f
    }

    #[test]
    fn rail_axis_directions() {
        assert!((rail_axis(90.0, 60.0) - Vector3::z()).norm() < 1e-12);
        assert!((rail_axis(0.0, 0.0) - Vector3::y()).norm() < 1e-12);
        assert!((rail_axis(0.0, 90.0) - Vector3::x()).norm() < 1e-12);
    }

    #[test]
    fn reads_require_post_processing() {
        let env = Environment::launch_site(1.0).unwrap();
        let f = Flight::new(cansat(20.0), env, 2.0, 90.0, 60.0, &SolverConfig::default()).unwrap();
        assert!(!f.is_post_processed());
        assert_eq!(f.apogee(), Err(SolverError::NotPostProcessed));
        assert!(f.solution().is_err());
        assert!(f.events().is_err());
    }

    #[test]
    fn vertical_flight_climbs_and_lands() {
        let f = fly(20.0, 90.0, 60.0);
        let s = f.summary().unwrap();
        let apogee = s.apogee.expect("vehicle should climb");
        assert!(apogee > 11.0, "apogee {apogee}");
        assert!(apogee < 1_000.0, "apogee {apogee}");
        assert!(s.apogee_time.unwrap() > 3.5, "climbs past burnout");
        assert!(s.out_of_rail_time.unwrap() < 3.5);
        assert!(s.out_of_rail_velocity.unwrap() > 0.0);
        assert!(s.impact_velocity.is_some());

        let rows = f.solution().unwrap();
        let last = rows.last().unwrap();
        assert!((last[column::POS_Z] - 1.0).abs() < 1e-9, "lands at launch elevation");
        assert!(last[column::VEL_Z] < 0.0);
    }

    #[test]
    fn events_are_ordered() {
        let f = fly(20.0, 90.0, 60.0);
        let kinds: Vec<EventKind> = f.events().unwrap().iter().map(|e| e.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![EventKind::RailExit, EventKind::Burnout, EventKind::Apogee, EventKind::Impact]
        );
    }

    #[test]
    fn solution_starts_on_pad() {
        let f = fly(20.0, 90.0, 60.0);
        let first = f.solution().unwrap()[0];
        assert_eq!(first[column::TIME], 0.0);
        assert_eq!(first[column::POS_Z], 1.0);
        assert_eq!(first[column::VEL_Z], 0.0);
    }

    #[test]
    fn inclined_flight_drifts_along_heading() {
        let f = fly(20.0, 80.0, 90.0);
        let last = f.solution().unwrap().last().copied().unwrap();
        assert!(last[column::POS_X] > 1.0, "east drift {}", last[column::POS_X]);
        assert!(last[column::POS_Y].abs() < 1e-6);
    }

    #[test]
    fn underpowered_vehicle_has_no_apogee() {
        let env = Environment::launch_site(1.0).unwrap();
        let config = SolverConfig { max_time: 5.0, ..SolverConfig::default() };
        let mut f = Flight::new(cansat(1.0), env, 2.0, 90.0, 60.0, &config).unwrap();
        f.post_process();
        assert_eq!(f.apogee().unwrap(), None);
        assert!(!f.solution().unwrap().is_empty());
    }

    #[test]
    fn post_process_is_idempotent() {
        let mut f = fly(20.0, 90.0, 60.0);
        let before = f.summary().unwrap().clone();
        f.post_process();
        assert_eq!(f.summary().unwrap(), &before);
    }

    #[test]
    fn rejects_bad_rail() {
        let env = Environment::launch_site(1.0).unwrap();
        let res = Flight::new(cansat(20.0), env, 0.0, 90.0, 60.0, &SolverConfig::default());
        assert!(matches!(res, Err(SolverError::InvalidParameter { name: "rail_length", .. })));
    }
}
