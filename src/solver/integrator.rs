use super::dynamics::{self, FlightModel, Phase};
use super::state::State;

// ---------------------------------------------------------------------------
// Classical 4th-order Runge-Kutta integrator
// ---------------------------------------------------------------------------

/// Single RK4 step: advance state by dt within one flight phase.
pub fn rk4_step(state: &State, model: &FlightModel<'_>, phase: Phase, dt: f64) -> State {
    let k1 = dynamics::derivatives(state, model, phase);
    let k2 = dynamics::derivatives(&state.apply(&k1, dt * 0.5), model, phase);
    let k3 = dynamics::derivatives(&state.apply(&k2, dt * 0.5), model, phase);
    let k4 = dynamics::derivatives(&state.apply(&k3, dt), model, phase);

    State {
        time: state.time + dt,
        pos: state.pos + (k1.dpos + 2.0 * k2.dpos + 2.0 * k3.dpos + k4.dpos) * (dt / 6.0),
        vel: state.vel + (k1.dvel + 2.0 * k2.dvel + 2.0 * k3.dvel + k4.dvel) * (dt / 6.0),
        mass: (state.mass + (k1.dmass + 2.0 * k2.dmass + 2.0 * k3.dmass + k4.dmass) * (dt / 6.0))
            .max(model.rocket.burnout_mass()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::environment::Environment;
    use crate::solver::motor::MotorBuilder;
    use crate::solver::vehicle::{Rocket, CANSAT_MOTOR_POSITION};
    use nalgebra::Vector3;

    #[test]
    fn free_fall_matches_closed_form() {
        // no motor, no drag: z(t) = z0 - g t^2 / 2
        let r = Rocket::cansat(1.0, 0.0).unwrap();
        let env = Environment::launch_site(0.0).unwrap();
        let model = FlightModel { rocket: &r, environment: &env, rail_axis: Vector3::z() };
        let mut s = State {
            time: 0.0,
            pos: Vector3::new(0.0, 0.0, 100.0),
            vel: Vector3::zeros(),
            mass: r.total_mass(),
        };
        for _ in 0..100 {
            s = rk4_step(&s, &model, Phase::Free, 0.01);
        }
        let g = env.gravity(100.0);
        let expected = 100.0 - 0.5 * g * 1.0;
        assert!((s.pos.z - expected).abs() < 1e-3, "z = {}", s.pos.z);
    }

    #[test]
    fn mass_never_drops_below_burnout_mass() {
        let mut r = Rocket::cansat(0.5, 0.8).unwrap();
        r.add_motor(MotorBuilder::new(20.0, 3.5).build().unwrap(), CANSAT_MOTOR_POSITION);
        let env = Environment::launch_site(1.0).unwrap();
        let model = FlightModel { rocket: &r, environment: &env, rail_axis: Vector3::z() };
        let mut s = State {
            time: 3.49,
            pos: Vector3::new(0.0, 0.0, 40.0),
            vel: Vector3::new(0.0, 0.0, 20.0),
            mass: r.burnout_mass() + 1e-5,
        };
        s = rk4_step(&s, &model, Phase::Free, 0.01);
        assert!(s.mass >= r.burnout_mass());
    }
}
