use nalgebra::Vector3;

use crate::physics::aerodynamics;

use super::environment::Environment;
use super::state::{Deriv, State};
use super::vehicle::Rocket;

// ---------------------------------------------------------------------------
// Equations of motion (3DOF point mass)
// ---------------------------------------------------------------------------

/// Flight phase: constrained to the launch rail or free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Rail,
    Free,
}

/// Everything the equations of motion read besides the state.
#[derive(Debug, Clone, Copy)]
pub struct FlightModel<'a> {
    pub rocket: &'a Rocket,
    pub environment: &'a Environment,
    pub rail_axis: Vector3<f64>, // unit vector, ENU
}

/// Compute state derivatives.
///
/// Forces modeled:
///   1. Gravity: normal gravity at the site latitude, inverse-square
///   2. Thrust: constant during burn, along the rail, then along velocity
///   3. Drag: quadratic, opposing velocity, power-on/off coefficient
///
/// On the rail only the axial component of the net force acts, and the rail
/// keeps the vehicle from sliding back down.
pub fn derivatives(state: &State, model: &FlightModel<'_>, phase: Phase) -> Deriv {
    let rocket = model.rocket;
    let env = model.environment;
    let mass = state.mass.max(rocket.burnout_mass());

    let thrust = rocket.thrust_at(state.time);
    let powered = thrust > 0.0;

    // --- Gravity ---
    let f_gravity = Vector3::new(0.0, 0.0, -env.gravity(state.pos.z) * mass);

    // --- Thrust ---
    let speed = state.vel.norm();
    let direction = if phase == Phase::Free && speed > 1.0 {
        state.vel.normalize()
    } else {
        model.rail_axis
    };
    let f_thrust = direction * thrust;

    // --- Drag ---
    let f_drag = aerodynamics::drag_force(
        &state.vel,
        env.air(state.pos.z).density,
        rocket.drag_coefficient(powered),
        rocket.reference_area(),
    );

    let f_total = f_gravity + f_thrust + f_drag;

    let dvel = match phase {
        Phase::Free => f_total / mass,
        Phase::Rail => {
            let axial = f_total.dot(&model.rail_axis) / mass;
            let sliding_back = state.vel.dot(&model.rail_axis) <= 0.0 && axial < 0.0;
            if sliding_back {
                Vector3::zeros()
            } else {
                model.rail_axis * axial
            }
        }
    };

    let dmass = if state.mass > rocket.burnout_mass() {
        -rocket.mass_flow_at(state.time)
    } else {
        0.0
    };

    Deriv {
        dpos: state.vel,
        dvel,
        dmass,
    }
}
