use nalgebra::Vector3;

use crate::physics::aerodynamics;

use super::motor::SolidMotor;
use super::{finite, non_negative, positive, SolverError};

// ---------------------------------------------------------------------------
// CanSat airframe constants
// ---------------------------------------------------------------------------

pub const CANSAT_RADIUS: f64 = 0.033; // m
pub const CANSAT_INERTIA: [f64; 3] = [0.0001, 0.0001, 0.0002]; // kg·m^2
pub const CANSAT_CENTER_OF_MASS: f64 = 0.15; // m, without motor
pub const CANSAT_MOTOR_POSITION: f64 = 0.3; // m

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RocketOrientation {
    #[default]
    NoseToTail,
    TailToNose,
}

#[derive(Debug, Clone)]
pub struct MountedMotor {
    pub motor: SolidMotor,
    pub position: f64, // m, along the body axis
}

/// Airframe plus (optionally) its motor.
#[derive(Debug, Clone)]
pub struct Rocket {
    pub radius: f64,        // m
    pub mass: f64,          // kg, without motor
    pub inertia: Vector3<f64>,
    pub center_of_mass_without_motor: f64,
    pub orientation: RocketOrientation,
    pub power_off_drag: f64,
    pub power_on_drag: f64,
    pub motor: Option<MountedMotor>,
}

impl Rocket {
    pub fn new(
        radius: f64,
        mass: f64,
        inertia: Vector3<f64>,
        center_of_mass_without_motor: f64,
        power_off_drag: f64,
        power_on_drag: f64,
    ) -> Result<Self, SolverError> {
        Ok(Self {
            radius: positive("radius", radius)?,
            mass: positive("cansat_mass", mass)?,
            inertia,
            center_of_mass_without_motor: finite("center_of_mass", center_of_mass_without_motor)?,
            orientation: RocketOrientation::NoseToTail,
            power_off_drag: non_negative("drag_coefficient", power_off_drag)?,
            power_on_drag: non_negative("drag_coefficient", power_on_drag)?,
            motor: None,
        })
    }

    /// CanSat airframe: caller-supplied mass and a single drag coefficient
    /// for powered and unpowered flight.
    pub fn cansat(mass: f64, drag_coefficient: f64) -> Result<Self, SolverError> {
        let [ixx, iyy, izz] = CANSAT_INERTIA;
        Self::new(
            CANSAT_RADIUS,
            mass,
            Vector3::new(ixx, iyy, izz),
            CANSAT_CENTER_OF_MASS,
            drag_coefficient,
            drag_coefficient,
        )
    }

    pub fn add_motor(&mut self, motor: SolidMotor, position: f64) {
        self.motor = Some(MountedMotor { motor, position });
    }

    pub fn reference_area(&self) -> f64 {
        aerodynamics::reference_area(self.radius)
    }

    /// Mass with motor dry mass and all propellant.
    pub fn total_mass(&self) -> f64 {
        self.mass + self.motor.as_ref().map_or(0.0, |m| m.motor.total_mass())
    }

    /// Mass after all propellant is spent.
    pub fn burnout_mass(&self) -> f64 {
        self.mass + self.motor.as_ref().map_or(0.0, |m| m.motor.dry_mass)
    }

    pub fn thrust_at(&self, t: f64) -> f64 {
        self.motor.as_ref().map_or(0.0, |m| m.motor.thrust_at(t))
    }

    pub fn mass_flow_at(&self, t: f64) -> f64 {
        match &self.motor {
            Some(m) if m.motor.is_burning(t) => m.motor.mass_flow(),
            _ => 0.0,
        }
    }

    pub fn burn_time(&self) -> f64 {
        self.motor.as_ref().map_or(0.0, |m| m.motor.burn_time)
    }

    pub fn drag_coefficient(&self, powered: bool) -> f64 {
        if powered {
            self.power_on_drag
        } else {
            self.power_off_drag
        }
    }

    /// Center of mass of the loaded vehicle measured from the nose.
    pub fn center_of_mass(&self) -> f64 {
        match &self.motor {
            Some(m) => {
                let motor_cg = m.position + m.motor.center_of_dry_mass_position;
                (self.mass * self.center_of_mass_without_motor + m.motor.total_mass() * motor_cg)
                    / self.total_mass()
            }
            None => self.center_of_mass_without_motor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::motor::MotorBuilder;

    fn loaded_cansat() -> Rocket {
        let mut r = Rocket::cansat(0.5, 0.8).unwrap();
        r.add_motor(MotorBuilder::new(20.0, 3.5).build().unwrap(), CANSAT_MOTOR_POSITION);
        r
    }

    #[test]
    fn same_drag_powered_and_unpowered() {
        let r = loaded_cansat();
        assert_eq!(r.drag_coefficient(true), 0.8);
        assert_eq!(r.drag_coefficient(false), 0.8);
    }

    #[test]
    fn mass_includes_motor() {
        let r = loaded_cansat();
        assert!(r.total_mass() > 1.0);
        assert!((r.burnout_mass() - 1.0).abs() < 1e-12);
        assert!(r.total_mass() > r.burnout_mass());
    }

    #[test]
    fn thrust_to_weight_above_one() {
        let r = loaded_cansat();
        assert!(r.thrust_at(0.0) / (r.total_mass() * crate::physics::G0) > 1.0);
        assert_eq!(r.thrust_at(4.0), 0.0);
        assert_eq!(r.mass_flow_at(4.0), 0.0);
    }

    #[test]
    fn reference_area_from_radius() {
        let r = loaded_cansat();
        assert!((r.reference_area() - std::f64::consts::PI * 0.033 * 0.033).abs() < 1e-12);
    }

    #[test]
    fn center_of_mass_moves_aft_with_motor() {
        let bare = Rocket::cansat(0.5, 0.8).unwrap();
        let loaded = loaded_cansat();
        assert_eq!(bare.center_of_mass(), CANSAT_CENTER_OF_MASS);
        assert!(loaded.center_of_mass() > CANSAT_CENTER_OF_MASS);
    }

    #[test]
    fn rejects_invalid_airframe_inputs() {
        assert!(Rocket::cansat(0.0, 0.8).is_err());
        assert!(Rocket::cansat(0.5, -0.1).is_err());
        assert!(Rocket::cansat(0.5, 0.0).is_ok());
    }
}
