use std::f64::consts::PI;

use nalgebra::Vector3;

use super::{positive, SolverError};

// ---------------------------------------------------------------------------
// Solid motor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotorOrientation {
    #[default]
    NozzleToCombustionChamber,
    CombustionChamberToNozzle,
}

/// Constant-thrust solid motor with cylindrical grains.
#[derive(Debug, Clone)]
pub struct SolidMotor {
    pub thrust: f64,                         // N, average over the burn
    pub burn_time: f64,                      // s
    pub dry_mass: f64,                       // kg
    pub dry_inertia: Vector3<f64>,           // [I11, I22, I33], kg·m^2
    pub center_of_dry_mass_position: f64,    // m
    pub grains_center_of_mass_position: f64, // m
    pub grain_number: u32,
    pub grain_separation: f64,           // m
    pub grain_density: f64,              // kg/m^3
    pub grain_outer_radius: f64,         // m
    pub grain_initial_inner_radius: f64, // m
    pub grain_initial_height: f64,       // m
    pub nozzle_radius: f64,              // m
    pub throat_radius: f64,              // m
    pub interpolation: Interpolation,
    pub nozzle_position: f64, // m
    pub orientation: MotorOrientation,
}

impl SolidMotor {
    /// Propellant volume of one grain at ignition.
    pub fn grain_volume(&self) -> f64 {
        PI * (self.grain_outer_radius.powi(2) - self.grain_initial_inner_radius.powi(2))
            * self.grain_initial_height
    }

    pub fn propellant_mass(&self) -> f64 {
        f64::from(self.grain_number) * self.grain_volume() * self.grain_density
    }

    pub fn total_mass(&self) -> f64 {
        self.dry_mass + self.propellant_mass()
    }

    pub fn total_impulse(&self) -> f64 {
        self.thrust * self.burn_time
    }

    /// Propellant mass flow, constant over the burn.
    pub fn mass_flow(&self) -> f64 {
        self.propellant_mass() / self.burn_time
    }

    /// Effective exhaust velocity implied by impulse and propellant.
    pub fn exhaust_velocity(&self) -> f64 {
        self.total_impulse() / self.propellant_mass()
    }

    pub fn expansion_ratio(&self) -> f64 {
        (self.nozzle_radius / self.throat_radius).powi(2)
    }

    pub fn is_burning(&self, t: f64) -> bool {
        (0.0..self.burn_time).contains(&t)
    }

    /// Thrust curve: the constant source held over `[0, burn_time)`.
    pub fn thrust_at(&self, t: f64) -> f64 {
        match self.interpolation {
            Interpolation::Linear if self.is_burning(t) => self.thrust,
            Interpolation::Linear => 0.0,
        }
    }

    pub fn propellant_mass_at(&self, t: f64) -> f64 {
        let burned = self.mass_flow() * t.clamp(0.0, self.burn_time);
        (self.propellant_mass() - burned).max(0.0)
    }
}

// ---------------------------------------------------------------------------
// Motor builder
// ---------------------------------------------------------------------------

/// Builds a [`SolidMotor`]. Defaults are the CanSat gas motor; only thrust
/// and burn time vary between runs.
pub struct MotorBuilder {
    motor: SolidMotor,
}

impl MotorBuilder {
    pub fn new(thrust: f64, burn_time: f64) -> Self {
        Self {
            motor: SolidMotor {
                thrust,
                burn_time,
                dry_mass: 0.5,
                dry_inertia: Vector3::new(0.02, 0.02, 0.001),
                center_of_dry_mass_position: 0.15,
                grains_center_of_mass_position: 0.2,
                grain_number: 1,
                grain_separation: 0.005,
                grain_density: 1700.0,
                grain_outer_radius: 0.02,
                grain_initial_inner_radius: 0.005,
                grain_initial_height: 0.08,
                nozzle_radius: 0.01,
                throat_radius: 0.005,
                interpolation: Interpolation::Linear,
                nozzle_position: 0.0,
                orientation: MotorOrientation::NozzleToCombustionChamber,
            },
        }
    }

    pub fn dry_mass(mut self, v: f64) -> Self { self.motor.dry_mass = v; self }
    pub fn dry_inertia(mut self, v: Vector3<f64>) -> Self { self.motor.dry_inertia = v; self }
    pub fn grain_number(mut self, v: u32) -> Self { self.motor.grain_number = v; self }
    pub fn grain_density(mut self, v: f64) -> Self { self.motor.grain_density = v; self }
    pub fn grain_outer_radius(mut self, v: f64) -> Self { self.motor.grain_outer_radius = v; self }
    pub fn grain_initial_inner_radius(mut self, v: f64) -> Self { self.motor.grain_initial_inner_radius = v; self }
    pub fn grain_initial_height(mut self, v: f64) -> Self { self.motor.grain_initial_height = v; self }
    pub fn nozzle_radius(mut self, v: f64) -> Self { self.motor.nozzle_radius = v; self }
    pub fn throat_radius(mut self, v: f64) -> Self { self.motor.throat_radius = v; self }

    pub fn build(self) -> Result<SolidMotor, SolverError> {
        let m = &self.motor;
        positive("average_thrust", m.thrust)?;
        positive("burn_time", m.burn_time)?;
        positive("motor dry_mass", m.dry_mass)?;
        positive("grain_density", m.grain_density)?;
        positive("grain_initial_height", m.grain_initial_height)?;
        positive("throat_radius", m.throat_radius)?;
        if m.grain_number == 0 || m.grain_outer_radius <= m.grain_initial_inner_radius {
            return Err(SolverError::InvalidParameter {
                name: "grain_outer_radius",
                value: m.grain_outer_radius,
                reason: "grain geometry holds no propellant",
            });
        }
        Ok(self.motor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cansat_motor() -> SolidMotor {
        MotorBuilder::new(20.0, 3.5).build().unwrap()
    }

    #[test]
    fn propellant_from_grain_geometry() {
        let m = cansat_motor();
        // pi * (0.02^2 - 0.005^2) * 0.08 * 1700
        let expected = PI * (0.0004 - 0.000_025) * 0.08 * 1700.0;
        assert!((m.propellant_mass() - expected).abs() < 1e-12);
        assert!((m.total_mass() - (0.5 + expected)).abs() < 1e-12);
    }

    #[test]
    fn thrust_is_constant_during_burn_only() {
        let m = cansat_motor();
        assert_eq!(m.thrust_at(0.0), 20.0);
        assert_eq!(m.thrust_at(3.4), 20.0);
        assert_eq!(m.thrust_at(3.5), 0.0);
        assert_eq!(m.thrust_at(-0.1), 0.0);
        assert!((m.total_impulse() - 70.0).abs() < 1e-12);
    }

    #[test]
    fn propellant_depletes_at_burnout() {
        let m = cansat_motor();
        assert!((m.propellant_mass_at(0.0) - m.propellant_mass()).abs() < 1e-12);
        assert!(m.propellant_mass_at(1.75) < m.propellant_mass());
        assert!(m.propellant_mass_at(3.5).abs() < 1e-12);
        assert!(m.propellant_mass_at(10.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_positive_burn_inputs() {
        assert!(MotorBuilder::new(0.0, 3.5).build().is_err());
        assert!(MotorBuilder::new(20.0, -1.0).build().is_err());
        assert!(MotorBuilder::new(f64::INFINITY, 3.5).build().is_err());
    }

    #[test]
    fn rejects_hollow_grain() {
        let res = MotorBuilder::new(20.0, 3.5)
            .grain_initial_inner_radius(0.03)
            .build();
        assert!(matches!(res, Err(SolverError::InvalidParameter { name: "grain_outer_radius", .. })));
    }

    #[test]
    fn nozzle_expansion_ratio() {
        assert!((cansat_motor().expansion_ratio() - 4.0).abs() < 1e-12);
    }
}
