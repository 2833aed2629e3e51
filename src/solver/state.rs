use nalgebra::{UnitQuaternion, Vector3};

// ---------------------------------------------------------------------------
// Solution layout
// ---------------------------------------------------------------------------

/// Number of columns in one solution row.
pub const SOLUTION_COLUMNS: usize = 14;

/// One solver output row:
/// `t, x, y, z, vx, vy, vz, e0, e1, e2, e3, w1, w2, w3`.
pub type SolutionRow = [f64; SOLUTION_COLUMNS];

/// Column indices of a [`SolutionRow`]. Consumers read time, position and
/// vertical velocity through these and nothing else.
pub mod column {
    pub const TIME: usize = 0;
    pub const POS_X: usize = 1;
    pub const POS_Y: usize = 2;
    pub const POS_Z: usize = 3;
    pub const VEL_X: usize = 4;
    pub const VEL_Y: usize = 5;
    pub const VEL_Z: usize = 6;
    pub const E0: usize = 7;
    pub const E1: usize = 8;
    pub const E2: usize = 9;
    pub const E3: usize = 10;
    pub const W1: usize = 11;
    pub const W2: usize = 12;
    pub const W3: usize = 13;
}

// ---------------------------------------------------------------------------
// Point-mass state
// ---------------------------------------------------------------------------

/// State at a single point in time.
/// Frame: East-North-Up, origin at the launch site, `pos.z` above sea level.
#[derive(Debug, Clone)]
pub struct State {
    pub time: f64,         // s
    pub pos: Vector3<f64>, // m
    pub vel: Vector3<f64>, // m/s
    pub mass: f64,         // kg, vehicle + motor + remaining propellant
}

impl State {
    /// Advance state by a derivative scaled by dt (used inside RK4).
    pub fn apply(&self, d: &Deriv, dt: f64) -> State {
        State {
            time: self.time + dt,
            pos: self.pos + d.dpos * dt,
            vel: self.vel + d.dvel * dt,
            mass: (self.mass + d.dmass * dt).max(0.0),
        }
    }

    /// Attitude with the body axis along the velocity, or along `axis`
    /// while the vehicle is (nearly) at rest.
    pub fn attitude(&self, axis: &Vector3<f64>) -> UnitQuaternion<f64> {
        let dir = if self.vel.norm() > 1e-6 {
            self.vel.normalize()
        } else {
            axis.normalize()
        };
        UnitQuaternion::rotation_between(&Vector3::z(), &dir).unwrap_or_else(|| {
            // body axis pointing straight down
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI)
        })
    }

    /// Flatten into the solver's row layout. Angular rates are not modeled.
    #[rustfmt::skip]
    pub fn to_row(&self, axis: &Vector3<f64>) -> SolutionRow {
        let q = self.attitude(axis);
        let q = q.quaternion();
        [
            self.time,
            self.pos.x, self.pos.y, self.pos.z,
            self.vel.x, self.vel.y, self.vel.z,
            q.w, q.i, q.j, q.k,
            0.0, 0.0, 0.0,
        ]
    }
}

/// State derivative (dp/dt, dv/dt, dm/dt).
#[derive(Debug, Clone)]
pub struct Deriv {
    pub dpos: Vector3<f64>,
    pub dvel: Vector3<f64>,
    pub dmass: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(vel: Vector3<f64>) -> State {
        State {
            time: 1.5,
            pos: Vector3::new(1.0, 2.0, 30.0),
            vel,
            mass: 1.2,
        }
    }

    #[test]
    fn row_layout_matches_columns() {
        let s = state(Vector3::new(0.5, 0.25, 12.0));
        let row = s.to_row(&Vector3::z());
        assert_eq!(row[column::TIME], 1.5);
        assert_eq!(row[column::POS_X], 1.0);
        assert_eq!(row[column::POS_Z], 30.0);
        assert_eq!(row[column::VEL_Z], 12.0);
        assert_eq!(row[column::W3], 0.0);
    }

    #[test]
    fn attitude_is_unit_and_follows_velocity() {
        let s = state(Vector3::new(0.0, 10.0, 0.0));
        let q = s.attitude(&Vector3::z());
        let body_z = q * Vector3::z();
        assert!((body_z - Vector3::y()).norm() < 1e-9);
        let row = s.to_row(&Vector3::z());
        let norm = (row[column::E0].powi(2)
            + row[column::E1].powi(2)
            + row[column::E2].powi(2)
            + row[column::E3].powi(2))
        .sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn attitude_at_rest_uses_rail_axis() {
        let s = state(Vector3::zeros());
        let axis = Vector3::new(0.0, 1.0, 1.0).normalize();
        let body_z = s.attitude(&axis) * Vector3::z();
        assert!((body_z - axis).norm() < 1e-9);
    }

    #[test]
    fn attitude_straight_down_is_defined() {
        let s = state(Vector3::new(0.0, 0.0, -5.0));
        let body_z = s.attitude(&Vector3::z()) * Vector3::z();
        assert!((body_z + Vector3::z()).norm() < 1e-9);
    }
}
