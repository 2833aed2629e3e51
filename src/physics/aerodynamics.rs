use std::f64::consts::PI;

use nalgebra::Vector3;

/// Reference (frontal) area of a cylindrical body.
pub fn reference_area(radius: f64) -> f64 {
    PI * radius * radius
}

/// Quadratic drag force opposing the velocity.
pub fn drag_force(vel: &Vector3<f64>, density: f64, cd: f64, area: f64) -> Vector3<f64> {
    let speed = vel.norm();
    if speed > 1e-6 {
        let q_dyn = 0.5 * density * speed * speed;
        -vel.normalize() * (q_dyn * cd * area)
    } else {
        Vector3::zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_opposes_velocity() {
        let vel = Vector3::new(3.0, 0.0, 30.0);
        let f = drag_force(&vel, 1.225, 0.8, reference_area(0.033));
        assert!(f.z < 0.0);
        assert!(f.x < 0.0);
    }

    #[test]
    fn no_drag_at_rest() {
        let f = drag_force(&Vector3::zeros(), 1.225, 0.8, 0.01);
        assert!(f.norm() < 1e-12);
    }

    #[test]
    fn zero_coefficient_means_no_drag() {
        let f = drag_force(&Vector3::new(0.0, 0.0, 50.0), 1.225, 0.0, 0.01);
        assert!(f.norm() < 1e-12);
    }
}
