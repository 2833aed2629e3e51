use nalgebra::Vector3;

use super::EARTH_RADIUS;

// WGS-84 normal gravity (Somigliana closed form)
const GAMMA_EQUATOR: f64 = 9.780_325_335_9; // m/s^2
const SOMIGLIANA_K: f64 = 0.001_931_852_652_41;
const ECCENTRICITY_SQ: f64 = 0.006_694_379_990_13;

/// Normal gravity at sea level for a geodetic latitude in degrees.
pub fn surface_gravity(latitude_deg: f64) -> f64 {
    let s2 = latitude_deg.to_radians().sin().powi(2);
    GAMMA_EQUATOR * (1.0 + SOMIGLIANA_K * s2) / (1.0 - ECCENTRICITY_SQ * s2).sqrt()
}

/// Gravity magnitude at an altitude above sea level, inverse-square from
/// the surface value.
pub fn gravity_at(surface: f64, altitude_m: f64) -> f64 {
    let alt = altitude_m.max(0.0);
    surface * (EARTH_RADIUS / (EARTH_RADIUS + alt)).powi(2)
}

/// Gravitational acceleration vector (ENU, pointing down).
pub fn gravity_accel(surface: f64, altitude_m: f64) -> Vector3<f64> {
    Vector3::new(0.0, 0.0, -gravity_at(surface, altitude_m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equator_and_pole_values() {
        assert!((surface_gravity(0.0) - 9.7803).abs() < 1e-4);
        assert!((surface_gravity(90.0) - 9.8322).abs() < 1e-4);
    }

    #[test]
    fn launch_site_latitude_is_between_extremes() {
        let g = surface_gravity(31.8664);
        assert!(g > surface_gravity(0.0));
        assert!(g < surface_gravity(90.0));
    }

    #[test]
    fn gravity_decreases_with_altitude() {
        let g = surface_gravity(31.8664);
        assert!(gravity_at(g, 10_000.0) < gravity_at(g, 0.0));
        assert!((gravity_accel(g, 0.0).z + g).abs() < 1e-12);
    }
}
