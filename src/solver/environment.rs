use chrono::NaiveDateTime;

use crate::physics::atmosphere::{self, AirProperties};
use crate::physics::gravity;

use super::{finite, SolverError};

// ---------------------------------------------------------------------------
// Launch site
// ---------------------------------------------------------------------------

pub const LAUNCH_SITE_LATITUDE: f64 = 31.8664; // deg N
pub const LAUNCH_SITE_LONGITUDE: f64 = -116.5959; // deg E
pub const LAUNCH_SITE_TIMEZONE: &str = "America/Tijuana";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AtmosphericModel {
    /// ISA 1976, no wind.
    #[default]
    StandardAtmosphere,
}

/// Launch environment: site, date and atmosphere.
#[derive(Debug, Clone)]
pub struct Environment {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64, // m above sea level
    pub date: Option<NaiveDateTime>,
    pub timezone: String,
    pub atmospheric_model: AtmosphericModel,
    surface_gravity: f64,
}

impl Environment {
    pub fn new(latitude: f64, longitude: f64, elevation: f64) -> Result<Self, SolverError> {
        let latitude = finite("latitude", latitude)?;
        if latitude.abs() > 90.0 {
            return Err(SolverError::InvalidParameter {
                name: "latitude",
                value: latitude,
                reason: "must be within [-90, 90] degrees",
            });
        }
        Ok(Self {
            latitude,
            longitude: finite("longitude", longitude)?,
            elevation: finite("elevation", elevation)?,
            date: None,
            timezone: "UTC".into(),
            atmospheric_model: AtmosphericModel::default(),
            surface_gravity: gravity::surface_gravity(latitude),
        })
    }

    /// Environment at the fixed launch site.
    pub fn launch_site(elevation: f64) -> Result<Self, SolverError> {
        Self::new(LAUNCH_SITE_LATITUDE, LAUNCH_SITE_LONGITUDE, elevation)
    }

    /// Local wall-clock launch date in the given timezone.
    pub fn set_date(&mut self, date: NaiveDateTime, timezone: impl Into<String>) {
        self.date = Some(date);
        self.timezone = timezone.into();
    }

    pub fn set_atmospheric_model(&mut self, model: AtmosphericModel) {
        self.atmospheric_model = model;
    }

    /// Air properties at an altitude above sea level.
    pub fn air(&self, altitude_asl: f64) -> AirProperties {
        match self.atmospheric_model {
            AtmosphericModel::StandardAtmosphere => atmosphere::isa(altitude_asl),
        }
    }

    /// Gravity magnitude at an altitude above sea level.
    pub fn gravity(&self, altitude_asl: f64) -> f64 {
        gravity::gravity_at(self.surface_gravity, altitude_asl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn launch_site_coordinates() {
        let env = Environment::launch_site(1.0).unwrap();
        assert_eq!(env.latitude, LAUNCH_SITE_LATITUDE);
        assert_eq!(env.longitude, LAUNCH_SITE_LONGITUDE);
        assert_eq!(env.elevation, 1.0);
        assert_eq!(env.atmospheric_model, AtmosphericModel::StandardAtmosphere);
    }

    #[test]
    fn set_date_records_timezone() {
        let mut env = Environment::launch_site(1.0).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 5, 17)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        env.set_date(date, LAUNCH_SITE_TIMEZONE);
        assert_eq!(env.date, Some(date));
        assert_eq!(env.timezone, "America/Tijuana");
    }

    #[test]
    fn rejects_non_finite_elevation() {
        assert!(Environment::launch_site(f64::NAN).is_err());
        assert!(Environment::new(95.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn gravity_and_air_use_altitude_above_sea_level() {
        let env = Environment::launch_site(1.0).unwrap();
        assert!(env.gravity(1_000.0) < env.gravity(0.0));
        assert!(env.air(1_000.0).density < env.air(0.0).density);
    }
}
