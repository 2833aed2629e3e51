use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("invalid input format: {field} = {value:?} is not a number")]
    InvalidNumber { field: &'static str, value: String },
}

/// The eight scalars describing one CanSat launch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRequest {
    pub inclination: f64,      // deg above horizontal
    pub heading: f64,          // deg clockwise from north
    pub rail_length: f64,      // m
    pub cansat_mass: f64,      // kg
    pub drag_coefficient: f64, // -
    pub burn_time: f64,        // s
    pub average_thrust: f64,   // N
    pub elevation: f64,        // m ASL
}

impl SimulationRequest {
    /// Values the launch form is pre-filled with. Front-ends only; the core
    /// never falls back to these.
    pub fn form_defaults() -> Self {
        Self {
            inclination: 90.0,
            heading: 60.0,
            rail_length: 2.0,
            cansat_mass: 0.5,
            drag_coefficient: 0.8,
            burn_time: 3.5,
            average_thrust: 20.0,
            elevation: 1.0,
        }
    }

    pub fn parse(raw: &RawRequest) -> Result<Self, InputError> {
        Ok(Self {
            inclination: number("inclination", &raw.inclination)?,
            heading: number("heading", &raw.heading)?,
            rail_length: number("rail_length", &raw.rail_length)?,
            cansat_mass: number("cansat_mass", &raw.cansat_mass)?,
            drag_coefficient: number("drag_coefficient", &raw.drag_coefficient)?,
            burn_time: number("burn_time", &raw.burn_time)?,
            average_thrust: number("average_thrust", &raw.average_thrust)?,
            elevation: number("elevation", &raw.elevation)?,
        })
    }
}

/// Request fields as submitted, before number parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRequest {
    pub inclination: String,
    pub heading: String,
    pub rail_length: String,
    pub cansat_mass: String,
    pub drag_coefficient: String,
    pub burn_time: String,
    pub average_thrust: String,
    pub elevation: String,
}

impl From<&SimulationRequest> for RawRequest {
    fn from(r: &SimulationRequest) -> Self {
        Self {
            inclination: r.inclination.to_string(),
            heading: r.heading.to_string(),
            rail_length: r.rail_length.to_string(),
            cansat_mass: r.cansat_mass.to_string(),
            drag_coefficient: r.drag_coefficient.to_string(),
            burn_time: r.burn_time.to_string(),
            average_thrust: r.average_thrust.to_string(),
            elevation: r.elevation.to_string(),
        }
    }
}

fn number(field: &'static str, value: &str) -> Result<f64, InputError> {
    value.trim().parse::<f64>().map_err(|_| InputError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_form_defaults() {
        let raw = RawRequest::from(&SimulationRequest::form_defaults());
        assert_eq!(SimulationRequest::parse(&raw).unwrap(), SimulationRequest::form_defaults());
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let mut raw = RawRequest::from(&SimulationRequest::form_defaults());
        raw.heading = " 45.5 ".into();
        assert_eq!(SimulationRequest::parse(&raw).unwrap().heading, 45.5);
    }

    #[test]
    fn names_the_offending_field() {
        let mut raw = RawRequest::from(&SimulationRequest::form_defaults());
        raw.burn_time = "3,5".into();
        let err = SimulationRequest::parse(&raw).unwrap_err();
        assert_eq!(
            err,
            InputError::InvalidNumber { field: "burn_time", value: "3,5".into() }
        );
        assert!(err.to_string().starts_with("invalid input format"));
    }

    #[test]
    fn empty_field_is_invalid() {
        let raw = RawRequest::default();
        let err = SimulationRequest::parse(&raw).unwrap_err();
        assert!(matches!(err, InputError::InvalidNumber { field: "inclination", .. }));
    }
}
