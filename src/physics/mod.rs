pub mod aerodynamics;
pub mod atmosphere;
pub mod gravity;

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

pub const G0: f64 = 9.80665; // standard gravity, m/s^2
pub const EARTH_RADIUS: f64 = 6_356_766.0; // ISA effective Earth radius, m
