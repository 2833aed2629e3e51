use super::{EARTH_RADIUS, G0};

// ---------------------------------------------------------------------------
// ISA 1976 Standard Atmosphere (sea level to 86 km geopotential)
// ---------------------------------------------------------------------------

const R_AIR: f64 = 287.052_87; // specific gas constant for dry air, J/(kg·K)
const GAMMA: f64 = 1.4; // ratio of specific heats

const T0: f64 = 288.15; // sea-level temperature, K
const P0: f64 = 101_325.0; // sea-level pressure, Pa

/// Base of each ISA layer: (geopotential altitude m, temperature K,
/// lapse rate K/m, pressure Pa).
const LAYERS: [(f64, f64, f64, f64); 7] = [
    (0.0, T0, -0.0065, P0),
    (11_000.0, 216.65, 0.0, 22_632.1),
    (20_000.0, 216.65, 0.001, 5_474.89),
    (32_000.0, 228.65, 0.0028, 868.019),
    (47_000.0, 270.65, 0.0, 110.906),
    (51_000.0, 270.65, -0.0028, 66.9389),
    (71_000.0, 214.65, -0.002, 3.956_42),
];

/// Top of the tabulated layers (geopotential), m.
const H_TOP: f64 = 84_852.0;

/// Air properties at one altitude.
#[derive(Debug, Clone, Copy)]
pub struct AirProperties {
    pub density: f64,     // kg/m^3
    pub pressure: f64,    // Pa
    pub temperature: f64, // K
    pub sound_speed: f64, // m/s
}

/// Geometric altitude above sea level to geopotential altitude.
pub fn geopotential(altitude_m: f64) -> f64 {
    EARTH_RADIUS * altitude_m / (EARTH_RADIUS + altitude_m)
}

/// ISA 1976 standard atmosphere at a geometric altitude above sea level.
///
/// Layers are evaluated in geopotential altitude. Altitudes below sea level
/// clamp to sea level; above the last layer pressure decays exponentially.
pub fn isa(altitude_m: f64) -> AirProperties {
    let h = geopotential(altitude_m.max(0.0));

    let (temperature, pressure) = if h >= H_TOP {
        let t = 186.87;
        let p = 0.3734 * (-0.000_15 * (h - H_TOP)).exp();
        (t, p.max(0.0))
    } else {
        let &(h_base, t_base, lapse, p_base) = LAYERS
            .iter()
            .rev()
            .find(|layer| h >= layer.0)
            .unwrap_or(&LAYERS[0]);
        if lapse == 0.0 {
            isothermal_layer(h, h_base, t_base, p_base)
        } else {
            gradient_layer(h, h_base, t_base, lapse, p_base)
        }
    };

    let density = if temperature > 0.0 {
        pressure / (R_AIR * temperature)
    } else {
        0.0
    };

    AirProperties {
        density,
        pressure,
        temperature,
        sound_speed: (GAMMA * R_AIR * temperature).sqrt(),
    }
}

fn gradient_layer(h: f64, h_base: f64, t_base: f64, lapse: f64, p_base: f64) -> (f64, f64) {
    let t = t_base + lapse * (h - h_base);
    let p = p_base * (t / t_base).powf(-G0 / (lapse * R_AIR));
    (t, p)
}

fn isothermal_layer(h: f64, h_base: f64, t: f64, p_base: f64) -> (f64, f64) {
    let p = p_base * ((-G0 / (R_AIR * t)) * (h - h_base)).exp();
    (t, p)
}
