//! Convection coefficient correlations for the outer surfaces.
//!
//! Two regimes are supported:
//!
//! - **Natural**: buoyancy-driven, `h = C · cbrt(T_surface - T_ambient)`.
//!   The cube root keeps the sign of the temperature difference.
//! - **Forced**: wind-driven, `h = (11.4 + 5.7 · v) · 1e-6`, independent of
//!   the surface temperature.
//!
//! Coefficients are expressed in the package's length unit (mm), hence the
//! `1e-6` scaling of the usual W/(m²·K) correlations.

use std::str::FromStr;

use crate::error::ConfigError;

/// Ambient air temperature, 20 °C [K].
pub const AMBIENT_TEMPERATURE: f64 = 293.0;

/// Prefactor of the natural convection correlation.
pub const NATURAL_COEFFICIENT: f64 = 1.31e-6;

/// Wind speed used for forced convection [m/s].
pub const WIND_SPEED: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConvectionMode {
    #[default]
    Natural,
    Forced,
}

impl FromStr for ConvectionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "natural" => Ok(ConvectionMode::Natural),
            "forced" => Ok(ConvectionMode::Forced),
            other => Err(ConfigError::UnknownConvectionMode(other.to_string())),
        }
    }
}

/// Natural convection coefficient for a surface at `dt` above ambient.
pub fn natural_h(coefficient: f64, dt: f64) -> f64 {
    coefficient * dt.cbrt()
}

/// Forced convection coefficient for a given wind speed.
pub fn forced_h(wind_speed: f64) -> f64 {
    (11.4 + 5.7 * wind_speed) * 1e-6
}

/// Convection environment shared by every exposed surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Convection {
    pub mode: ConvectionMode,
    pub ambient: f64,
    pub natural_coefficient: f64,
    pub wind_speed: f64,
}

impl Default for Convection {
    fn default() -> Self {
        Self {
            mode: ConvectionMode::Natural,
            ambient: AMBIENT_TEMPERATURE,
            natural_coefficient: NATURAL_COEFFICIENT,
            wind_speed: WIND_SPEED,
        }
    }
}

impl Convection {
    pub fn new(mode: ConvectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Coefficient `h` for a surface whose adjacent interior point sits at
    /// `t_surface`.
    pub fn coefficient(&self, t_surface: f64) -> f64 {
        match self.mode {
            ConvectionMode::Natural => natural_h(self.natural_coefficient, t_surface - self.ambient),
            ConvectionMode::Forced => forced_h(self.wind_speed),
        }
    }
}
