//! Physical constants and unit conventions.
//!
//! Dimensional quantities are SI throughout:
//! - Length: metre (m)
//! - Time: second (s)
//! - Energy: joule (J)
//! - Concentration: mol/m³
//!
//! Nothing here is ambient state: the constants travel through the pipeline
//! as a [`Constants`] value read from the `[constants]` section.

use serde::{Deserialize, Serialize};

/// Boltzmann constant in J/K.
pub const BOLTZMANN: f64 = 1.381e-23;
/// Reference temperature in kelvin.
pub const REFERENCE_TEMPERATURE: f64 = 298.0;
/// Elementary charge in coulombs.
pub const ELEMENTARY_CHARGE: f64 = 1.602e-19;
/// Avogadro's number in 1/mol.
pub const AVOGADRO: f64 = 6.022e23;
/// Concentration of a 1 M solution in mol/m³.
pub const MOLAR: f64 = 1000.0;
/// Seconds per hour, for C-rate conversions.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Fundamental constants bundle threaded through every stage that needs them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constants {
    /// Boltzmann constant (J/K)
    pub k: f64,
    /// Reference temperature (K)
    pub t_ref: f64,
    /// Elementary charge (C)
    pub e: f64,
    /// Avogadro's number (1/mol)
    pub n_a: f64,
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            k: BOLTZMANN,
            t_ref: REFERENCE_TEMPERATURE,
            e: ELEMENTARY_CHARGE,
            n_a: AVOGADRO,
        }
    }
}

impl Constants {
    /// Faraday's constant e·N_A (C/mol).
    pub fn faraday(&self) -> f64 {
        self.e * self.n_a
    }

    /// Reference thermal energy k·Tref (J).
    pub fn thermal_energy(&self) -> f64 {
        self.k * self.t_ref
    }

    /// Thermal voltage k·Tref/e (V).
    pub fn thermal_voltage(&self) -> f64 {
        self.thermal_energy() / self.e
    }

    /// Inverse thermal voltage e/(k·Tref) (1/V).
    pub fn eokt(&self) -> f64 {
        self.e / self.thermal_energy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thermal_voltage_near_25_mv() {
        let c = Constants::default();
        let v = c.thermal_voltage();
        assert!((v - 0.02569).abs() < 1e-4, "kT/e = {}", v);
        assert!((c.eokt() * v - 1.0).abs() < 1e-12);
    }

    #[test]
    fn faraday_matches_product() {
        let c = Constants::default();
        assert!((c.faraday() - 96_472.44).abs() < 1.0);
    }
}
