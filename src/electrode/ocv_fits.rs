// electrode/ocv_fits.rs
// Fitted open-circuit potentials used as equilibrium reference offsets

use crate::error::{SetupError, SetupResult};
use crate::units::Constants;

/// Materials with an empirical open-circuit voltage fit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OcvFit {
    /// Spinel LiyMn2O4 (Doyle et al. 1996)
    LiMn2O4,
    /// Petroleum coke LixC6 (Doyle et al. 1996)
    LiC6Coke,
    /// LiNi0.8Co0.15Al0.05O2, tenth-order polynomial fit
    Nca,
}

impl OcvFit {
    /// Look up the fit for a material identifier.
    pub fn for_material(material: &str) -> SetupResult<Self> {
        match material {
            "LiMn2O4" | "LiMn2O4_ss" => Ok(OcvFit::LiMn2O4),
            "LiC6" | "LiC6_coke_ss" => Ok(OcvFit::LiC6Coke),
            "NCA1" | "NCA_ss1" => Ok(OcvFit::Nca),
            _ => Err(SetupError::material(
                material,
                "no fitted equilibrium potential for this material",
            )),
        }
    }

    /// Open-circuit voltage (V vs Li/Li⁺) at filling fraction `y`.
    pub fn ocv(&self, y: f64) -> f64 {
        match self {
            OcvFit::LiMn2O4 => {
                4.19829 + 0.0565661 * (-14.5546 * y + 8.60942).tanh()
                    - 0.0275479 * (1.0 / (0.998432 - y).powf(0.492465) - 1.90111)
                    - 0.157123 * (-0.04738 * y.powi(8)).exp()
                    + 0.810239 * (-40.0 * (y - 0.133875)).exp()
            }
            OcvFit::LiC6Coke => -0.16 + 1.32 * (-3.0 * y).exp() + 10.0 * (-2000.0 * y).exp(),
            OcvFit::Nca => {
                1.638 * y.powi(10) - 2.222 * y.powi(9) + 15.056 * y.powi(8)
                    - 23.488 * y.powi(7)
                    + 81.246 * y.powi(6)
                    - 344.566 * y.powi(5)
                    + 621.3475 * y.powi(4)
                    - 554.774 * y.powi(3)
                    + 264.427 * y.powi(2)
                    - 66.3691 * y
                    + 11.8058
                    - 0.61386 * (5.8201 * y.powf(136.4)).exp()
            }
        }
    }

    /// Non-dimensional equilibrium potential difference e·OCV/(k·Tref).
    pub fn dphi_eq(&self, y: f64, constants: &Constants) -> f64 {
        constants.eokt() * self.ocv(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_are_in_plausible_voltage_windows() {
        for y in [0.4, 0.5, 0.8] {
            let v = OcvFit::LiMn2O4.ocv(y);
            assert!(v > 3.5 && v < 4.5, "LiMn2O4 at {}: {}", y, v);
            let v = OcvFit::LiC6Coke.ocv(y);
            assert!(v > -0.2 && v < 1.5, "coke at {}: {}", y, v);
            let v = OcvFit::Nca.ocv(y);
            assert!(v > 3.0 && v < 4.5, "NCA at {}: {}", y, v);
        }
    }

    #[test]
    fn aliases_resolve_to_the_same_fit() {
        assert_eq!(OcvFit::for_material("LiMn2O4").unwrap(), OcvFit::LiMn2O4);
        assert_eq!(OcvFit::for_material("LiMn2O4_ss").unwrap(), OcvFit::LiMn2O4);
        assert_eq!(OcvFit::for_material("NCA1").unwrap(), OcvFit::Nca);
    }

    #[test]
    fn missing_fit_names_material() {
        match OcvFit::for_material("LiFePO4") {
            Err(SetupError::UnsupportedMaterial { material, .. }) => assert_eq!(material, "LiFePO4"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn dphi_is_scaled_by_thermal_voltage() {
        let c = Constants::default();
        let y = 0.3;
        let dphi = OcvFit::LiC6Coke.dphi_eq(y, &c);
        assert!((dphi * c.thermal_voltage() - OcvFit::LiC6Coke.ocv(y)).abs() < 1e-12);
    }
}
