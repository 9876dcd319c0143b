// geometry.rs
// Particle shape taxonomy: surface area, volume, unit-particle discretization
// and the radial curvature operator used by the non-homogeneous closures.

use crate::error::{SetupError, SetupResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// In-plane area factor of a C3 (platelet) particle: A_plane = 1.2263·L².
pub const C3_SHAPE_FACTOR: f64 = 1.2263;

/// Particle shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolidShape {
    Sphere,
    /// Platelet with a fixed out-of-plane thickness
    C3,
    /// Cylinder with a fixed axial thickness
    Cylinder,
}

impl SolidShape {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "sphere" => Some(SolidShape::Sphere),
            "C3" | "plate" => Some(SolidShape::C3),
            "cylinder" => Some(SolidShape::Cylinder),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            SolidShape::Sphere => "sphere",
            SolidShape::C3 => "C3",
            SolidShape::Cylinder => "cylinder",
        }
    }

    /// Radially symmetric shapes carry a radial mesh and curvature operator.
    pub fn is_round(&self) -> bool {
        matches!(self, SolidShape::Sphere | SolidShape::Cylinder)
    }

    /// Reactive surface area for characteristic length `len`.
    pub fn area(&self, len: f64, thickness: f64) -> f64 {
        match self {
            SolidShape::Sphere => 4.0 * PI * len * len,
            SolidShape::C3 => 2.0 * C3_SHAPE_FACTOR * len * len,
            SolidShape::Cylinder => 2.0 * PI * len * thickness,
        }
    }

    /// Particle volume for characteristic length `len`.
    pub fn volume(&self, len: f64, thickness: f64) -> f64 {
        match self {
            SolidShape::Sphere => (4.0 / 3.0) * PI * len * len * len,
            SolidShape::C3 => C3_SHAPE_FACTOR * len * len * thickness,
            SolidShape::Cylinder => PI * len * len * thickness,
        }
    }
}

impl fmt::Display for SolidShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Discretization/physics regime of a particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolidType {
    /// Lumped particle, a single state per particle
    Homog,
    /// Lumped particle with a size-dependent nucleation barrier
    HomogSdn,
    /// Front-tracking (Allen-Cahn reaction) along the particle length
    Acr,
    /// Cahn-Hilliard reaction, radially resolved
    Chr,
    /// Diffusion-limited, radially resolved
    Diffn,
}

impl SolidType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "homog" => Some(SolidType::Homog),
            "homog_sdn" => Some(SolidType::HomogSdn),
            "ACR" => Some(SolidType::Acr),
            "CHR" => Some(SolidType::Chr),
            "diffn" => Some(SolidType::Diffn),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            SolidType::Homog => "homog",
            SolidType::HomogSdn => "homog_sdn",
            SolidType::Acr => "ACR",
            SolidType::Chr => "CHR",
            SolidType::Diffn => "diffn",
        }
    }

    pub fn is_homogeneous(&self) -> bool {
        matches!(self, SolidType::Homog | SolidType::HomogSdn)
    }

    /// Convert a sampled length into (discretization count, discretized length).
    ///
    /// Front-tracking particles use N = ceil(raw/Δ) cells of width Δ. Radially
    /// resolved particles use N = ceil(raw/Δ) + 1 nodes spanning (N-1)·Δ.
    /// Lumped particles keep their raw length and a single state.
    pub fn discretize(&self, raw: f64, step: f64) -> (usize, f64) {
        match self {
            SolidType::Acr => {
                let n = (raw / step).ceil() as usize;
                (n, step * n as f64)
            }
            SolidType::Chr | SolidType::Diffn => {
                let n = (raw / step).ceil() as usize + 1;
                (n, step * (n - 1) as f64)
            }
            SolidType::Homog | SolidType::HomogSdn => (1, raw),
        }
    }
}

impl fmt::Display for SolidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Discretization of a particle scaled to unit size.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitDiscretization {
    /// Radial node positions in [0, 1]; `None` for C3 particles
    pub r: Option<Vec<f64>>,
    /// Volume fraction of the particle owned by each node (sums to 1)
    pub vol_frac: Vec<f64>,
}

/// Node positions and volume fractions of a particle with `n` states.
pub fn unit_solid_discretization(shape: SolidShape, n: usize) -> UnitDiscretization {
    if shape == SolidShape::C3 {
        return UnitDiscretization {
            r: None,
            vol_frac: vec![1.0 / n as f64; n],
        };
    }
    if n <= 1 {
        return UnitDiscretization {
            r: Some(vec![0.0]),
            vol_frac: vec![1.0],
        };
    }
    let rs = 1.0;
    let dr = rs / (n - 1) as f64;
    let r: Vec<f64> = (0..n).map(|i| i as f64 * dr).collect();
    let mut vol = vec![0.0; n];
    let total = match shape {
        SolidShape::Sphere => {
            vol[0] = (4.0 / 3.0) * PI * (dr / 2.0).powi(3);
            for i in 1..n - 1 {
                vol[i] = 4.0 * PI * (r[i] * r[i] * dr + dr.powi(3) / 12.0);
            }
            vol[n - 1] = (4.0 / 3.0) * PI * (rs.powi(3) - (rs - dr / 2.0).powi(3));
            (4.0 / 3.0) * PI * rs.powi(3)
        }
        _ => {
            vol[0] = PI * (dr / 2.0).powi(2);
            for i in 1..n - 1 {
                vol[i] = 2.0 * PI * r[i] * dr;
            }
            vol[n - 1] = PI * (rs * rs - (rs - dr / 2.0).powi(2));
            PI * rs * rs
        }
    };
    UnitDiscretization {
        r: Some(r),
        vol_frac: vol.into_iter().map(|v| v / total).collect(),
    }
}

/// Node spacing and shell face positions of a radially resolved particle.
///
/// Faces are `[0, midpoints..., 1]`. Returns `None` for C3 and single-node particles.
pub fn shell_edges(shape: SolidShape, n: usize) -> Option<(f64, Vec<f64>)> {
    let r = unit_solid_discretization(shape, n).r?;
    if r.len() < 2 {
        return None;
    }
    let dr = r[1] - r[0];
    let mut edges = Vec::with_capacity(r.len() + 1);
    edges.push(0.0);
    edges.extend(r.windows(2).map(|w| 0.5 * (w[0] + w[1])));
    edges.push(r[r.len() - 1]);
    Some((dr, edges))
}

/// Discrete Laplacian of `c` on a radial mesh with a wetting flux `beta_s` at r = rs.
///
/// Symmetry at the centre, and the surface node uses a ghost point
/// consistent with dc/dr = beta_s.
pub fn curvature(
    c: &[f64],
    dr: f64,
    r: &[f64],
    rs: f64,
    beta_s: f64,
    shape: SolidShape,
) -> SetupResult<Vec<f64>> {
    let n = c.len();
    if n < 2 || r.len() != n {
        return Err(SetupError::geometry(
            shape.tag(),
            "",
            format!("curvature needs at least two radial nodes, got {}", n),
        ));
    }
    // dimension-dependent factors: (centre, radial term, surface)
    let (centre, radial, surface) = match shape {
        SolidShape::Sphere => (3.0, 1.0, 2.0),
        SolidShape::Cylinder => (2.0, 0.5, 1.0),
        SolidShape::C3 => {
            return Err(SetupError::geometry(
                shape.tag(),
                "",
                "radial curvature is only defined for sphere and cylinder",
            ))
        }
    };
    let dr2 = dr * dr;
    let mut curv = vec![0.0; n];
    curv[0] = centre * (2.0 * c[1] - 2.0 * c[0]) / dr2;
    for i in 1..n - 1 {
        curv[i] = (c[i - 1] - 2.0 * c[i] + c[i + 1]) / dr2
            + radial * (c[i + 1] - c[i - 1]) / (dr * r[i]);
    }
    curv[n - 1] = (surface / rs) * beta_s + (2.0 * c[n - 2] - 2.0 * c[n - 1] + 2.0 * dr * beta_s) / dr2;
    Ok(curv)
}
