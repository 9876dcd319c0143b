// electrode/transport.rs
// Filling-fraction dependence of the solid transport coefficient

use serde::{Deserialize, Serialize};

/// Dimensionless transport coefficient D(y), with Flux = -D_ref·D(y)·∇(y or μ).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transport {
    /// D(y) = 1
    Constant,
    /// Lattice-gas mobility D(y) = y(1 - y)
    Lattice,
}

impl Transport {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "constant" => Some(Transport::Constant),
            "lattice" => Some(Transport::Lattice),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Transport::Constant => "constant",
            Transport::Lattice => "lattice",
        }
    }

    pub fn coefficient(&self, y: f64) -> f64 {
        match self {
            Transport::Constant => 1.0,
            Transport::Lattice => y * (1.0 - y),
        }
    }

    /// The coefficient as a plain function pointer for the solver.
    pub fn as_fn(&self) -> fn(f64) -> f64 {
        match self {
            Transport::Constant => |_| 1.0,
            Transport::Lattice => |y| y * (1.0 - y),
        }
    }
}
