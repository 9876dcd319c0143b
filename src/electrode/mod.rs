// electrode/mod.rs
// Constitutive model library for intercalation electrode materials
//
// - Material registry (closed set of tagged materials)
// - Chemical potential closures, homogeneous and gradient-corrected
// - Solid transport coefficient D(y)
// - Fitted open-circuit potentials

pub mod material;
pub mod ocv_fits;
pub mod potential;
pub mod transport;

pub use material::*;
pub use ocv_fits::OcvFit;
pub use potential::*;
pub use transport::Transport;
