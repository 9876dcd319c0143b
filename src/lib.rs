pub mod config;
pub mod electrode;
pub mod error;
pub mod geometry;
pub mod nondim;
pub mod particles;
pub mod report;
pub mod setup;
pub mod units;
pub mod validate;

pub use config::{CellConfig, ElectrodeRole};
pub use error::{SetupError, SetupResult};
pub use setup::CellSetup;
