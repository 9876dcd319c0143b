// error.rs
// Error taxonomy for the setup pipeline. Every variant is fatal for the setup.

use std::fmt;

/// Errors raised while validating, synthesizing or non-dimensionalizing a cell.
#[derive(Debug)]
pub enum SetupError {
    /// Invalid or inconsistent input, caught before any numeric work.
    /// `location` is the offending `section.role.key` path.
    Configuration { location: String, message: String },
    /// No constitutive model or equilibrium fit exists for the material.
    UnsupportedMaterial { material: String, context: String },
    /// The requested shape / solid-type combination is not implemented.
    UnsupportedGeometry { shape: String, solid_type: String, detail: String },
    /// State arity or length does not match the selected closure.
    ShapeMismatch { material: String, detail: String },
    /// Reading or writing a configuration/report file failed.
    Io(std::io::Error),
    /// TOML/JSON (de)serialization failed.
    Parse(String),
}

pub type SetupResult<T> = Result<T, SetupError>;

impl SetupError {
    pub fn config(location: impl Into<String>, message: impl Into<String>) -> Self {
        SetupError::Configuration {
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn material(material: impl Into<String>, context: impl Into<String>) -> Self {
        SetupError::UnsupportedMaterial {
            material: material.into(),
            context: context.into(),
        }
    }

    pub fn geometry(
        shape: impl Into<String>,
        solid_type: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        SetupError::UnsupportedGeometry {
            shape: shape.into(),
            solid_type: solid_type.into(),
            detail: detail.into(),
        }
    }

    pub fn shape_mismatch(material: impl Into<String>, detail: impl Into<String>) -> Self {
        SetupError::ShapeMismatch {
            material: material.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::Configuration { location, message } => {
                write!(f, "configuration error at {}: {}", location, message)
            }
            SetupError::UnsupportedMaterial { material, context } => {
                write!(f, "unsupported material '{}' ({})", material, context)
            }
            SetupError::UnsupportedGeometry {
                shape,
                solid_type,
                detail,
            } => write!(
                f,
                "unsupported geometry: shape '{}' with solid type '{}': {}",
                shape, solid_type, detail
            ),
            SetupError::ShapeMismatch { material, detail } => {
                write!(f, "state shape mismatch for '{}': {}", material, detail)
            }
            SetupError::Io(e) => write!(f, "i/o error: {}", e),
            SetupError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SetupError {
    fn from(e: std::io::Error) -> Self {
        SetupError::Io(e)
    }
}

impl From<toml::de::Error> for SetupError {
    fn from(e: toml::de::Error) -> Self {
        SetupError::Parse(e.to_string())
    }
}

impl From<toml::ser::Error> for SetupError {
    fn from(e: toml::ser::Error) -> Self {
        SetupError::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for SetupError {
    fn from(e: serde_json::Error) -> Self {
        SetupError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let e = SetupError::config("particles.cathode.solid_type", "unknown solid type 'XYZ'");
        assert!(e.to_string().contains("particles.cathode.solid_type"));

        let e = SetupError::material("Unobtainium", "no constitutive model registered");
        assert!(e.to_string().contains("Unobtainium"));
    }
}
