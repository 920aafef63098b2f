use thiserror::Error;

/// Errors surfaced by the simulator, its configuration layer and exporters.
#[derive(Debug, Error)]
pub enum SimError {
    /// Text supplied for a numeric parameter is not a finite real number.
    #[error("invalid value for `{name}`: {value:?} is not a finite number")]
    InvalidParameter { name: &'static str, value: String },

    #[error("time step must be finite and > 0 (got {0})")]
    InvalidTimeStep(f64),

    #[error("plant mass must be finite and > 0 (got {0})")]
    InvalidMass(f64),

    #[error("output limit must be >= 0 (got {0})")]
    InvalidOutputLimit(f64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("configuration could not be serialized: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
