use thiserror::Error;

/// Errors raised while building or mutating the body registry
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolarError {
    #[error("body `{name}` has an invalid radius ({radius}); it must be positive and finite")]
    InvalidRadius { name: String, radius: f64 },

    #[error("body `{name}` has an invalid orbit radius ({radius}); it must be positive and finite")]
    InvalidOrbitRadius { name: String, radius: f64 },

    #[error("body `{0}` is declared more than once")]
    DuplicateName(String),

    #[error("no body named `{0}`")]
    UnknownBody(String),

    #[error("speed multiplier {0} is outside [0, 5]")]
    SpeedOutOfRange(f64),
}

pub type SolarResult<T> = Result<T, SolarError>;
