use thiserror::Error;

/// Main error type for NearBO
#[derive(Error, Debug)]
pub enum NbError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NbError {
    /// True for caller-side precondition violations.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, NbError::InvalidInput(_))
    }
}

/// Precondition violations detected before any search work starts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("observation set is empty")]
    EmptyObservations,

    #[error("length mismatch: {points} points but {values} values")]
    LengthMismatch { points: usize, values: usize },

    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("points must have at least one dimension")]
    ZeroDimensions,

    #[error("observation must be finite, got value {value} at {point:?}")]
    NonFiniteObservation { point: Vec<f64>, value: f64 },

    #[error("uncertainty must be non-negative, got {uncertainty}")]
    NegativeUncertainty { uncertainty: f64 },

    #[error("step size must be finite, got {eps}")]
    NonFiniteStep { eps: f64 },

    #[error("objective returned a non-finite value {value} at {point:?}")]
    NonFiniteObjective { point: Vec<f64>, value: f64 },
}

/// Result type alias for NearBO operations
pub type NbResult<T> = Result<T, NbError>;

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::NbError::Config(format!($($arg)*))
    };
}
