//! Error types for module construction and system simulation.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building modules or running a system simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A module parameter is outside its physical domain.
    #[error("invalid module parameter `{field}`: {reason}")]
    InvalidModule { field: &'static str, reason: String },

    /// Irradiance input selector is neither `diffuse` nor `dni`.
    #[error("unknown irradiance input type \"{0}\" (expected \"diffuse\" or \"dni\")")]
    UnknownIrradianceInput(String),

    /// Diffuse sky model name is not recognized.
    #[error("unknown diffuse sky model \"{0}\"")]
    UnknownDiffuseModel(String),

    /// Two series that must be time-aligned have different lengths.
    #[error("series `{name}` has {actual} samples, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Incidence angle modifier table is unusable.
    #[error("invalid IAM table: {0}")]
    InvalidIamTable(String),
}

impl ModelError {
    /// Checks that `actual` matches `expected`, naming the offending series.
    pub fn check_len(name: &'static str, expected: usize, actual: usize) -> ModelResult<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::LengthMismatch {
                name,
                expected,
                actual,
            })
        }
    }
}
