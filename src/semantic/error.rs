//! Unified error type for compilation.
//!
//! Every stage of the pipeline (registry, resolution, variation policy,
//! planning, fingerprinting) reports failures through [`CompileError`].
//! Compilation is all-or-nothing: an error means no SQL was produced.

use thiserror::Error;

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileError {
    /// A cube with this name is already registered.
    #[error("cube '{0}' is already registered")]
    DuplicateCube(String),

    #[error("unknown cube '{0}'")]
    UnknownCube(String),

    #[error("cube '{cube}' has no field '{field}'")]
    UnknownField { cube: String, field: String },

    /// Touched cubes with no declared join path between them.
    #[error("no declared join connects cube '{from}' to '{to}'")]
    UnjoinableCubes { from: String, to: String },

    #[error("role '{role}' may not see {dimension}: {reason}")]
    VariationViolation {
        role: String,
        dimension: String,
        reason: String,
    },

    #[error("request selects no measures and no dimensions")]
    EmptySelection,

    #[error("measure '{measure}': unsupported aggregation '{kind}'")]
    UnsupportedAggregation { measure: String, kind: String },

    #[error("invalid grain: {0}")]
    InvalidGrain(String),

    /// Malformed cube declaration.
    #[error("invalid schema for cube '{cube}': {message}")]
    InvalidSchema { cube: String, message: String },

    #[error("invalid filter on '{member}': {message}")]
    InvalidFilter { member: String, message: String },

    #[error("failed to fingerprint request: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

impl CompileError {
    pub(crate) fn unknown_field(cube: &str, field: &str) -> Self {
        Self::UnknownField {
            cube: cube.into(),
            field: field.into(),
        }
    }

    pub(crate) fn invalid_schema(cube: &str, message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            cube: cube.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_filter(member: &str, message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            member: member.into(),
            message: message.into(),
        }
    }

    pub(crate) fn variation(role: &str, dimension: &str, reason: impl Into<String>) -> Self {
        Self::VariationViolation {
            role: role.into(),
            dimension: dimension.into(),
            reason: reason.into(),
        }
    }
}
