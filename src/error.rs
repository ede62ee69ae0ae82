//! Error taxonomy for the planning engine.
//!
//! Configuration problems invalidate the entire run and surface before any
//! per-night computation starts. Ephemeris failures are scoped to a single
//! night and carry enough context for the caller to skip just that night.
//! Malformed catalog fields are not errors at all: they recover locally with
//! documented defaults (see `models::target`). An empty schedule is a valid
//! result, never an error.

use thiserror::Error;

use crate::api::ModifiedJulianDate;

pub type PlannerResult<T> = Result<T, PlannerError>;

/// Configuration errors, surfaced at pipeline start.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("latitude {0} out of range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} out of range [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("bortle index {0} out of range [1, 9]")]
    BortleOutOfRange(u8),
    #[error("inconsistent {axis} bounds: min {min} > max {max}")]
    InconsistentBounds {
        axis: &'static str,
        min: f64,
        max: f64,
    },
    #[error("unknown strategy name {0:?}")]
    UnknownStrategy(String),
    #[error("unknown twilight type {0:?}")]
    UnknownTwilightType(String),
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("max_cluster_size {0} out of range [2, 6]")]
    ClusterSizeOutOfRange(usize),
    #[error("invalid configuration file: {0}")]
    Parse(String),
}

/// Ephemeris provider failures, tagged with the instant that was being
/// queried so callers can skip the affected night.
#[derive(Debug, Clone, Error)]
#[error("ephemeris failure at MJD {mjd} ({body}): {reason}")]
pub struct EphemerisError {
    pub body: String,
    pub mjd: f64,
    pub reason: String,
}

impl EphemerisError {
    pub fn new(body: impl Into<String>, at: ModifiedJulianDate, reason: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            mjd: at.value(),
            reason: reason.into(),
        }
    }
}

/// Umbrella error for pipeline entry points.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
}
