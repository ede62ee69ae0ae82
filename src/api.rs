//! Public API surface for the planning engine.
//!
//! This file consolidates the small value types shared across the pipeline.
//! All types derive Serialize/Deserialize so results can be handed to
//! external report and charting collaborators as structured data.

use serde::{Deserialize, Serialize};

pub use crate::models::ModifiedJulianDate;

/// Catalog target identifier (e.g. "M42", "NGC 7000").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetId(pub String);

impl TargetId {
    pub fn new(value: impl Into<String>) -> Self {
        TargetId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Equatorial coordinates (ICRS right ascension and declination, degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equatorial {
    pub ra: qtty::Degrees,
    pub dec: qtty::Degrees,
}

impl Equatorial {
    pub fn new(ra: qtty::Degrees, dec: qtty::Degrees) -> Self {
        Self { ra, dec }
    }

    pub fn from_degrees(ra: f64, dec: f64) -> Self {
        Self {
            ra: qtty::Degrees::new(ra),
            dec: qtty::Degrees::new(dec),
        }
    }
}

/// Horizontal coordinates (altitude above horizon, azimuth east of north).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Horizontal {
    pub altitude: qtty::Degrees,
    pub azimuth: qtty::Degrees,
}

impl Horizontal {
    pub fn new(altitude: qtty::Degrees, azimuth: qtty::Degrees) -> Self {
        Self { altitude, azimuth }
    }
}

/// Time period in Modified Julian Date (MJD) format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Period {
    /// Start time in MJD
    pub start: ModifiedJulianDate,
    /// End time in MJD
    pub stop: ModifiedJulianDate,
}

impl Period {
    pub fn new(start: ModifiedJulianDate, stop: ModifiedJulianDate) -> Option<Self> {
        if start.value() < stop.value() {
            Some(Self { start, stop })
        } else {
            None
        }
    }

    pub fn from_mjd(start: f64, stop: f64) -> Self {
        Self {
            start: ModifiedJulianDate::new(start),
            stop: ModifiedJulianDate::new(stop),
        }
    }

    /// Length of the interval in days.
    pub fn duration(&self) -> qtty::Days {
        qtty::Days::new(self.stop.value() - self.start.value())
    }

    /// Length of the interval in hours.
    pub fn duration_hours(&self) -> qtty::Hours {
        qtty::Hours::new((self.stop.value() - self.start.value()) * 24.0)
    }

    /// Check if a given MJD instant lies inside this interval (inclusive start, exclusive end).
    pub fn contains(&self, t_mjd: ModifiedJulianDate) -> bool {
        self.start.value() <= t_mjd.value() && t_mjd.value() < self.stop.value()
    }

    /// Check if this interval overlaps with another.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start.value() < other.stop.value() && other.start.value() < self.stop.value()
    }

    /// Length of the overlap with another interval, in minutes. Zero when disjoint.
    pub fn overlap_minutes(&self, other: &Self) -> f64 {
        let lo = self.start.value().max(other.start.value());
        let hi = self.stop.value().min(other.stop.value());
        ((hi - lo).max(0.0)) * 1440.0
    }

    /// Intersection with another interval, or `None` when the overlap has
    /// zero duration.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let lo = self.start.value().max(other.start.value());
        let hi = self.stop.value().min(other.stop.value());
        if lo < hi {
            Some(Self::from_mjd(lo, hi))
        } else {
            None
        }
    }
}
