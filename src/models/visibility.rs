//! Per-night visibility model.

use serde::{Deserialize, Serialize};

use crate::api::{ModifiedJulianDate, Period};
use crate::models::CelestialTarget;

/// One night's twilight boundaries, computed once per night.
///
/// The night runs twilight-to-twilight as a single continuous MJD interval,
/// so a night crossing local midnight needs no special handling downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Night {
    /// Calendar date (UTC) the night starts on
    pub date: chrono::NaiveDate,
    /// End of evening twilight, start of usable darkness
    pub evening_twilight: ModifiedJulianDate,
    /// Start of morning twilight, end of usable darkness
    pub morning_twilight: ModifiedJulianDate,
}

impl Night {
    pub fn new(
        date: chrono::NaiveDate,
        evening_twilight: ModifiedJulianDate,
        morning_twilight: ModifiedJulianDate,
    ) -> Self {
        Self {
            date,
            evening_twilight,
            morning_twilight,
        }
    }

    /// The full twilight-to-twilight interval.
    pub fn bounds(&self) -> Period {
        Period {
            start: self.evening_twilight,
            stop: self.morning_twilight,
        }
    }

    pub fn duration_hours(&self) -> qtty::Hours {
        self.bounds().duration_hours()
    }
}

/// A contiguous interval during which a target satisfies the pointing and
/// twilight constraints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationWindow {
    pub period: Period,
    /// No sampled instant inside the window is moon-interfered.
    /// Defaults to true; the moon analyzer downgrades it.
    pub moon_free: bool,
    /// Window length meets the configured minimum visibility duration.
    pub meets_minimum: bool,
}

impl ObservationWindow {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            moon_free: true,
            meets_minimum: true,
        }
    }

    pub fn duration_hours(&self) -> qtty::Hours {
        self.period.duration_hours()
    }
}

/// A target's visibility for one specific night: disjoint observation
/// windows plus the minimum-duration verdict. Immutable after the moon
/// annotation pass; consumed by the mosaic detector and the scheduler.
#[derive(Debug, Clone, Serialize)]
pub struct VisibilityRecord<'a> {
    pub target: &'a CelestialTarget,
    /// Disjoint windows, ordered by start time
    pub windows: Vec<ObservationWindow>,
    /// True when no window meets the minimum-duration policy
    pub insufficient_time: bool,
}

impl<'a> VisibilityRecord<'a> {
    pub fn new(target: &'a CelestialTarget, windows: Vec<ObservationWindow>) -> Self {
        let insufficient_time = !windows.iter().any(|w| w.meets_minimum);
        Self {
            target,
            windows,
            insufficient_time,
        }
    }

    /// Windows usable for scheduling under the exclude-insufficient policy.
    pub fn schedulable_windows(&self, exclude_insufficient: bool) -> Vec<ObservationWindow> {
        if exclude_insufficient {
            self.windows.iter().filter(|w| w.meets_minimum).copied().collect()
        } else {
            self.windows.clone()
        }
    }

    /// Total moon-free time across all windows.
    pub fn moon_free_hours(&self) -> qtty::Hours {
        let total: f64 = self
            .windows
            .iter()
            .filter(|w| w.moon_free)
            .map(|w| w.duration_hours().value())
            .sum();
        qtty::Hours::new(total)
    }

    pub fn is_observable(&self) -> bool {
        !self.windows.is_empty()
    }
}
