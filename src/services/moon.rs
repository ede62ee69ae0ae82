//! Moon interference annotation.
//!
//! Interference is a scoring input, never a hard filter: an affected window
//! stays in the record and is discounted during scheduling.

use crate::algorithms::geometry;
use crate::api::ModifiedJulianDate;
use crate::config::PlannerConfig;
use crate::ephemeris::{EphemerisProvider, EphemerisResult};
use crate::models::{ObservationWindow, VisibilityRecord};

/// Annotate each window of a record with the moon-free/moon-affected verdict.
///
/// A window is moon-free iff no sampled instant inside it has the target
/// closer to the moon than the illumination-dependent exclusion radius
/// (the additional sky-brightness penalty near full moon is applied at the
/// scoring stage, not here).
pub fn annotate_moon_interference<'a>(
    record: VisibilityRecord<'a>,
    config: &PlannerConfig,
    provider: &impl EphemerisProvider,
) -> EphemerisResult<VisibilityRecord<'a>> {
    let target = record.target;
    let mut windows = Vec::with_capacity(record.windows.len());
    for window in &record.windows {
        let mut annotated = *window;
        annotated.moon_free = window_is_moon_free(target.coordinates, window, config, provider)?;
        windows.push(annotated);
    }
    Ok(VisibilityRecord::new(target, windows))
}

fn window_is_moon_free(
    target: crate::api::Equatorial,
    window: &ObservationWindow,
    config: &PlannerConfig,
    provider: &impl EphemerisProvider,
) -> EphemerisResult<bool> {
    let step_minutes = config.visibility.trajectory_interval_minutes;
    let mut t = window.period.start;
    loop {
        if instant_interfered(target, t, config, provider)? {
            return Ok(false);
        }
        if t.value() >= window.period.stop.value() {
            return Ok(true);
        }
        // Clamp the final sample onto the window end
        t = ModifiedJulianDate::new(
            (t.value() + step_minutes / 1440.0).min(window.period.stop.value()),
        );
    }
}

/// Whether a single instant is moon-interfered for a target position.
pub fn instant_interfered(
    target: crate::api::Equatorial,
    at: ModifiedJulianDate,
    config: &PlannerConfig,
    provider: &impl EphemerisProvider,
) -> EphemerisResult<bool> {
    let moon = provider.moon_equatorial(at)?;
    let illumination = provider.moon_illumination(at)?;
    let separation = geometry::angular_separation(target, moon);
    let radius = config.moon.radius_for(illumination);
    Ok(separation.value() < radius.value())
}
