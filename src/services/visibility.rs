//! Visibility filter: raw ephemeris positions to per-target observation
//! windows bounded by twilight and the pointing rectangle.

use crate::api::{ModifiedJulianDate, Period};
use crate::config::PlannerConfig;
use crate::ephemeris::{EphemerisProvider, EphemerisResult};
use crate::models::{CelestialTarget, Night, ObservationWindow, VisibilityRecord};

/// Compute one night's twilight bounds. `None` when the sun never reaches
/// the configured depression (polar summer).
pub fn compute_night(
    date: chrono::NaiveDate,
    config: &PlannerConfig,
    provider: &impl EphemerisProvider,
) -> EphemerisResult<Option<Night>> {
    let bounds = provider.twilight_bounds(date, config.visibility.twilight_type)?;
    Ok(bounds.map(|p| Night::new(date, p.start, p.stop)))
}

/// Compute visibility records for all targets over one night.
///
/// Positions are sampled at the configured trajectory interval across the
/// twilight-to-twilight interval; an instant is visible iff the target's
/// alt/az lie within the pointing rectangle and the sun sits below the
/// twilight threshold. Contiguous visible samples merge into windows; those
/// shorter than the minimum visibility duration are flagged rather than
/// discarded, so the mosaic detector still sees them.
pub fn compute_visibility<'a>(
    targets: &'a [CelestialTarget],
    night: &Night,
    config: &PlannerConfig,
    provider: &impl EphemerisProvider,
) -> EphemerisResult<Vec<VisibilityRecord<'a>>> {
    let mut records = Vec::with_capacity(targets.len());
    for target in targets {
        records.push(compute_target_visibility(target, night, config, provider)?);
    }
    log::debug!(
        "visibility: {}/{} targets observable on {}",
        records.iter().filter(|r| r.is_observable()).count(),
        targets.len(),
        night.date
    );
    Ok(records)
}

/// Visibility windows for a single target.
pub fn compute_target_visibility<'a>(
    target: &'a CelestialTarget,
    night: &Night,
    config: &PlannerConfig,
    provider: &impl EphemerisProvider,
) -> EphemerisResult<VisibilityRecord<'a>> {
    let step_minutes = config.visibility.trajectory_interval_minutes;
    let threshold = config.visibility.twilight_type.sun_altitude_threshold();
    let bounds = night.bounds();

    let mut windows: Vec<ObservationWindow> = Vec::new();
    let mut open_start: Option<ModifiedJulianDate> = None;
    let mut last_visible: Option<ModifiedJulianDate> = None;

    let mut t = bounds.start;
    while t.value() <= bounds.stop.value() {
        let position = provider.target_horizontal(target.coordinates, t)?;
        let sun_altitude = provider.sun_altitude(t)?;

        let pointable = in_pointing_rectangle(&position, config);
        let dark = sun_altitude.value() < threshold.value();

        if pointable && dark {
            if open_start.is_none() {
                open_start = Some(t);
            }
            last_visible = Some(t);
        } else if let (Some(start), Some(end)) = (open_start.take(), last_visible) {
            push_window(&mut windows, start, end, step_minutes, &bounds, config);
        }

        t = t.add_minutes(step_minutes);
    }
    if let (Some(start), Some(end)) = (open_start, last_visible) {
        push_window(&mut windows, start, end, step_minutes, &bounds, config);
    }

    Ok(VisibilityRecord::new(target, windows))
}

fn in_pointing_rectangle(position: &crate::api::Horizontal, config: &PlannerConfig) -> bool {
    let loc = &config.location;
    let alt = position.altitude.value();
    let az = position.azimuth.wrap_pos().value();
    alt >= loc.min_altitude.value()
        && alt <= loc.max_altitude.value()
        && az >= loc.min_azimuth.value()
        && az <= loc.max_azimuth.value()
}

/// Close a run of visible samples into a window. The run extends half a step
/// past its last sample, clipped to the night bounds; a window shorter than
/// the minimum visibility duration is kept but flagged.
fn push_window(
    windows: &mut Vec<ObservationWindow>,
    start: ModifiedJulianDate,
    last_sample: ModifiedJulianDate,
    step_minutes: f64,
    bounds: &Period,
    config: &PlannerConfig,
) {
    let stop_mjd = (last_sample.value() + step_minutes / 2.0 / 1440.0).min(bounds.stop.value());
    let Some(period) = Period::new(start, ModifiedJulianDate::new(stop_mjd)) else {
        return;
    };
    let mut window = ObservationWindow::new(period);
    window.meets_minimum =
        window.duration_hours().value() >= config.visibility.min_visibility_hours;
    windows.push(window);
}
