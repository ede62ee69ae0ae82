//! Single-night planning pipeline.
//!
//! Orchestrates the per-night stages in order: twilight bounds, visibility
//! sampling, moon annotation, mosaic detection, schedule construction. The
//! configuration is validated once at the top; ephemeris queries go through
//! a per-run memoizing wrapper so each (body, instant) pair is computed once.

use crate::config::PlannerConfig;
use crate::ephemeris::{EphemerisProvider, MemoizedEphemeris};
use crate::error::PlannerResult;
use crate::models::{CelestialTarget, MosaicGroup, Night, Schedule, VisibilityRecord};
use crate::services::{mosaic, moon, scheduler, visibility};

/// Complete planning result for one night.
#[derive(Debug)]
pub struct NightPlan<'a> {
    pub night: Night,
    /// One record per input target, moon-annotated
    pub records: Vec<VisibilityRecord<'a>>,
    pub groups: Vec<MosaicGroup<'a>>,
    /// Indices into `records` scheduled individually rather than as mosaic
    /// members
    pub standalone: Vec<usize>,
    pub schedule: Schedule,
}

impl NightPlan<'_> {
    /// Candidates the scheduler actually considered: observable standalone
    /// records plus mosaic groups.
    pub fn candidate_count(&self) -> usize {
        let standalone_observable = self
            .standalone
            .iter()
            .filter(|&&i| self.records[i].is_observable())
            .count();
        standalone_observable + self.groups.len()
    }

    pub fn stats(&self) -> crate::models::ScheduleStats {
        self.schedule.stats(self.candidate_count())
    }
}

/// Plan one night for a target catalog.
///
/// Returns `Ok(None)` when the sun never reaches the configured twilight
/// depression on that date (polar summer): there is no night to plan.
/// Configuration errors abort before any ephemeris work; an ephemeris
/// failure aborts this night only and carries the instant it occurred at.
pub fn plan_night<'a>(
    targets: &'a [CelestialTarget],
    date: chrono::NaiveDate,
    config: &PlannerConfig,
    provider: &impl EphemerisProvider,
) -> PlannerResult<Option<NightPlan<'a>>> {
    config.validate()?;
    let memo = MemoizedEphemeris::new(provider);

    let Some(night) = visibility::compute_night(date, config, &memo)? else {
        log::info!("no darkness on {date}, skipping");
        return Ok(None);
    };

    let raw = visibility::compute_visibility(targets, &night, config, &memo)?;
    let mut records = Vec::with_capacity(raw.len());
    for record in raw {
        records.push(moon::annotate_moon_interference(record, config, &memo)?);
    }

    let detection = mosaic::detect_clusters(&records, config);
    let standalone_records: Vec<VisibilityRecord<'a>> = detection
        .standalone
        .iter()
        .map(|&i| records[i].clone())
        .collect();
    let schedule = scheduler::build_schedule(&standalone_records, &detection.groups, &night, config);

    log::info!(
        "planned {}: {} targets, {} groups, {} scheduled",
        date,
        targets.len(),
        detection.groups.len(),
        schedule.entries.len()
    );
    Ok(Some(NightPlan {
        night,
        records,
        groups: detection.groups,
        standalone: detection.standalone,
        schedule,
    }))
}
