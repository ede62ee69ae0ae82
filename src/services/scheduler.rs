//! Schedule construction.
//!
//! Candidates (standalone records and mosaic groups) compete for night time
//! under a strategy-specific score and ordering; the packer places each one
//! at the earliest feasible start inside one of its windows, shifting off a
//! conflict when the window leaves room, rejecting it otherwise.

use crate::algorithms::exposure;
use crate::api::Period;
use crate::config::{PlannerConfig, Strategy};
use crate::models::{
    Candidate, CandidateKind, MosaicGroup, Night, ObservationWindow, Schedule, ScheduleEntry,
    VisibilityRecord,
};

/// Build a conflict-free schedule for one night.
///
/// `records` are the standalone visibility records (already excluding mosaic
/// members); `groups` the detected mosaic groups. A night with zero placeable
/// candidates yields an explicitly empty schedule.
pub fn build_schedule<'a>(
    records: &'a [VisibilityRecord<'a>],
    groups: &'a [MosaicGroup<'a>],
    night: &Night,
    config: &PlannerConfig,
) -> Schedule {
    let strategy = config.scheduling.strategy;

    let mut candidates: Vec<Candidate<'a>> = records
        .iter()
        .map(Candidate::Standalone)
        .chain(groups.iter().map(Candidate::Grouped))
        .collect();

    // Strategy ordering is decided once here; scores are recorded into the
    // schedule entries for downstream reporting.
    let scored: Vec<(f64, Candidate<'a>)> = candidates
        .drain(..)
        .map(|c| (score(&c, strategy, config), c))
        .collect();
    let ordered = order_candidates(scored, strategy, config);

    let max_overlap_minutes = config.scheduling.max_overlap_minutes;
    let mut entries: Vec<ScheduleEntry> = Vec::new();

    for (candidate_score, candidate) in ordered {
        let windows = candidate.windows(config.scheduling.exclude_insufficient_time);
        if windows.is_empty() {
            continue;
        }
        let slot_days = slot_duration_days(&candidate, &windows, config);

        if let Some((period, shifted)) =
            place(&windows, slot_days, max_overlap_minutes, &entries)
        {
            entries.push(ScheduleEntry {
                id: candidate.id().to_string(),
                kind: if candidate.is_group() {
                    CandidateKind::Mosaic
                } else {
                    CandidateKind::Standalone
                },
                period,
                score: candidate_score,
                shifted,
            });
        }
    }

    log::debug!(
        "scheduler: {} entries under {:?} on {}",
        entries.len(),
        strategy,
        night.date
    );
    Schedule::new(strategy, *night, entries)
}

/// Strategy-specific candidate score.
fn score(candidate: &Candidate<'_>, strategy: Strategy, config: &PlannerConfig) -> f64 {
    let bortle = config.location.bortle_index;
    let base = config.imaging.base_exposure_hours;
    let longest = longest_window_hours(candidate, config);

    match strategy {
        Strategy::MaxObjects => 1.0,
        Strategy::LongestDuration => longest,
        Strategy::OptimalSnr => exposure::snr_quality(
            candidate.magnitude(),
            bortle,
            base,
            candidate.moon_free_hours(),
        ),
        // Groups outrank every standalone target; among groups, size then
        // duration decides. The inverse strategy mirrors the bias.
        Strategy::MosaicGroups => {
            if candidate.is_group() {
                1000.0 + 10.0 * candidate.size() as f64 + longest
            } else {
                longest
            }
        }
        Strategy::MinimalMosaic => {
            if candidate.is_group() {
                longest
            } else {
                1000.0 + longest
            }
        }
        Strategy::DifficultyBalanced => {
            let d = exposure::difficulty(candidate.magnitude(), bortle, base);
            1.0 - 2.0 * (d - 0.5).abs()
        }
    }
}

fn longest_window_hours(candidate: &Candidate<'_>, config: &PlannerConfig) -> f64 {
    candidate
        .windows(config.scheduling.exclude_insufficient_time)
        .iter()
        .map(|w| w.duration_hours().value())
        .fold(0.0, f64::max)
}

/// Selection order. `max_objects` packs by earliest finish time (classic
/// greedy interval scheduling); every other strategy goes score-descending.
/// Ties resolve by earlier window start, then lexical identity, so repeated
/// runs on identical inputs produce identical schedules.
fn order_candidates<'a>(
    mut scored: Vec<(f64, Candidate<'a>)>,
    strategy: Strategy,
    config: &PlannerConfig,
) -> Vec<(f64, Candidate<'a>)> {
    let exclude = config.scheduling.exclude_insufficient_time;
    let earliest_start = |c: &Candidate<'a>| {
        c.windows(exclude)
            .first()
            .map(|w| w.period.start.value())
            .unwrap_or(f64::INFINITY)
    };
    let earliest_finish = |c: &Candidate<'a>| {
        c.windows(exclude)
            .iter()
            .map(|w| w.period.stop.value())
            .fold(f64::INFINITY, f64::min)
    };

    scored.sort_by(|(score_a, a), (score_b, b)| {
        let primary = match strategy {
            Strategy::MaxObjects => earliest_finish(a)
                .partial_cmp(&earliest_finish(b))
                .unwrap_or(std::cmp::Ordering::Equal),
            _ => score_b
                .partial_cmp(score_a)
                .unwrap_or(std::cmp::Ordering::Equal),
        };
        primary
            .then_with(|| {
                earliest_start(a)
                    .partial_cmp(&earliest_start(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.id().cmp(b.id()))
    });
    scored
}

/// Slot length: the required exposure for the candidate, capped by its
/// longest window so a feasible placement always exists somewhere.
fn slot_duration_days(
    candidate: &Candidate<'_>,
    windows: &[ObservationWindow],
    config: &PlannerConfig,
) -> f64 {
    let required = exposure::required_exposure_hours(
        candidate.magnitude(),
        config.location.bortle_index,
        config.imaging.base_exposure_hours,
    );
    let longest = windows
        .iter()
        .map(|w| w.duration_hours().value())
        .fold(0.0, f64::max);
    required.value().min(longest) / 24.0
}

/// Find the earliest placement of a `slot_days` slot inside one of the
/// windows such that overlap with every existing entry stays within the
/// tolerance. Returns the period and whether it was shifted off the window
/// start to resolve a conflict.
fn place(
    windows: &[ObservationWindow],
    slot_days: f64,
    max_overlap_minutes: f64,
    entries: &[ScheduleEntry],
) -> Option<(Period, bool)> {
    if slot_days <= 0.0 {
        return None;
    }
    let tolerance_days = max_overlap_minutes / 1440.0;

    for window in windows {
        let mut start = window.period.start.value();
        let latest_start = window.period.stop.value() - slot_days;
        // Each conflicting entry pushes the slot right at most once, so this
        // terminates after at most entries.len() shifts.
        'search: while start <= latest_start + 1e-12 {
            let candidate_period = Period::from_mjd(start, start + slot_days);
            for entry in entries {
                if candidate_period.overlap_minutes(&entry.period) > max_overlap_minutes + 1e-9 {
                    // Shift to where the overlap with this entry shrinks to
                    // the tolerance
                    start = entry.period.stop.value() - tolerance_days;
                    continue 'search;
                }
            }
            let shifted = start > window.period.start.value() + 1e-12;
            return Some((candidate_period, shifted));
        }
    }
    None
}
