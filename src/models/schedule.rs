//! Schedule result model and the uniform candidate interface.

use serde::{Deserialize, Serialize};

use crate::api::{Equatorial, Period};
use crate::config::Strategy;
use crate::models::{MosaicGroup, Night, ObservationWindow, VisibilityRecord};

/// What the scheduler sees: a standalone target or a mosaic group behind one
/// shared accessor surface. Replaces the duck-typing of composite objects
/// with a closed tagged variant.
#[derive(Debug, Clone, Copy)]
pub enum Candidate<'a> {
    Standalone(&'a VisibilityRecord<'a>),
    Grouped(&'a MosaicGroup<'a>),
}

impl<'a> Candidate<'a> {
    pub fn id(&self) -> &str {
        match self {
            Candidate::Standalone(r) => r.target.id.as_str(),
            Candidate::Grouped(g) => &g.id,
        }
    }

    pub fn position(&self) -> Equatorial {
        match self {
            Candidate::Standalone(r) => r.target.coordinates,
            Candidate::Grouped(g) => g.centroid,
        }
    }

    pub fn magnitude(&self) -> f64 {
        match self {
            Candidate::Standalone(r) => r.target.magnitude,
            Candidate::Grouped(g) => g.combined_magnitude,
        }
    }

    /// Candidate windows honoring the insufficient-time policy. Groups are
    /// candidates under the same contract as single targets, so their
    /// simultaneous windows pass through the same filter.
    pub fn windows(&self, exclude_insufficient: bool) -> Vec<ObservationWindow> {
        match self {
            Candidate::Standalone(r) => r.schedulable_windows(exclude_insufficient),
            Candidate::Grouped(g) => g.schedulable_windows(exclude_insufficient),
        }
    }

    pub fn moon_free_hours(&self) -> qtty::Hours {
        match self {
            Candidate::Standalone(r) => r.moon_free_hours(),
            Candidate::Grouped(g) => g.moon_free_hours(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Candidate::Grouped(_))
    }

    /// Number of targets captured by scheduling this candidate.
    pub fn size(&self) -> usize {
        match self {
            Candidate::Standalone(_) => 1,
            Candidate::Grouped(g) => g.size(),
        }
    }
}

/// Kind tag carried into the owned schedule output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    Standalone,
    Mosaic,
}

/// One assigned slot in the night's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Candidate identity (target id or mosaic group id)
    pub id: String,
    pub kind: CandidateKind,
    /// Assigned observation interval
    pub period: Period,
    /// Strategy-specific score the slot was won with
    pub score: f64,
    /// The slot was time-shifted off its preferred start to resolve a
    /// conflict (never silently truncated)
    pub shifted: bool,
}

/// Summary statistics over a built schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleStats {
    pub total_candidates: usize,
    pub scheduled_count: usize,
    pub rejected_count: usize,
    pub scheduling_rate: f64,
    pub mosaic_count: usize,
    pub total_scheduled_hours: f64,
    pub mean_score: f64,
}

/// Ordered, conflict-free schedule for one night. Immutable result object;
/// rendering and report text are downstream concerns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub strategy: Strategy,
    pub night: Night,
    /// Entries in chronological order by start time
    pub entries: Vec<ScheduleEntry>,
    /// SHA-256 fingerprint of the entries; identical inputs yield identical
    /// fingerprints
    pub checksum: String,
}

impl Schedule {
    pub fn new(strategy: Strategy, night: Night, mut entries: Vec<ScheduleEntry>) -> Self {
        entries.sort_by(|a, b| {
            a.period
                .start
                .value()
                .partial_cmp(&b.period.start.value())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        let checksum = compute_entries_checksum(&entries);
        Self {
            strategy,
            night,
            entries,
            checksum,
        }
    }

    /// An explicitly empty schedule: the valid outcome for a night with zero
    /// observable candidates.
    pub fn empty(strategy: Strategy, night: Night) -> Self {
        Self::new(strategy, night, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self, total_candidates: usize) -> ScheduleStats {
        let scheduled_count = self.entries.len();
        let mosaic_count = self
            .entries
            .iter()
            .filter(|e| e.kind == CandidateKind::Mosaic)
            .count();
        let total_scheduled_hours: f64 = self
            .entries
            .iter()
            .map(|e| e.period.duration_hours().value())
            .sum();
        let mean_score = if scheduled_count > 0 {
            self.entries.iter().map(|e| e.score).sum::<f64>() / scheduled_count as f64
        } else {
            0.0
        };
        ScheduleStats {
            total_candidates,
            scheduled_count,
            rejected_count: total_candidates.saturating_sub(scheduled_count),
            scheduling_rate: if total_candidates > 0 {
                scheduled_count as f64 / total_candidates as f64
            } else {
                0.0
            },
            mosaic_count,
            total_scheduled_hours,
            mean_score,
        }
    }
}

/// Compute a checksum over the canonical JSON serialization of the entries.
fn compute_entries_checksum(entries: &[ScheduleEntry]) -> String {
    use sha2::{Digest, Sha256};
    let json = serde_json::to_string(entries).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    hex::encode(hasher.finalize())
}
