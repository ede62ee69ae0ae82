//! Astrophotography session planning engine.
//!
//! Given a target catalog, an observing site and a date, the engine computes
//! per-night visibility windows, annotates moon interference, groups nearby
//! targets into mosaic compositions, and builds a conflict-free observation
//! schedule under a selectable strategy. A weekly aggregation mode scores
//! representative nights across a date range for long-horizon planning.
//!
//! Astronomical positions come from an external provider behind the
//! [`ephemeris::EphemerisProvider`] trait; the engine itself is pure and
//! deterministic: identical inputs produce byte-identical schedules.
//!
//! Entry points: [`services::plan_night`] for one night,
//! [`services::aggregate_weeks`] for a date range.

pub mod algorithms;
pub mod api;
pub mod config;
pub mod ephemeris;
pub mod error;
pub mod models;
pub mod services;

pub use config::PlannerConfig;
pub use error::{PlannerError, PlannerResult};
