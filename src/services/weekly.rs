//! Weekly aggregation.
//!
//! Long-horizon planning mode: the full nightly pipeline runs once per
//! representative night per ISO week across a date range, and each outcome
//! is scored with configurable weights so a user can pick the most promising
//! weeks before planning individual nights. An ephemeris failure skips the
//! affected night with a warning; it never aborts the run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::ModifiedJulianDate;
use crate::config::PlannerConfig;
use crate::ephemeris::EphemerisProvider;
use crate::error::{PlannerError, PlannerResult};
use crate::models::{CelestialTarget, Night};
use crate::services::pipeline;

/// ISO week key: (ISO year, week number). The year disambiguates week 1
/// spanning a calendar year boundary.
pub type WeekKey = (i32, u32);

/// Aggregated outlook for one week, computed from its representative night.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub iso_year: i32,
    pub iso_week: u32,
    /// First night of the week inside the requested range
    pub representative_date: chrono::NaiveDate,
    pub observable_count: usize,
    /// Observable targets with at least one moon-free window
    pub moon_free_count: usize,
    pub group_count: usize,
    /// Groups with at least one moon-free simultaneous window
    pub moon_free_group_count: usize,
    /// Entries the scheduler placed on the representative night
    pub scheduled_count: usize,
    pub scheduled_hours: f64,
    /// Twilight-to-twilight darkness duration
    pub night_hours: f64,
    /// Moon illumination fraction at the middle of the night
    pub moon_illumination: f64,
    pub score: f64,
}

/// Score one representative night's outlook per the configured weights.
///
/// A night where the sun never sets scores the empty outlook: zero counts,
/// zero hours, no moon penalty.
pub fn aggregate_weeks(
    targets: &[CelestialTarget],
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    config: &PlannerConfig,
    provider: &impl EphemerisProvider,
) -> PlannerResult<BTreeMap<WeekKey, WeeklySummary>> {
    use chrono::Datelike;

    config.validate()?;

    let mut summaries: BTreeMap<WeekKey, WeeklySummary> = BTreeMap::new();
    let mut date = start;
    while date <= end {
        let week = date.iso_week();
        let key = (week.year(), week.week());
        if !summaries.contains_key(&key) {
            match summarize_night(targets, date, config, provider) {
                Ok(summary) => {
                    summaries.insert(key, summary);
                }
                Err(PlannerError::Ephemeris(err)) => {
                    log::warn!(
                        "week {}-W{:02}: skipping night {date}: {err}",
                        key.0,
                        key.1
                    );
                }
                Err(err) => return Err(err),
            }
        }
        date += chrono::Duration::days(1);
    }
    Ok(summaries)
}

/// Run the full nightly pipeline for one representative date and reduce the
/// plan to a scored summary.
fn summarize_night(
    targets: &[CelestialTarget],
    date: chrono::NaiveDate,
    config: &PlannerConfig,
    provider: &impl EphemerisProvider,
) -> PlannerResult<WeeklySummary> {
    use chrono::Datelike;

    let week = date.iso_week();
    let Some(plan) = pipeline::plan_night(targets, date, config, provider)? else {
        return Ok(empty_summary(date));
    };

    let observable_count = plan.records.iter().filter(|r| r.is_observable()).count();
    let moon_free_count = plan
        .records
        .iter()
        .filter(|r| r.is_observable() && r.moon_free_hours().value() > 0.0)
        .count();
    let group_count = plan.groups.len();
    let moon_free_group_count = plan
        .groups
        .iter()
        .filter(|g| g.moon_free_hours().value() > 0.0)
        .count();
    let stats = plan.stats();

    let night_hours = plan.night.duration_hours().value();
    let moon_illumination = provider.moon_illumination(midpoint(&plan.night))?;

    let w = &config.weekly;
    let score = w.per_observable_object * observable_count as f64
        + w.per_moon_free_object * moon_free_count as f64
        + w.per_mosaic_group * group_count as f64
        + w.per_moon_free_group * moon_free_group_count as f64
        - w.moon_illumination_penalty * moon_illumination
        + w.per_night_hour * night_hours;

    Ok(WeeklySummary {
        iso_year: week.year(),
        iso_week: week.week(),
        representative_date: date,
        observable_count,
        moon_free_count,
        group_count,
        moon_free_group_count,
        scheduled_count: stats.scheduled_count,
        scheduled_hours: stats.total_scheduled_hours,
        night_hours,
        moon_illumination,
        score,
    })
}

fn midpoint(night: &Night) -> ModifiedJulianDate {
    let bounds = night.bounds();
    ModifiedJulianDate::new((bounds.start.value() + bounds.stop.value()) / 2.0)
}

fn empty_summary(date: chrono::NaiveDate) -> WeeklySummary {
    use chrono::Datelike;
    let week = date.iso_week();
    WeeklySummary {
        iso_year: week.year(),
        iso_week: week.week(),
        representative_date: date,
        observable_count: 0,
        moon_free_count: 0,
        group_count: 0,
        moon_free_group_count: 0,
        scheduled_count: 0,
        scheduled_hours: 0.0,
        night_hours: 0.0,
        moon_illumination: 0.0,
        score: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Equatorial, Horizontal, Period};
    use crate::config::TwilightType;
    use crate::ephemeris::EphemerisResult;
    use crate::error::EphemerisError;
    use crate::models::FieldOfView;

    /// Clear sky with a moon phase chosen per night: full moon on even MJD
    /// nights, new moon otherwise. Nights stay inside one MJD day so every
    /// sampled instant sees the same phase.
    struct PhasedSky;

    impl PhasedSky {
        fn night_start(date: chrono::NaiveDate) -> f64 {
            ModifiedJulianDate::from_date(date).value() + 0.8
        }
    }

    impl EphemerisProvider for PhasedSky {
        fn target_horizontal(
            &self,
            _coordinates: Equatorial,
            _at: ModifiedJulianDate,
        ) -> EphemerisResult<Horizontal> {
            Ok(Horizontal::new(
                qtty::Degrees::new(50.0),
                qtty::Degrees::new(180.0),
            ))
        }

        fn sun_altitude(&self, _at: ModifiedJulianDate) -> EphemerisResult<qtty::Degrees> {
            Ok(qtty::Degrees::new(-25.0))
        }

        fn moon_equatorial(&self, _at: ModifiedJulianDate) -> EphemerisResult<Equatorial> {
            Ok(Equatorial::from_degrees(180.0, 0.0))
        }

        fn moon_illumination(&self, at: ModifiedJulianDate) -> EphemerisResult<f64> {
            if (at.value().floor() as i64) % 2 == 0 {
                Ok(0.95)
            } else {
                Ok(0.05)
            }
        }

        fn twilight_bounds(
            &self,
            date: chrono::NaiveDate,
            _twilight: TwilightType,
        ) -> EphemerisResult<Option<Period>> {
            let start = Self::night_start(date);
            Ok(Some(Period::from_mjd(start, start + 0.15)))
        }
    }

    /// Fails every query from a cutoff date onward.
    struct FlakySky {
        fail_from: ModifiedJulianDate,
    }

    impl EphemerisProvider for FlakySky {
        fn target_horizontal(
            &self,
            _coordinates: Equatorial,
            _at: ModifiedJulianDate,
        ) -> EphemerisResult<Horizontal> {
            Ok(Horizontal::new(
                qtty::Degrees::new(50.0),
                qtty::Degrees::new(180.0),
            ))
        }

        fn sun_altitude(&self, _at: ModifiedJulianDate) -> EphemerisResult<qtty::Degrees> {
            Ok(qtty::Degrees::new(-25.0))
        }

        fn moon_equatorial(&self, _at: ModifiedJulianDate) -> EphemerisResult<Equatorial> {
            Ok(Equatorial::from_degrees(180.0, 0.0))
        }

        fn moon_illumination(&self, _at: ModifiedJulianDate) -> EphemerisResult<f64> {
            Ok(0.1)
        }

        fn twilight_bounds(
            &self,
            date: chrono::NaiveDate,
            _twilight: TwilightType,
        ) -> EphemerisResult<Option<Period>> {
            let start = ModifiedJulianDate::from_date(date);
            if start.value() >= self.fail_from.value() {
                return Err(EphemerisError::new("sun", start, "provider outage"));
            }
            Ok(Some(Period::from_mjd(start.value() + 0.8, start.value() + 1.2)))
        }
    }

    fn catalog() -> Vec<CelestialTarget> {
        vec![CelestialTarget::new(
            "M81",
            "Bode's Galaxy",
            Equatorial::from_degrees(148.89, 69.07),
            6.9,
            FieldOfView::from_degrees(0.45, 0.23),
        )]
    }

    #[test]
    fn test_one_summary_per_iso_week() {
        let targets = catalog();
        let config = PlannerConfig::default();
        // 2026-01-05 (week 2) through 2026-01-25 (week 4)
        let start = chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let end = chrono::NaiveDate::from_ymd_opt(2026, 1, 25).unwrap();

        let summaries = aggregate_weeks(&targets, start, end, &config, &PhasedSky).unwrap();
        assert_eq!(summaries.len(), 3);
        let weeks: Vec<u32> = summaries.keys().map(|&(_, w)| w).collect();
        assert_eq!(weeks, vec![2, 3, 4]);
        // Representative night is the first day of each week in range
        assert_eq!(
            summaries[&(2026, 2)].representative_date,
            chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
        );
        assert_eq!(
            summaries[&(2026, 3)].representative_date,
            chrono::NaiveDate::from_ymd_opt(2026, 1, 12).unwrap()
        );
        // The scheduler ran on the representative night
        assert_eq!(summaries[&(2026, 2)].scheduled_count, 1);
        assert!(summaries[&(2026, 2)].scheduled_hours > 0.0);
    }

    #[test]
    fn test_score_prefers_dark_weeks() {
        let targets = catalog();
        let config = PlannerConfig::default();
        // 2026-01-12 has MJD 61052 (even: full moon); 2026-01-19 has MJD
        // 61059 (odd: new moon)
        let full = chrono::NaiveDate::from_ymd_opt(2026, 1, 12).unwrap();
        let new = chrono::NaiveDate::from_ymd_opt(2026, 1, 19).unwrap();

        let summaries = aggregate_weeks(&targets, full, new, &config, &PhasedSky).unwrap();
        let full_week = &summaries[&(2026, 3)];
        let new_week = &summaries[&(2026, 4)];
        assert!(full_week.moon_illumination > new_week.moon_illumination);
        assert!(new_week.score > full_week.score);
    }

    #[test]
    fn test_failed_week_skipped_not_fatal() {
        let targets = catalog();
        let config = PlannerConfig::default();
        let start = chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let end = chrono::NaiveDate::from_ymd_opt(2026, 1, 25).unwrap();
        // Outage from 2026-01-19 (MJD 61059) onward kills week 4 only
        let sky = FlakySky {
            fail_from: ModifiedJulianDate::new(61059.0),
        };

        let summaries = aggregate_weeks(&targets, start, end, &config, &sky).unwrap();
        let weeks: Vec<u32> = summaries.keys().map(|&(_, w)| w).collect();
        assert_eq!(weeks, vec![2, 3]);
    }

    #[test]
    fn test_invalid_config_aborts_aggregation() {
        let targets = catalog();
        let mut config = PlannerConfig::default();
        config.scheduling.max_cluster_size = 10;
        let start = chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let result = aggregate_weeks(&targets, start, start, &config, &PhasedSky);
        assert!(result.is_err());
    }
}
