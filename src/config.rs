//! Run configuration.
//!
//! One `PlannerConfig` value is constructed per run (directly or from TOML),
//! validated up front, and threaded by reference through every pipeline entry
//! point. Nothing reads ambient state mid-run.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigError;
use crate::models::FieldOfView;

/// Sun-depression threshold defining "night" for visibility purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TwilightType {
    Civil,
    Nautical,
    #[default]
    Astronomical,
}

impl TwilightType {
    /// Sun altitude below which this twilight type counts as night.
    /// Looked up per call; downstream window durations and object counts
    /// depend entirely on this value.
    pub fn sun_altitude_threshold(&self) -> qtty::Degrees {
        match self {
            TwilightType::Civil => qtty::Degrees::new(-6.0),
            TwilightType::Nautical => qtty::Degrees::new(-12.0),
            TwilightType::Astronomical => qtty::Degrees::new(-18.0),
        }
    }
}

impl FromStr for TwilightType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "civil" => Ok(TwilightType::Civil),
            "nautical" => Ok(TwilightType::Nautical),
            "astronomical" => Ok(TwilightType::Astronomical),
            other => Err(ConfigError::UnknownTwilightType(other.to_string())),
        }
    }
}

/// Schedule-construction strategy. Closed set; scoring and packing order are
/// selected once at schedule-build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Maximize the count of scheduled candidates
    #[default]
    MaxObjects,
    /// Prefer the longest non-conflicting windows
    LongestDuration,
    /// Favor imaging quality: magnitude, sky darkness, moon-free time
    OptimalSnr,
    /// Prioritize mosaic groups over standalone targets
    MosaicGroups,
    /// Prefer standalone targets; groups only fill idle time
    MinimalMosaic,
    /// Mix faint/hard targets with easy/bright ones
    DifficultyBalanced,
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "max_objects" => Ok(Strategy::MaxObjects),
            "longest_duration" => Ok(Strategy::LongestDuration),
            "optimal_snr" => Ok(Strategy::OptimalSnr),
            "mosaic_groups" => Ok(Strategy::MosaicGroups),
            "minimal_mosaic" => Ok(Strategy::MinimalMosaic),
            "difficulty_balanced" => Ok(Strategy::DifficultyBalanced),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Observing site and pointing limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub longitude: f64,
    /// IANA timezone name, carried for downstream presentation
    #[serde(default)]
    pub timezone: String,
    pub min_altitude: qtty::Degrees,
    pub max_altitude: qtty::Degrees,
    pub min_azimuth: qtty::Degrees,
    pub max_azimuth: qtty::Degrees,
    /// Bortle sky-darkness index, 1 (dark) to 9 (inner city)
    pub bortle_index: u8,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            timezone: String::new(),
            min_altitude: qtty::Degrees::new(20.0),
            max_altitude: qtty::Degrees::new(90.0),
            min_azimuth: qtty::Degrees::new(0.0),
            max_azimuth: qtty::Degrees::new(360.0),
            bortle_index: 4,
        }
    }
}

/// Visibility sampling policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityConfig {
    /// Windows shorter than this are flagged insufficient
    pub min_visibility_hours: f64,
    /// Trajectory sampling step
    pub trajectory_interval_minutes: f64,
    pub twilight_type: TwilightType,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            min_visibility_hours: 2.0,
            trajectory_interval_minutes: 5.0,
            twilight_type: TwilightType::Astronomical,
        }
    }
}

/// Instrument fields of view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagingConfig {
    /// Single-exposure field
    pub native_fov: FieldOfView,
    /// Stitched multi-panel field, larger than native
    pub mosaic_fov: FieldOfView,
    /// Baseline integration time for a magnitude-10 object under Bortle 4
    pub base_exposure_hours: f64,
}

impl Default for ImagingConfig {
    fn default() -> Self {
        Self {
            native_fov: FieldOfView::from_degrees(2.3, 1.7),
            mosaic_fov: FieldOfView::from_degrees(4.7, 3.5),
            base_exposure_hours: 1.0,
        }
    }
}

/// Schedule-construction policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingConfig {
    pub strategy: Strategy,
    /// Two entries may overlap by at most this much
    pub max_overlap_minutes: f64,
    /// Drop insufficient-time windows from scheduling candidates
    pub exclude_insufficient_time: bool,
    /// Upper bound on mosaic cluster size (2..=6)
    pub max_cluster_size: usize,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::MaxObjects,
            max_overlap_minutes: 0.0,
            exclude_insufficient_time: false,
            max_cluster_size: 6,
        }
    }
}

/// Moon-interference exclusion radii per illumination bucket.
///
/// Empirically chosen breakpoints preserved as configurable constants; the
/// radius grows monotonically with illumination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoonThresholds {
    /// Illumination < 10%
    pub below_10_deg: f64,
    /// 10% to 30%
    pub from_10_deg: f64,
    /// 30% to 50%
    pub from_30_deg: f64,
    /// 50% to 70%
    pub from_50_deg: f64,
    /// 70% to 90%
    pub from_70_deg: f64,
    /// >= 90%
    pub from_90_deg: f64,
}

impl Default for MoonThresholds {
    fn default() -> Self {
        Self {
            below_10_deg: 20.0,
            from_10_deg: 30.0,
            from_30_deg: 45.0,
            from_50_deg: 60.0,
            from_70_deg: 90.0,
            from_90_deg: 120.0,
        }
    }
}

impl MoonThresholds {
    /// Exclusion radius for a moon illumination fraction (0=new, 1=full).
    pub fn radius_for(&self, illumination: f64) -> qtty::Degrees {
        let deg = if illumination < 0.10 {
            self.below_10_deg
        } else if illumination < 0.30 {
            self.from_10_deg
        } else if illumination < 0.50 {
            self.from_30_deg
        } else if illumination < 0.70 {
            self.from_50_deg
        } else if illumination < 0.90 {
            self.from_70_deg
        } else {
            self.from_90_deg
        };
        qtty::Degrees::new(deg)
    }
}

/// Weights for the weekly aggregation score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyScoreWeights {
    pub per_observable_object: f64,
    pub per_moon_free_object: f64,
    pub per_mosaic_group: f64,
    pub per_moon_free_group: f64,
    /// Multiplied by the moon illumination fraction and subtracted
    pub moon_illumination_penalty: f64,
    pub per_night_hour: f64,
}

impl Default for WeeklyScoreWeights {
    fn default() -> Self {
        Self {
            per_observable_object: 2.0,
            per_moon_free_object: 10.0,
            per_mosaic_group: 15.0,
            per_moon_free_group: 25.0,
            moon_illumination_penalty: 50.0,
            per_night_hour: 5.0,
        }
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub visibility: VisibilityConfig,
    #[serde(default)]
    pub imaging: ImagingConfig,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub moon: MoonThresholds,
    #[serde(default)]
    pub weekly: WeeklyScoreWeights,
}

impl PlannerConfig {
    /// Parse a configuration from TOML and validate it.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: PlannerConfig =
            toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the whole configuration. Called once at pipeline start;
    /// any failure aborts the run before per-night computation begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let loc = &self.location;
        if !(-90.0..=90.0).contains(&loc.latitude) {
            return Err(ConfigError::LatitudeOutOfRange(loc.latitude));
        }
        if !(-180.0..=180.0).contains(&loc.longitude) {
            return Err(ConfigError::LongitudeOutOfRange(loc.longitude));
        }
        if !(1..=9).contains(&loc.bortle_index) {
            return Err(ConfigError::BortleOutOfRange(loc.bortle_index));
        }
        if loc.min_altitude.value() > loc.max_altitude.value() {
            return Err(ConfigError::InconsistentBounds {
                axis: "altitude",
                min: loc.min_altitude.value(),
                max: loc.max_altitude.value(),
            });
        }
        if loc.min_azimuth.value() > loc.max_azimuth.value() {
            return Err(ConfigError::InconsistentBounds {
                axis: "azimuth",
                min: loc.min_azimuth.value(),
                max: loc.max_azimuth.value(),
            });
        }
        if self.visibility.trajectory_interval_minutes <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "trajectory_interval_minutes",
                value: self.visibility.trajectory_interval_minutes,
            });
        }
        if self.visibility.min_visibility_hours < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "min_visibility_hours",
                value: self.visibility.min_visibility_hours,
            });
        }
        for (field, value) in [
            ("native_fov.width", self.imaging.native_fov.width.value()),
            ("native_fov.height", self.imaging.native_fov.height.value()),
            ("mosaic_fov.width", self.imaging.mosaic_fov.width.value()),
            ("mosaic_fov.height", self.imaging.mosaic_fov.height.value()),
            ("base_exposure_hours", self.imaging.base_exposure_hours),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.scheduling.max_overlap_minutes < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "max_overlap_minutes",
                value: self.scheduling.max_overlap_minutes,
            });
        }
        if !(2..=6).contains(&self.scheduling.max_cluster_size) {
            return Err(ConfigError::ClusterSizeOutOfRange(
                self.scheduling.max_cluster_size,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PlannerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_twilight_thresholds() {
        assert_eq!(TwilightType::Civil.sun_altitude_threshold().value(), -6.0);
        assert_eq!(
            TwilightType::Nautical.sun_altitude_threshold().value(),
            -12.0
        );
        assert_eq!(
            TwilightType::Astronomical.sun_altitude_threshold().value(),
            -18.0
        );
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "mosaic_groups".parse::<Strategy>().unwrap(),
            Strategy::MosaicGroups
        );
        assert!(matches!(
            "best_effort".parse::<Strategy>(),
            Err(ConfigError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_twilight_from_str() {
        assert_eq!(
            "Astronomical".parse::<TwilightType>().unwrap(),
            TwilightType::Astronomical
        );
        assert!("dusk".parse::<TwilightType>().is_err());
    }

    #[test]
    fn test_inverted_altitude_bounds_rejected() {
        let mut config = PlannerConfig::default();
        config.location.min_altitude = qtty::Degrees::new(80.0);
        config.location.max_altitude = qtty::Degrees::new(30.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InconsistentBounds {
                axis: "altitude",
                ..
            })
        ));
    }

    #[test]
    fn test_bad_bortle_rejected() {
        let mut config = PlannerConfig::default();
        config.location.bortle_index = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::BortleOutOfRange(0))
        );
    }

    #[test]
    fn test_moon_radius_buckets() {
        let thresholds = MoonThresholds::default();
        assert_eq!(thresholds.radius_for(0.05).value(), 20.0);
        assert_eq!(thresholds.radius_for(0.20).value(), 30.0);
        assert_eq!(thresholds.radius_for(0.40).value(), 45.0);
        assert_eq!(thresholds.radius_for(0.60).value(), 60.0);
        assert_eq!(thresholds.radius_for(0.80).value(), 90.0);
        assert_eq!(thresholds.radius_for(0.95).value(), 120.0);
    }

    #[test]
    fn test_from_toml_str() {
        let raw = r#"
            [location]
            latitude = 28.7624
            longitude = -17.8892
            timezone = "Atlantic/Canary"
            min_altitude = 25.0
            max_altitude = 85.0
            min_azimuth = 0.0
            max_azimuth = 360.0
            bortle_index = 3

            [visibility]
            min_visibility_hours = 1.5
            trajectory_interval_minutes = 10.0
            twilight_type = "nautical"

            [scheduling]
            strategy = "optimal_snr"
            max_overlap_minutes = 15.0
            exclude_insufficient_time = true
            max_cluster_size = 4
        "#;
        let config = PlannerConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.visibility.twilight_type, TwilightType::Nautical);
        assert_eq!(config.scheduling.strategy, Strategy::OptimalSnr);
        assert_eq!(config.scheduling.max_cluster_size, 4);
        assert_eq!(config.location.bortle_index, 3);
        // Unspecified sections fall back to defaults
        assert_eq!(config.imaging.mosaic_fov.width.value(), 4.7);
    }

    #[test]
    fn test_from_toml_rejects_invalid() {
        let raw = r#"
            [location]
            latitude = 95.0
            longitude = 0.0
            min_altitude = 20.0
            max_altitude = 90.0
            min_azimuth = 0.0
            max_azimuth = 360.0
            bortle_index = 4
        "#;
        assert!(matches!(
            PlannerConfig::from_toml_str(raw),
            Err(ConfigError::LatitudeOutOfRange(_))
        ));
    }
}
