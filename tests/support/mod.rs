//! Shared synthetic ephemeris providers for integration tests.

use nightplan::api::{Equatorial, Horizontal, ModifiedJulianDate, Period};
use nightplan::config::TwilightType;
use nightplan::ephemeris::{EphemerisProvider, EphemerisResult};
use nightplan::models::{CelestialTarget, FieldOfView};

/// A fully scriptable sky. Defaults: every target well placed all night,
/// new moon far from everything, sun deep below the horizon.
pub struct SyntheticSky {
    /// Twilight-to-twilight night interval returned for every date
    pub night: Period,
    /// When set, targets are above the horizon only inside this interval
    pub visible: Option<Period>,
    /// Piecewise sun altitude; first matching interval wins
    pub sun_zones: Vec<(Period, f64)>,
    pub default_sun_altitude: f64,
    pub moon: Equatorial,
    pub illumination: f64,
}

impl Default for SyntheticSky {
    fn default() -> Self {
        Self {
            night: Period::from_mjd(61055.8, 61056.3),
            visible: None,
            sun_zones: Vec::new(),
            default_sun_altitude: -25.0,
            moon: Equatorial::from_degrees(270.0, -25.0),
            illumination: 0.03,
        }
    }
}

impl EphemerisProvider for SyntheticSky {
    fn target_horizontal(
        &self,
        _coordinates: Equatorial,
        at: ModifiedJulianDate,
    ) -> EphemerisResult<Horizontal> {
        let altitude = match &self.visible {
            Some(period) if !period.contains(at) => 5.0,
            _ => 55.0,
        };
        Ok(Horizontal::new(
            qtty::Degrees::new(altitude),
            qtty::Degrees::new(180.0),
        ))
    }

    fn sun_altitude(&self, at: ModifiedJulianDate) -> EphemerisResult<qtty::Degrees> {
        let altitude = self
            .sun_zones
            .iter()
            .find(|(period, _)| period.contains(at))
            .map(|&(_, altitude)| altitude)
            .unwrap_or(self.default_sun_altitude);
        Ok(qtty::Degrees::new(altitude))
    }

    fn moon_equatorial(&self, _at: ModifiedJulianDate) -> EphemerisResult<Equatorial> {
        Ok(self.moon)
    }

    fn moon_illumination(&self, _at: ModifiedJulianDate) -> EphemerisResult<f64> {
        Ok(self.illumination)
    }

    fn twilight_bounds(
        &self,
        _date: chrono::NaiveDate,
        _twilight: TwilightType,
    ) -> EphemerisResult<Option<Period>> {
        Ok(Some(self.night))
    }
}

pub fn target(id: &str, ra: f64, dec: f64, magnitude: f64) -> CelestialTarget {
    CelestialTarget::new(
        id,
        id,
        Equatorial::from_degrees(ra, dec),
        magnitude,
        FieldOfView::from_degrees(0.5, 0.4),
    )
}

pub fn planning_date() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
}
