//! Ephemeris provider boundary.
//!
//! Body positions, moon illumination and twilight bounds come from an
//! external provider behind the [`EphemerisProvider`] trait; refraction and
//! precision-mode refinements are opaque to the engine. The
//! [`MemoizedEphemeris`] wrapper adds an explicit per-run cache keyed by
//! `(body, rounded instant)` so repeated queries within one pipeline run are
//! answered once. Cache absence never changes results, only speed.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::api::{Equatorial, Horizontal, ModifiedJulianDate, Period};
use crate::config::TwilightType;
use crate::error::EphemerisError;

pub type EphemerisResult<T> = Result<T, EphemerisError>;

/// External ephemeris computation for one telescope/location pair.
///
/// Implementations are synchronous; the pipeline never blocks on I/O
/// mid-computation.
pub trait EphemerisProvider {
    /// Horizontal position of a fixed RA/Dec target at an instant, for the
    /// provider's configured site.
    fn target_horizontal(
        &self,
        coordinates: Equatorial,
        at: ModifiedJulianDate,
    ) -> EphemerisResult<Horizontal>;

    /// Sun altitude above the horizon at an instant.
    fn sun_altitude(&self, at: ModifiedJulianDate) -> EphemerisResult<qtty::Degrees>;

    /// Moon position in equatorial coordinates at an instant.
    fn moon_equatorial(&self, at: ModifiedJulianDate) -> EphemerisResult<Equatorial>;

    /// Moon illumination fraction at an instant (0 = new, 1 = full).
    fn moon_illumination(&self, at: ModifiedJulianDate) -> EphemerisResult<f64>;

    /// Twilight-to-twilight night bounds for a calendar date, as one
    /// continuous interval (which may cross local midnight), or `None` when
    /// the sun never drops below the threshold (polar summer).
    fn twilight_bounds(
        &self,
        date: chrono::NaiveDate,
        twilight: TwilightType,
    ) -> EphemerisResult<Option<Period>>;
}

/// Instant rounded to the memoization grid (milliseconds of MJD).
fn grid_key(at: ModifiedJulianDate) -> i64 {
    (at.value() * 86_400_000.0).round() as i64
}

fn coord_key(c: Equatorial) -> (i64, i64) {
    // Micro-degree resolution, far below any sampling step
    (
        (c.ra.value() * 1e6).round() as i64,
        (c.dec.value() * 1e6).round() as i64,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BodyKey {
    Target { ra: i64, dec: i64 },
    Sun,
    Moon,
    MoonIllumination,
}

#[derive(Debug, Clone, Copy)]
enum CachedValue {
    Horizontal(Horizontal),
    Degrees(f64),
    Equatorial(Equatorial),
    Fraction(f64),
}

/// Per-run memoization wrapper around any provider. Scoped to one pipeline
/// run; construct a fresh one per run to keep runs independent.
pub struct MemoizedEphemeris<P> {
    inner: P,
    cache: RwLock<HashMap<(BodyKey, i64), CachedValue>>,
}

impl<P: EphemerisProvider> MemoizedEphemeris<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn into_inner(self) -> P {
        self.inner
    }

    /// Number of memoized entries, exposed for cache-behavior tests.
    pub fn cached_entries(&self) -> usize {
        self.cache.read().len()
    }

    fn lookup(&self, key: (BodyKey, i64)) -> Option<CachedValue> {
        self.cache.read().get(&key).copied()
    }

    fn store(&self, key: (BodyKey, i64), value: CachedValue) {
        self.cache.write().insert(key, value);
    }
}

impl<P: EphemerisProvider> EphemerisProvider for MemoizedEphemeris<P> {
    fn target_horizontal(
        &self,
        coordinates: Equatorial,
        at: ModifiedJulianDate,
    ) -> EphemerisResult<Horizontal> {
        let (ra, dec) = coord_key(coordinates);
        let key = (BodyKey::Target { ra, dec }, grid_key(at));
        if let Some(CachedValue::Horizontal(h)) = self.lookup(key) {
            return Ok(h);
        }
        let h = self.inner.target_horizontal(coordinates, at)?;
        self.store(key, CachedValue::Horizontal(h));
        Ok(h)
    }

    fn sun_altitude(&self, at: ModifiedJulianDate) -> EphemerisResult<qtty::Degrees> {
        let key = (BodyKey::Sun, grid_key(at));
        if let Some(CachedValue::Degrees(d)) = self.lookup(key) {
            return Ok(qtty::Degrees::new(d));
        }
        let altitude = self.inner.sun_altitude(at)?;
        self.store(key, CachedValue::Degrees(altitude.value()));
        Ok(altitude)
    }

    fn moon_equatorial(&self, at: ModifiedJulianDate) -> EphemerisResult<Equatorial> {
        let key = (BodyKey::Moon, grid_key(at));
        if let Some(CachedValue::Equatorial(e)) = self.lookup(key) {
            return Ok(e);
        }
        let position = self.inner.moon_equatorial(at)?;
        self.store(key, CachedValue::Equatorial(position));
        Ok(position)
    }

    fn moon_illumination(&self, at: ModifiedJulianDate) -> EphemerisResult<f64> {
        let key = (BodyKey::MoonIllumination, grid_key(at));
        if let Some(CachedValue::Fraction(f)) = self.lookup(key) {
            return Ok(f);
        }
        let fraction = self.inner.moon_illumination(at)?;
        self.store(key, CachedValue::Fraction(fraction));
        Ok(fraction)
    }

    fn twilight_bounds(
        &self,
        date: chrono::NaiveDate,
        twilight: TwilightType,
    ) -> EphemerisResult<Option<Period>> {
        // Once per night; not worth a cache slot
        self.inner.twilight_bounds(date, twilight)
    }
}

impl<P: EphemerisProvider + ?Sized> EphemerisProvider for &P {
    fn target_horizontal(
        &self,
        coordinates: Equatorial,
        at: ModifiedJulianDate,
    ) -> EphemerisResult<Horizontal> {
        (**self).target_horizontal(coordinates, at)
    }

    fn sun_altitude(&self, at: ModifiedJulianDate) -> EphemerisResult<qtty::Degrees> {
        (**self).sun_altitude(at)
    }

    fn moon_equatorial(&self, at: ModifiedJulianDate) -> EphemerisResult<Equatorial> {
        (**self).moon_equatorial(at)
    }

    fn moon_illumination(&self, at: ModifiedJulianDate) -> EphemerisResult<f64> {
        (**self).moon_illumination(at)
    }

    fn twilight_bounds(
        &self,
        date: chrono::NaiveDate,
        twilight: TwilightType,
    ) -> EphemerisResult<Option<Period>> {
        (**self).twilight_bounds(date, twilight)
    }
}
