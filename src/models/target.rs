//! Catalog target model.
//!
//! The catalog itself (file formats, source merging) is an external
//! collaborator; the engine accepts targets as an in-memory sequence. What
//! lives here is the lenient interpretation of catalog fields: magnitude and
//! angular-extent descriptors arrive as loosely formatted strings in common
//! catalogs, and a single malformed record must never abort a whole run.
//! Unparseable values substitute documented defaults and log a warning.

use serde::{Deserialize, Serialize};

use crate::api::{Equatorial, TargetId};

/// Fallback magnitude when the catalog value cannot be interpreted.
pub const DEFAULT_MAGNITUDE: f64 = 12.0;

/// Fallback angular extent (degrees per side) for an unparseable size field.
pub const DEFAULT_EXTENT_DEG: f64 = 0.1;

/// Angular extent of an object or field, width x height in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldOfView {
    pub width: qtty::Degrees,
    pub height: qtty::Degrees,
}

impl FieldOfView {
    pub fn new(width: qtty::Degrees, height: qtty::Degrees) -> Self {
        Self { width, height }
    }

    pub fn from_degrees(width: f64, height: f64) -> Self {
        Self {
            width: qtty::Degrees::new(width),
            height: qtty::Degrees::new(height),
        }
    }
}

/// A fixed celestial target from the input catalog.
///
/// Immutable once loaded; the pipeline passes targets by reference and never
/// copies them across components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialTarget {
    /// Display name (e.g. "Orion Nebula")
    pub name: String,
    /// Catalog identifier (e.g. "M42")
    pub id: TargetId,
    /// Fixed ICRS coordinates
    pub coordinates: Equatorial,
    /// Apparent visual magnitude
    pub magnitude: f64,
    /// Angular extent of the object on the sky
    pub extent: FieldOfView,
    /// Mosaic panel count requested by the catalog, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_panels: Option<u32>,
}

impl CelestialTarget {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        coordinates: Equatorial,
        magnitude: f64,
        extent: FieldOfView,
    ) -> Self {
        Self {
            name: name.into(),
            id: TargetId::new(id),
            coordinates,
            magnitude,
            extent,
            required_panels: None,
        }
    }

    /// Build a target from raw catalog strings, recovering from malformed
    /// magnitude or size fields by substituting defaults.
    pub fn from_catalog_fields(
        id: impl Into<String>,
        name: impl Into<String>,
        coordinates: Equatorial,
        magnitude: &str,
        size: &str,
    ) -> Self {
        let id = TargetId::new(id);
        let magnitude_value = parse_magnitude(magnitude).unwrap_or_else(|| {
            log::warn!(
                "target {}: unparseable magnitude {:?}, using default {}",
                id,
                magnitude,
                DEFAULT_MAGNITUDE
            );
            DEFAULT_MAGNITUDE
        });
        let extent = parse_extent(size).unwrap_or_else(|| {
            log::warn!(
                "target {}: unparseable size {:?}, using default {}deg",
                id,
                size,
                DEFAULT_EXTENT_DEG
            );
            FieldOfView::from_degrees(DEFAULT_EXTENT_DEG, DEFAULT_EXTENT_DEG)
        });
        Self {
            name: name.into(),
            id,
            coordinates,
            magnitude: magnitude_value,
            extent,
            required_panels: None,
        }
    }
}

/// Parse a catalog magnitude field. Accepts plain numbers with surrounding
/// whitespace; anything else is `None`.
pub fn parse_magnitude(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

/// Parse an angular-size descriptor such as `"85' x 60'"`, `"1.5° x 1°"` or
/// `"30\""`. A single dimension is treated as a square extent. Units default
/// to arcminutes when omitted, the convention of most deep-sky catalogs.
pub fn parse_extent(raw: &str) -> Option<FieldOfView> {
    let cleaned = raw.trim().to_lowercase();
    if cleaned.is_empty() {
        return None;
    }

    let parts: Vec<&str> = cleaned
        .split(['x', '×'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [single] => {
            let side = parse_angle_deg(single)?;
            Some(FieldOfView::from_degrees(side, side))
        }
        [w, h] => {
            let width = parse_angle_deg(w)?;
            let height = parse_angle_deg(h)?;
            Some(FieldOfView::from_degrees(width, height))
        }
        _ => None,
    }
}

/// Parse one angular dimension with an optional unit suffix into degrees.
fn parse_angle_deg(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let (number, scale) = if let Some(n) = s.strip_suffix("°").or_else(|| s.strip_suffix("deg")) {
        (n, 1.0)
    } else if let Some(n) = s.strip_suffix("''").or_else(|| s.strip_suffix('"')) {
        (n, 1.0 / 3600.0)
    } else if let Some(n) = s.strip_suffix('\'').or_else(|| s.strip_suffix('m')) {
        (n, 1.0 / 60.0)
    } else {
        // Bare number: arcminutes
        (s, 1.0 / 60.0)
    };
    let value: f64 = number.trim().parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value * scale)
}
