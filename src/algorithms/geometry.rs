//! Spherical geometry utilities: great-circle separation and field-of-view
//! bounding-box fitting.

use serde::{Deserialize, Serialize};

use crate::api::Equatorial;
use crate::models::FieldOfView;

/// Sky extent of a set of coordinates, RA span corrected to true angular
/// degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldExtent {
    /// True angular width (RA span scaled by cos of the widest declination)
    pub ra_span: qtty::Degrees,
    pub dec_span: qtty::Degrees,
}

impl FieldExtent {
    pub fn fits(&self, fov: &FieldOfView) -> bool {
        self.ra_span.value() <= fov.width.value() && self.dec_span.value() <= fov.height.value()
    }
}

/// Great-circle angular separation via the haversine formula, numerically
/// stable near 0 and 180 degrees. Symmetric; 0 for identical coordinates,
/// 180 for antipodal ones.
pub fn angular_separation(a: Equatorial, b: Equatorial) -> qtty::Degrees {
    let d_dec = qtty::Degrees::new(b.dec.value() - a.dec.value());
    let d_ra = qtty::Degrees::new(b.ra.value() - a.ra.value());

    let sin_half_dec = qtty::Degrees::new(d_dec.value() / 2.0).sin();
    let sin_half_ra = qtty::Degrees::new(d_ra.value() / 2.0).sin();

    let h = sin_half_dec * sin_half_dec + a.dec.cos() * b.dec.cos() * sin_half_ra * sin_half_ra;
    let separation_rad = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();
    qtty::Radians::new(separation_rad).to()
}

/// RA/Dec bounding box of a set of coordinates.
///
/// The RA span is the minimal arc covering all right ascensions, so a set
/// straddling 0h/24h does not blow up to nearly 360 degrees. The span is then
/// scaled by cos(dec) at the box declination nearest the equator, where RA
/// degrees are widest on the sky, giving a conservative true-angle width.
pub fn bounding_box(coords: &[Equatorial]) -> FieldExtent {
    if coords.is_empty() {
        return FieldExtent {
            ra_span: qtty::Degrees::new(0.0),
            dec_span: qtty::Degrees::new(0.0),
        };
    }

    let mut dec_min = f64::INFINITY;
    let mut dec_max = f64::NEG_INFINITY;
    for c in coords {
        dec_min = dec_min.min(c.dec.value());
        dec_max = dec_max.max(c.dec.value());
    }

    let ra_span_raw = minimal_ra_arc(coords);

    // Widest point of the box: declination closest to the equator
    let widest_dec = if dec_min <= 0.0 && dec_max >= 0.0 {
        0.0
    } else {
        dec_min.abs().min(dec_max.abs())
    };
    let ra_span = ra_span_raw * qtty::Degrees::new(widest_dec).cos();

    FieldExtent {
        ra_span: qtty::Degrees::new(ra_span),
        dec_span: qtty::Degrees::new(dec_max - dec_min),
    }
}

/// Whether the declination-corrected bounding box of `coords` fits inside a
/// rectangular field of view.
pub fn fits_within_fov(coords: &[Equatorial], fov: &FieldOfView) -> bool {
    bounding_box(coords).fits(fov)
}

/// Centroid of a coordinate set: circular mean in RA (wrap-safe), arithmetic
/// mean in Dec.
pub fn centroid(coords: &[Equatorial]) -> Equatorial {
    if coords.is_empty() {
        return Equatorial::from_degrees(0.0, 0.0);
    }
    let (mut sin_sum, mut cos_sum, mut dec_sum) = (0.0, 0.0, 0.0);
    for c in coords {
        sin_sum += c.ra.sin();
        cos_sum += c.ra.cos();
        dec_sum += c.dec.value();
    }
    let ra = qtty::Radians::new(sin_sum.atan2(cos_sum))
        .to::<qtty::Deg>()
        .wrap_pos();
    Equatorial::new(ra, qtty::Degrees::new(dec_sum / coords.len() as f64))
}

/// Minimal RA arc (degrees) covering all coordinates: 360 minus the largest
/// gap between consecutive sorted right ascensions.
fn minimal_ra_arc(coords: &[Equatorial]) -> f64 {
    if coords.len() < 2 {
        return 0.0;
    }
    let mut ras: Vec<f64> = coords
        .iter()
        .map(|c| c.ra.wrap_pos().value())
        .collect();
    ras.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut largest_gap = 360.0 - (ras[ras.len() - 1] - ras[0]);
    for pair in ras.windows(2) {
        largest_gap = largest_gap.max(pair[1] - pair[0]);
    }
    360.0 - largest_gap
}
