//! Mosaic group model.

use serde::Serialize;

use crate::algorithms::geometry::{self, FieldExtent};
use crate::api::Equatorial;
use crate::models::{CelestialTarget, ObservationWindow};

/// A set of 2-6 targets whose combined footprint fits the mosaic field of
/// view, captured together as one wide-field composition.
///
/// A group satisfies the same observational contract as a single target:
/// position is the footprint centroid, magnitude is the flux-weighted
/// combination of the members, and its windows are the intersection of
/// member visibility ("simultaneous windows"). Created per night by the
/// cluster detector and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct MosaicGroup<'a> {
    /// Stable identity derived from sorted member ids, e.g. "mosaic:M42+M43"
    pub id: String,
    pub members: Vec<&'a CelestialTarget>,
    /// Declination-corrected RA/Dec extent of the member coordinates
    pub footprint: FieldExtent,
    /// Centroid of member coordinates
    pub centroid: Equatorial,
    /// Flux-weighted combined magnitude (brighter members dominate)
    pub combined_magnitude: f64,
    /// Intersection of member visibility windows, ordered by start
    pub windows: Vec<ObservationWindow>,
}

impl<'a> MosaicGroup<'a> {
    /// Assemble a group from its members and their simultaneous windows.
    /// Callers guarantee `members.len() >= 2` and non-empty windows.
    pub fn new(members: Vec<&'a CelestialTarget>, windows: Vec<ObservationWindow>) -> Self {
        let mut ids: Vec<&str> = members.iter().map(|m| m.id.as_str()).collect();
        ids.sort_unstable();
        let id = format!("mosaic:{}", ids.join("+"));

        let coords: Vec<Equatorial> = members.iter().map(|m| m.coordinates).collect();
        let footprint = geometry::bounding_box(&coords);
        let centroid = geometry::centroid(&coords);
        let combined_magnitude =
            combined_magnitude(members.iter().map(|m| m.magnitude));

        Self {
            id,
            members,
            footprint,
            centroid,
            combined_magnitude,
            windows,
        }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Simultaneous windows usable for scheduling under the
    /// exclude-insufficient policy, mirroring the standalone-record rule.
    pub fn schedulable_windows(&self, exclude_insufficient: bool) -> Vec<ObservationWindow> {
        if exclude_insufficient {
            self.windows.iter().filter(|w| w.meets_minimum).copied().collect()
        } else {
            self.windows.clone()
        }
    }

    /// Total moon-free time across the simultaneous windows.
    pub fn moon_free_hours(&self) -> qtty::Hours {
        let total: f64 = self
            .windows
            .iter()
            .filter(|w| w.moon_free)
            .map(|w| w.duration_hours().value())
            .sum();
        qtty::Hours::new(total)
    }
}

/// Flux-weighted magnitude combination: convert each magnitude to relative
/// flux, sum, and convert back. A naive arithmetic mean of magnitudes has no
/// physical meaning on the logarithmic scale.
pub fn combined_magnitude(magnitudes: impl Iterator<Item = f64>) -> f64 {
    let total_flux: f64 = magnitudes.map(|m| 10f64.powf(-0.4 * m)).sum();
    if total_flux <= 0.0 {
        return f64::NAN;
    }
    -2.5 * total_flux.log10()
}
