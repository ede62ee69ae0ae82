//! Mosaic cluster detection.
//!
//! Greedy, deterministic, single pass: seed records in RA-then-Dec order,
//! grow each cluster by the nearest unconsumed record that still fits the
//! mosaic field of view, accept clusters of two or more members with a
//! non-empty simultaneous window.

use crate::algorithms::geometry;
use crate::api::Equatorial;
use crate::config::PlannerConfig;
use crate::models::{MosaicGroup, ObservationWindow, VisibilityRecord};

/// Outcome of cluster detection over one night's visibility records.
#[derive(Debug)]
pub struct MosaicDetection<'a> {
    pub groups: Vec<MosaicGroup<'a>>,
    /// Indices into the input records that remain standalone: oversized
    /// targets, unclustered remainders, and members of rejected clusters.
    pub standalone: Vec<usize>,
}

/// Detect mosaic groups among observable records.
pub fn detect_clusters<'a>(
    records: &[VisibilityRecord<'a>],
    config: &PlannerConfig,
) -> MosaicDetection<'a> {
    let mosaic_fov = &config.imaging.mosaic_fov;
    let max_size = config.scheduling.max_cluster_size;

    // Partition: an object whose own extent exceeds the mosaic field can
    // never share it and is handled standalone.
    let mut standalone: Vec<usize> = Vec::new();
    let mut clusterable: Vec<usize> = Vec::new();
    for (index, record) in records.iter().enumerate() {
        if !record.is_observable() {
            standalone.push(index);
        } else if record.target.extent.width.value() > mosaic_fov.width.value()
            || record.target.extent.height.value() > mosaic_fov.height.value()
        {
            standalone.push(index);
        } else {
            clusterable.push(index);
        }
    }

    // Deterministic seed order: RA, then Dec, then id
    clusterable.sort_by(|&a, &b| {
        let (ta, tb) = (records[a].target, records[b].target);
        ta.coordinates
            .ra
            .value()
            .partial_cmp(&tb.coordinates.ra.value())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                ta.coordinates
                    .dec
                    .value()
                    .partial_cmp(&tb.coordinates.dec.value())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| ta.id.cmp(&tb.id))
    });

    let mut consumed = vec![false; records.len()];
    let mut groups: Vec<MosaicGroup<'a>> = Vec::new();

    for &seed in &clusterable {
        if consumed[seed] {
            continue;
        }
        consumed[seed] = true;
        let mut cluster = vec![seed];

        // Grow by the nearest record (to the current cluster centroid) whose
        // addition still fits the mosaic field of view.
        while cluster.len() < max_size {
            let centroid = cluster_centroid(records, &cluster);
            let next = clusterable
                .iter()
                .filter(|&&candidate| !consumed[candidate])
                .filter(|&&candidate| {
                    let mut coords = cluster_coords(records, &cluster);
                    coords.push(records[candidate].target.coordinates);
                    geometry::fits_within_fov(&coords, mosaic_fov)
                })
                .min_by(|&&a, &&b| {
                    let da =
                        geometry::angular_separation(centroid, records[a].target.coordinates);
                    let db =
                        geometry::angular_separation(centroid, records[b].target.coordinates);
                    da.value()
                        .partial_cmp(&db.value())
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| records[a].target.id.cmp(&records[b].target.id))
                })
                .copied();

            match next {
                Some(candidate) => {
                    consumed[candidate] = true;
                    cluster.push(candidate);
                }
                None => break,
            }
        }

        if cluster.len() < 2 {
            standalone.push(seed);
            continue;
        }

        // A group with no common observing time is rejected; its members
        // fall back to standalone scheduling.
        let windows = simultaneous_windows(records, &cluster, config);
        if windows.is_empty() {
            log::debug!(
                "mosaic: cluster around {} rejected, no simultaneous window",
                records[seed].target.id
            );
            standalone.extend(cluster);
            continue;
        }

        let members = cluster.iter().map(|&i| records[i].target).collect();
        groups.push(MosaicGroup::new(members, windows));
    }

    standalone.sort_unstable();
    MosaicDetection { groups, standalone }
}

fn cluster_coords(records: &[VisibilityRecord<'_>], cluster: &[usize]) -> Vec<Equatorial> {
    cluster
        .iter()
        .map(|&i| records[i].target.coordinates)
        .collect()
}

fn cluster_centroid(records: &[VisibilityRecord<'_>], cluster: &[usize]) -> Equatorial {
    geometry::centroid(&cluster_coords(records, cluster))
}

/// Intersection of the members' window sets. Each surviving window is
/// moon-free only when every contributing member window was, and re-checked
/// against the minimum visibility duration.
fn simultaneous_windows(
    records: &[VisibilityRecord<'_>],
    cluster: &[usize],
    config: &PlannerConfig,
) -> Vec<ObservationWindow> {
    let mut result: Vec<ObservationWindow> = records[cluster[0]].windows.clone();
    for &member in &cluster[1..] {
        result = intersect_window_sets(&result, &records[member].windows);
        if result.is_empty() {
            return result;
        }
    }
    for window in &mut result {
        window.meets_minimum =
            window.duration_hours().value() >= config.visibility.min_visibility_hours;
    }
    result
}

fn intersect_window_sets(
    a: &[ObservationWindow],
    b: &[ObservationWindow],
) -> Vec<ObservationWindow> {
    let mut out = Vec::new();
    for wa in a {
        for wb in b {
            if let Some(period) = wa.period.intersect(&wb.period) {
                let mut w = ObservationWindow::new(period);
                w.moon_free = wa.moon_free && wb.moon_free;
                out.push(w);
            }
        }
    }
    out.sort_by(|x, y| {
        x.period
            .start
            .value()
            .partial_cmp(&y.period.start.value())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out
}
