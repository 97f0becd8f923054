//! Population of the index with duplicate suppression.

use glam::DVec3;
use tracing::{debug, trace};

use super::{IndexedPoint, LayerBuckets, PhiEtaIndex, QueryBox};
use crate::angle::{eta_of, phi_of};
use crate::types::{Cluster, ClusterSource, LayerId};

/// Half-width in phi and eta of the duplicate probe box.
pub(crate) const DEFAULT_DUPLICATE_TOLERANCE: f64 = 1e-5;

/// Outcome of filling the index from a cluster source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillStats {
    pub inserted: usize,
    pub duplicates: usize,
    /// Clusters on layers below the configured minimum.
    pub below_min_layer: usize,
    /// Clusters with no usable direction from the vertex (on the beam axis).
    pub degenerate: usize,
}

impl PhiEtaIndex {
    /// Insert a point unless another point already sits within the duplicate
    /// tolerance on the same layer. Returns `true` if the point was stored.
    pub fn insert(&mut self, point: IndexedPoint) -> bool {
        let probe = QueryBox::around(
            point.phi,
            self.duplicate_tolerance,
            point.eta,
            self.duplicate_tolerance,
            point.layer,
        );
        if self.any_wrapped(&probe) {
            self.duplicates += 1;
            trace!(key = %point.key, phi = point.phi, eta = point.eta, "duplicate cluster");
            return false;
        }

        let id = self.points.len() as u32;
        let bucket = self.phi_bucket(point.phi);
        let layer = point.layer as usize;
        if self.layers.len() <= layer {
            self.layers.resize_with(layer + 1, || None);
        }
        let phi_bins = self.phi_bins;
        let buckets = self.layers[layer].get_or_insert_with(|| LayerBuckets::new(phi_bins));

        let points = &self.points;
        let slot = &mut buckets.buckets[bucket];
        let pos = slot.partition_point(|&i| points[i as usize].eta <= point.eta);
        slot.insert(pos, id);
        self.points.push(point);
        true
    }

    /// Convert a cluster to its vertex-relative point.
    ///
    /// Returns `None` when the direction is undefined (zero transverse distance).
    pub fn point_for(cluster: &Cluster, vertex: DVec3) -> Option<IndexedPoint> {
        let dir = cluster.position - vertex;
        let eta = eta_of(dir);
        if !eta.is_finite() {
            return None;
        }
        Some(IndexedPoint {
            phi: phi_of(dir),
            eta,
            layer: cluster.layer(),
            key: cluster.key,
        })
    }

    /// Insert every cluster on a layer `>= min_layer`, relative to `vertex`.
    pub fn populate<C>(&mut self, clusters: &C, vertex: DVec3, min_layer: LayerId) -> FillStats
    where
        C: ClusterSource + ?Sized,
    {
        let mut stats = FillStats::default();
        let duplicates_before = self.duplicates;

        for cluster in clusters.clusters() {
            if cluster.layer() < min_layer {
                stats.below_min_layer += 1;
                continue;
            }
            let Some(point) = Self::point_for(cluster, vertex) else {
                stats.degenerate += 1;
                continue;
            };
            if self.insert(point) {
                stats.inserted += 1;
            }
        }

        stats.duplicates = self.duplicates - duplicates_before;
        debug!(
            inserted = stats.inserted,
            duplicates = stats.duplicates,
            below_min_layer = stats.below_min_layer,
            degenerate = stats.degenerate,
            "filled phi/eta index"
        );
        stats
    }
}
