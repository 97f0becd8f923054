//! Core hit types: keys, clusters and cluster sources.

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Logical detector layer id.
pub type LayerId = u8;

const LAYER_SHIFT: u32 = 32;
const INDEX_MASK: u64 = 0xffff_ffff;

/// Opaque, globally unique cluster key.
///
/// The layer id is packed into bits 32..40 so it can be recovered from the key
/// alone; the low 32 bits are a per-layer cluster index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HitKey(pub u64);

impl HitKey {
    #[inline]
    pub const fn new(layer: LayerId, index: u32) -> Self {
        Self(((layer as u64) << LAYER_SHIFT) | index as u64)
    }

    #[inline]
    pub const fn layer(self) -> LayerId {
        (self.0 >> LAYER_SHIFT) as LayerId
    }

    #[inline]
    pub const fn index(self) -> u32 {
        (self.0 & INDEX_MASK) as u32
    }
}

impl fmt::Display for HitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.layer(), self.index())
    }
}

/// A reconstructed hit: key, global position and position covariance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
    pub key: HitKey,
    pub position: DVec3,
    /// Symmetric 3x3 position covariance.
    pub covariance: DMat3,
}

impl Cluster {
    /// Cluster with zero covariance.
    pub fn new(key: HitKey, position: impl Into<DVec3>) -> Self {
        Self {
            key,
            position: position.into(),
            covariance: DMat3::ZERO,
        }
    }

    pub fn with_covariance(mut self, covariance: DMat3) -> Self {
        self.covariance = covariance;
        self
    }

    /// Set the covariance from packed upper-triangle terms `[xx, xy, xz, yy, yz, zz]`.
    pub fn with_packed_covariance(mut self, c: [f64; 6]) -> Self {
        self.covariance = DMat3::from_cols(
            DVec3::new(c[0], c[1], c[2]),
            DVec3::new(c[1], c[3], c[4]),
            DVec3::new(c[2], c[4], c[5]),
        );
        self
    }

    #[inline]
    pub fn layer(&self) -> LayerId {
        self.key.layer()
    }

    /// Covariance term `(row, col)`.
    #[inline]
    pub fn error(&self, row: usize, col: usize) -> f64 {
        self.covariance.col(col)[row]
    }
}

/// Read access to the clusters of one event.
pub trait ClusterSource {
    /// Iterate all clusters. The order fixes which of two duplicates is kept.
    fn clusters(&self) -> impl Iterator<Item = &Cluster> + '_;

    /// Look up one cluster by key.
    fn cluster(&self, key: HitKey) -> Option<&Cluster>;

    fn num_clusters(&self) -> usize {
        self.clusters().count()
    }
}

impl ClusterSource for [Cluster] {
    fn clusters(&self) -> impl Iterator<Item = &Cluster> + '_ {
        self.iter()
    }

    fn cluster(&self, key: HitKey) -> Option<&Cluster> {
        self.iter().find(|c| c.key == key)
    }

    fn num_clusters(&self) -> usize {
        self.len()
    }
}

/// Key-ordered cluster store.
#[derive(Debug, Clone, Default)]
pub struct ClusterStore {
    clusters: BTreeMap<HitKey, Cluster>,
}

impl ClusterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cluster, replacing any previous cluster with the same key.
    pub fn insert(&mut self, cluster: Cluster) -> Option<Cluster> {
        self.clusters.insert(cluster.key, cluster)
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

impl FromIterator<Cluster> for ClusterStore {
    fn from_iter<I: IntoIterator<Item = Cluster>>(iter: I) -> Self {
        let mut store = Self::new();
        for cluster in iter {
            store.insert(cluster);
        }
        store
    }
}

impl ClusterSource for ClusterStore {
    fn clusters(&self) -> impl Iterator<Item = &Cluster> + '_ {
        self.clusters.values()
    }

    fn cluster(&self, key: HitKey) -> Option<&Cluster> {
        self.clusters.get(&key)
    }

    fn num_clusters(&self) -> usize {
        self.clusters.len()
    }
}
