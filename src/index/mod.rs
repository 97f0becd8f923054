//! Azimuth-bucket grid over (phi, eta, layer) for range queries.
//!
//! Each layer owns `phi_bins` equal-width buckets over [0, 2π). A bucket holds
//! point ids sorted by eta, so a box query scans the buckets overlapped by its
//! phi range and binary-searches the eta range inside each one.
//!
//! Supports:
//! - `query_into`: closed axis-aligned box, no wrap handling
//! - `query_wrapped_into`: box whose phi range may cross 0 or 2π
//! - `query_layer_into`: whole-layer band used to pick starting clusters

mod build;
mod query;

pub use build::FillStats;

use crate::types::{HitKey, LayerId};
use std::f64::consts::TAU;

/// Default number of phi buckets per layer.
pub const DEFAULT_PHI_BINS: usize = 720;

/// A hit as seen from the vertex: direction angles plus layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedPoint {
    /// Azimuth in [0, 2π).
    pub phi: f64,
    pub eta: f64,
    pub layer: LayerId,
    pub key: HitKey,
}

/// Closed box in (phi, eta, layer) space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryBox {
    pub phi_min: f64,
    pub phi_max: f64,
    pub eta_min: f64,
    pub eta_max: f64,
    pub layer_min: f64,
    pub layer_max: f64,
}

impl QueryBox {
    /// Box centered on `(phi, eta)` covering exactly one layer (±0.5).
    #[inline]
    pub fn around(phi: f64, half_phi: f64, eta: f64, half_eta: f64, layer: LayerId) -> Self {
        let l = layer as f64;
        Self {
            phi_min: phi - half_phi,
            phi_max: phi + half_phi,
            eta_min: eta - half_eta,
            eta_max: eta + half_eta,
            layer_min: l - 0.5,
            layer_max: l + 0.5,
        }
    }

    /// Same box shifted in phi.
    #[inline]
    pub fn shifted_phi(self, offset: f64) -> Self {
        Self {
            phi_min: self.phi_min + offset,
            phi_max: self.phi_max + offset,
            ..self
        }
    }

    #[inline]
    pub fn contains(&self, p: &IndexedPoint) -> bool {
        let l = p.layer as f64;
        p.phi >= self.phi_min
            && p.phi <= self.phi_max
            && p.eta >= self.eta_min
            && p.eta <= self.eta_max
            && l >= self.layer_min
            && l <= self.layer_max
    }
}

/// Buckets of one layer; each bucket is sorted by eta.
#[derive(Debug, Clone)]
struct LayerBuckets {
    buckets: Vec<Vec<u32>>,
}

impl LayerBuckets {
    fn new(phi_bins: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); phi_bins],
        }
    }
}

/// Spatial index over the hits of one event.
#[derive(Debug, Clone)]
pub struct PhiEtaIndex {
    phi_bins: usize,
    /// Inserted points; bucket entries index into this.
    points: Vec<IndexedPoint>,
    /// Indexed by layer id; `None` until the first insertion on that layer.
    layers: Vec<Option<LayerBuckets>>,
    /// Half-width in phi and eta of the duplicate probe.
    duplicate_tolerance: f64,
    duplicates: usize,
}

impl Default for PhiEtaIndex {
    fn default() -> Self {
        Self::new(DEFAULT_PHI_BINS)
    }
}

impl PhiEtaIndex {
    pub fn new(phi_bins: usize) -> Self {
        Self::with_duplicate_tolerance(phi_bins, build::DEFAULT_DUPLICATE_TOLERANCE)
    }

    pub fn with_duplicate_tolerance(phi_bins: usize, duplicate_tolerance: f64) -> Self {
        Self {
            phi_bins: phi_bins.max(1),
            points: Vec::new(),
            layers: Vec::new(),
            duplicate_tolerance,
            duplicates: 0,
        }
    }

    /// Drop all points and counters, keeping allocations.
    pub fn clear(&mut self) {
        self.points.clear();
        for layer in self.layers.iter_mut().flatten() {
            for bucket in &mut layer.buckets {
                bucket.clear();
            }
        }
        self.duplicates = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points rejected as duplicates since the last `clear`.
    #[inline]
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    #[inline]
    pub fn phi_bins(&self) -> usize {
        self.phi_bins
    }

    #[inline]
    pub fn points(&self) -> &[IndexedPoint] {
        &self.points
    }

    /// Number of points stored on `layer`.
    pub fn layer_len(&self, layer: LayerId) -> usize {
        self.layer_buckets(layer)
            .map(|l| l.buckets.iter().map(Vec::len).sum())
            .unwrap_or(0)
    }

    #[inline]
    fn layer_buckets(&self, layer: LayerId) -> Option<&LayerBuckets> {
        self.layers.get(layer as usize).and_then(Option::as_ref)
    }

    /// Bucket of an azimuth in [0, 2π].
    #[inline]
    fn phi_bucket(&self, phi: f64) -> usize {
        let b = (phi / TAU * self.phi_bins as f64).floor();
        if b <= 0.0 {
            0
        } else {
            (b as usize).min(self.phi_bins - 1)
        }
    }
}
