#![allow(dead_code)]

use ca_seeding::{
    Cluster, GeometryTable, HitKey, LayerId, SeedingConfig, GEV_PER_TESLA_METER,
};
use glam::DVec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;

pub const FIRST_LAYER: LayerId = 39;
pub const START_LAYER: LayerId = 45;

/// Layers 39..=45 evenly spaced from 20 to 90 mm.
pub fn geometry() -> GeometryTable {
    GeometryTable::from_radii(
        (FIRST_LAYER..=START_LAYER).map(|l| (l, 20.0 + (l - FIRST_LAYER) as f64 * 70.0 / 6.0)),
    )
    .unwrap()
}

/// Defaults, with millimetre units and seeding from layer 45.
pub fn config() -> SeedingConfig {
    SeedingConfig {
        start_layer: START_LAYER,
        min_index_layer: FIRST_LAYER,
        units_per_meter: 1000.0,
        ..SeedingConfig::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Helix {
    /// GeV/c.
    pub pt: f64,
    /// Azimuth of the momentum at the vertex.
    pub phi0: f64,
    pub eta: f64,
    pub charge: i8,
    pub vertex: DVec3,
}

impl Helix {
    pub fn new(pt: f64, phi0: f64, eta: f64, charge: i8) -> Self {
        Self {
            pt,
            phi0,
            eta,
            charge,
            vertex: DVec3::ZERO,
        }
    }

    pub fn with_vertex(mut self, vertex: DVec3) -> Self {
        self.vertex = vertex;
        self
    }

    /// Transverse radius of the helix in length units.
    pub fn radius(&self, config: &SeedingConfig) -> f64 {
        self.pt / (GEV_PER_TESLA_METER * config.b_field_tesla) * config.units_per_meter
    }

    /// Point at transverse distance `r` from the vertex.
    ///
    /// A positive charge turns clockwise seen from +z.
    pub fn position(&self, r: f64, config: &SeedingConfig) -> DVec3 {
        let big_r = self.radius(config);
        let half_turn = (r / (2.0 * big_r)).asin();
        let phi = self.phi0 - self.charge as f64 * half_turn;
        let z = self.eta.sinh() * 2.0 * big_r * half_turn;
        self.vertex + DVec3::new(r * phi.cos(), r * phi.sin(), z)
    }

    /// One cluster per listed layer, keyed `(layer, index)`.
    pub fn clusters_on(
        &self,
        layers: impl IntoIterator<Item = LayerId>,
        geometry: &GeometryTable,
        config: &SeedingConfig,
        index: u32,
    ) -> Vec<Cluster> {
        layers
            .into_iter()
            .filter_map(|l| {
                let r = geometry.radius(l)?;
                Some(Cluster::new(HitKey::new(l, index), self.position(r, config)))
            })
            .collect()
    }

    /// One cluster on every layer of the geometry.
    pub fn clusters(&self, geometry: &GeometryTable, config: &SeedingConfig, index: u32) -> Vec<Cluster> {
        let layers: Vec<LayerId> = geometry.iter().map(|(l, _)| l).collect();
        self.clusters_on(layers, geometry, config, index)
    }
}

pub fn random_helix<R: Rng + ?Sized>(rng: &mut R) -> Helix {
    Helix::new(
        rng.gen_range(0.5..10.0),
        rng.gen_range(0.0..TAU),
        rng.gen_range(-1.0..1.0),
        if rng.gen_bool(0.5) { 1 } else { -1 },
    )
}

/// Uniform hits in (phi, |eta| < 1) on every layer of the geometry.
pub fn noise_clusters(n: usize, seed: u64, geometry: &GeometryTable, first_index: u32) -> Vec<Cluster> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let layers: Vec<(LayerId, f64)> = geometry.iter().collect();
    (0..n)
        .map(|i| {
            let (layer, r) = layers[rng.gen_range(0..layers.len())];
            let phi: f64 = rng.gen_range(0.0..TAU);
            let eta: f64 = rng.gen_range(-1.0..1.0);
            Cluster::new(
                HitKey::new(layer, first_index + i as u32),
                [r * phi.cos(), r * phi.sin(), r * eta.sinh()],
            )
        })
        .collect()
}

/// `n` helices with distinct indices and azimuths at least 0.1 rad apart.
pub fn separated_helices(n: usize, seed: u64) -> Vec<Helix> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let step = TAU / n as f64;
    assert!(step > 0.1, "too many helices to keep apart");
    (0..n)
        .map(|i| {
            let mut h = random_helix(&mut rng);
            h.phi0 = (i as f64 + 0.5) * step;
            h
        })
        .collect()
}
