//! Cellular-automaton track seeding over concentric detector layers.
//!
//! Hits are indexed by their direction from the event vertex (azimuth,
//! pseudorapidity) and their layer. Seeds are opened from pairs of hits on the
//! two outermost layers of a pass and extended inward one layer at a time,
//! re-estimating the local slopes of phi and eta against radius at every step.
//! Each accepted chain becomes a [`Track`] with a momentum estimate from the
//! mean local curvature.
//!
//! # Example
//!
//! ```
//! use ca_seeding::{seed_tracks_with, Cluster, ClusterStore, GeometryTable, HitKey, SeedingConfig};
//! use glam::DVec3;
//!
//! // Seven layers from 20 to 80 mm.
//! let geometry =
//!     GeometryTable::from_radii((39..=45u8).map(|l| (l, 20.0 + 10.0 * (l - 39) as f64))).unwrap();
//!
//! // One hit per layer on a gently curving trajectory.
//! let clusters: ClusterStore = (39..=45u8)
//!     .map(|l| {
//!         let r = geometry.radius(l).unwrap();
//!         let phi = 1.0 - 1e-4 * r;
//!         Cluster::new(HitKey::new(l, 0), [r * phi.cos(), r * phi.sin(), 0.2 * r])
//!     })
//!     .collect();
//!
//! let config = SeedingConfig {
//!     start_layer: 45,
//!     units_per_meter: 1000.0,
//!     ..SeedingConfig::default()
//! };
//! let output = seed_tracks_with(&geometry, &clusters, DVec3::ZERO, config).unwrap();
//! assert_eq!(output.tracks.len(), 1);
//! assert_eq!(output.tracks[0].num_hits(), 7);
//! ```

pub mod angle;
mod config;
mod error;
pub mod geometry;
pub mod index;
pub mod seeding;
mod track;
mod types;
pub mod validation;

pub use config::{SearchWindow, SeedingConfig, GEV_PER_TESLA_METER};
pub use error::{EventInput, GeometryError, SeedingError};
pub use geometry::{GeometryTable, GeometryTableBuilder, LayerRecord, SensorKind};
pub use seeding::{
    Event, EventSummary, RejectionCounts, SeedQuality, Seeder, SeedingOutput,
};
pub use track::{Covariance6, Track, TrackMap, TrackSink};
pub use types::{Cluster, ClusterSource, ClusterStore, HitKey, LayerId};

use glam::DVec3;

/// Seed one event with default settings.
pub fn seed_tracks<C>(
    geometry: &GeometryTable,
    clusters: &C,
    vertex: DVec3,
) -> Result<SeedingOutput, SeedingError>
where
    C: ClusterSource + ?Sized,
{
    seed_tracks_with(geometry, clusters, vertex, SeedingConfig::default())
}

/// Seed one event with explicit configuration.
///
/// Builds a fresh [`Seeder`]; reuse a `Seeder` directly to keep the index
/// allocation across events.
pub fn seed_tracks_with<C>(
    geometry: &GeometryTable,
    clusters: &C,
    vertex: DVec3,
    config: SeedingConfig,
) -> Result<SeedingOutput, SeedingError>
where
    C: ClusterSource + ?Sized,
{
    let mut seeder = Seeder::new(config)?;
    seeder.run(&Event::new(geometry, clusters, vertex))
}
