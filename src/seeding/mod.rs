//! Seeding driver: index fill, pair enumeration, extension and track building.
//!
//! One [`Seeder`] is reused across events. Each event clears and refills the
//! index, then runs `iterations` passes; pass `i` seeds from
//! `start_layer − i * iteration_layer_step` and the layer below it.
//!
//! Extension only reads the index, so with the `parallel` feature seed pairs
//! are extended on rayon's pool. Outcomes are collected in pair order and
//! ids are assigned afterwards, so output is identical to the serial path.

mod build;
mod extend;
mod pairs;
mod stats;
pub mod timing;

pub use build::{build_track, SeedQuality};
pub use extend::{curvature_from_slope, extend_pair, Chain, ExtensionOutcome, Rejection};
pub use pairs::{find_seed_pairs, PairScan, SeedPair};
pub use stats::RunningStats;

use glam::DVec3;
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::SeedingConfig;
use crate::error::{EventInput, SeedingError};
use crate::geometry::GeometryTable;
use crate::index::{FillStats, PhiEtaIndex};
use crate::track::{Track, TrackSink};
use crate::types::{ClusterSource, ClusterStore};
use timing::{SeedingTimings, Timer, TimingBuilder};

/// Conditionally parallel iterator over a slice.
macro_rules! maybe_par_iter {
    ($slice:expr) => {{
        #[cfg(feature = "parallel")]
        {
            $slice.par_iter()
        }
        #[cfg(not(feature = "parallel"))]
        {
            $slice.iter()
        }
    }};
}

/// Read-only state shared by every step of one event.
#[derive(Debug, Clone, Copy)]
pub struct SeedingContext<'a> {
    pub config: &'a SeedingConfig,
    pub geometry: &'a GeometryTable,
    pub index: &'a PhiEtaIndex,
    pub vertex: DVec3,
}

/// Per-event inputs. Any of them may be missing; the event is then aborted.
pub struct Event<'a, C: ?Sized = ClusterStore> {
    pub geometry: Option<&'a GeometryTable>,
    pub clusters: Option<&'a C>,
    pub vertex: Option<DVec3>,
}

impl<C: ?Sized> Clone for Event<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized> Copy for Event<'_, C> {}

impl<'a, C: ClusterSource + ?Sized> Event<'a, C> {
    pub fn new(geometry: &'a GeometryTable, clusters: &'a C, vertex: DVec3) -> Self {
        Self {
            geometry: Some(geometry),
            clusters: Some(clusters),
            vertex: Some(vertex),
        }
    }

    /// Event with no inputs set.
    pub fn empty() -> Self {
        Self {
            geometry: None,
            clusters: None,
            vertex: None,
        }
    }

    pub fn with_geometry(mut self, geometry: &'a GeometryTable) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_clusters(mut self, clusters: &'a C) -> Self {
        self.clusters = Some(clusters);
        self
    }

    pub fn with_vertex(mut self, vertex: DVec3) -> Self {
        self.vertex = Some(vertex);
        self
    }

    fn resolve(&self) -> Result<(&'a GeometryTable, &'a C, DVec3), SeedingError> {
        let geometry = self
            .geometry
            .filter(|g| !g.is_empty())
            .ok_or(SeedingError::MissingInput(EventInput::Geometry))?;
        let clusters = self
            .clusters
            .ok_or(SeedingError::MissingInput(EventInput::Clusters))?;
        let vertex = self
            .vertex
            .filter(|v| v.is_finite())
            .ok_or(SeedingError::MissingInput(EventInput::Vertex))?;
        Ok((geometry, clusters, vertex))
    }
}

/// Rejected seed pairs per reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RejectionCounts {
    pub unknown_layer: usize,
    pub no_curvature_signal: usize,
    pub too_many_failures: usize,
    pub too_short: usize,
    pub spread_too_large: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, rejection: &Rejection) {
        match rejection {
            Rejection::UnknownLayer(_) => self.unknown_layer += 1,
            Rejection::NoCurvatureSignal => self.no_curvature_signal += 1,
            Rejection::TooManyFailures { .. } => self.too_many_failures += 1,
            Rejection::TooShort { .. } => self.too_short += 1,
            Rejection::SpreadTooLarge => self.spread_too_large += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.unknown_layer
            + self.no_curvature_signal
            + self.too_many_failures
            + self.too_short
            + self.spread_too_large
    }
}

/// What one event produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSummary {
    pub fill: FillStats,
    /// Starting-layer clusters, summed over passes.
    pub start_clusters: usize,
    pub seed_pairs: usize,
    pub tracks: usize,
    pub rejected: RejectionCounts,
    pub timings: SeedingTimings,
}

/// Tracks and summary of one event.
#[derive(Debug, Clone)]
pub struct SeedingOutput {
    pub tracks: Vec<Track>,
    pub summary: EventSummary,
}

/// Reusable seeding driver.
#[derive(Debug, Clone)]
pub struct Seeder {
    config: SeedingConfig,
    index: PhiEtaIndex,
}

impl Seeder {
    pub fn new(config: SeedingConfig) -> Result<Self, SeedingError> {
        config.validate()?;
        let index = PhiEtaIndex::with_duplicate_tolerance(config.phi_bins, config.duplicate_tolerance);
        Ok(Self { config, index })
    }

    #[inline]
    pub fn config(&self) -> &SeedingConfig {
        &self.config
    }

    /// Index as filled by the last event.
    #[inline]
    pub fn index(&self) -> &PhiEtaIndex {
        &self.index
    }

    /// Seed one event and return its tracks.
    pub fn run<C>(&mut self, event: &Event<'_, C>) -> Result<SeedingOutput, SeedingError>
    where
        C: ClusterSource + ?Sized,
    {
        let mut tracks = Vec::new();
        let summary = self.process(event, &mut tracks)?;
        Ok(SeedingOutput { tracks, summary })
    }

    /// Seed one event into `sink`.
    ///
    /// Tracks get sequential ids from 0 in the order they are found. Nothing
    /// reaches the sink unless the whole event succeeds.
    pub fn process<C, S>(
        &mut self,
        event: &Event<'_, C>,
        sink: &mut S,
    ) -> Result<EventSummary, SeedingError>
    where
        C: ClusterSource + ?Sized,
        S: TrackSink + ?Sized,
    {
        let (geometry, clusters, vertex) = event.resolve()?;
        let mut timings = TimingBuilder::new();

        let t = Timer::start();
        self.index.clear();
        let fill = self
            .index
            .populate(clusters, vertex, self.config.min_index_layer);
        timings.set_fill(t.elapsed());

        let ctx = SeedingContext {
            config: &self.config,
            geometry,
            index: &self.index,
            vertex,
        };

        let mut summary = EventSummary {
            fill,
            ..EventSummary::default()
        };
        let mut tracks: Vec<Track> = Vec::new();

        for iteration in 0..self.config.iterations {
            let Some(start_layer) = self.config.start_layer_for(iteration) else {
                break;
            };

            let t = Timer::start();
            let scan = find_seed_pairs(&ctx, start_layer);
            timings.add_pairs(t.elapsed());
            summary.start_clusters += scan.start_clusters;
            summary.seed_pairs += scan.pairs.len();

            let t = Timer::start();
            let outcomes: Vec<ExtensionOutcome> = maybe_par_iter!(scan.pairs)
                .map(|pair| extend_pair(&ctx, pair))
                .collect();
            timings.add_extend(t.elapsed());

            let t = Timer::start();
            for outcome in outcomes {
                match outcome {
                    ExtensionOutcome::Accepted(chain) => {
                        let id = tracks.len() as u32;
                        match build_track(&ctx, &chain, clusters, id) {
                            Ok(track) => tracks.push(track),
                            Err(rejection) => summary.rejected.record(&rejection),
                        }
                    }
                    ExtensionOutcome::Rejected(rejection) => summary.rejected.record(&rejection),
                }
            }
            timings.add_build(t.elapsed());

            debug!(
                iteration,
                start_layer,
                start_clusters = scan.start_clusters,
                pairs = scan.pairs.len(),
                tracks = tracks.len(),
                "seeding pass done"
            );
        }

        summary.tracks = tracks.len();
        summary.timings = timings.finish();
        for track in tracks {
            sink.store(track);
        }

        info!(
            indexed = summary.fill.inserted,
            duplicates = summary.fill.duplicates,
            start_clusters = summary.start_clusters,
            seeds = summary.seed_pairs,
            tracks = summary.tracks,
            rejected = summary.rejected.total(),
            "event seeded"
        );
        Ok(summary)
    }
}
