//! Seed pair enumeration on the two outermost layers of a pass.

use tracing::{debug, warn};

use super::SeedingContext;
use crate::index::{IndexedPoint, QueryBox};
use crate::types::LayerId;

/// Two clusters on adjacent layers that open a chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedPair {
    /// Cluster on the starting layer.
    pub outer: IndexedPoint,
    /// Cluster on the layer just inside it.
    pub inner: IndexedPoint,
}

/// Pairs found for one starting layer.
#[derive(Debug, Clone, Default)]
pub struct PairScan {
    /// Clusters found on the starting layer.
    pub start_clusters: usize,
    pub pairs: Vec<SeedPair>,
}

/// Pair every starting-layer cluster with every cluster of the next inner
/// layer inside the pair window around it.
///
/// Returns no pairs when either layer has no configured radius.
pub fn find_seed_pairs(ctx: &SeedingContext<'_>, start_layer: LayerId) -> PairScan {
    let Some(inner_layer) = start_layer.checked_sub(1) else {
        return PairScan::default();
    };
    for layer in [start_layer, inner_layer] {
        if !ctx.geometry.contains(layer) {
            warn!(layer, "seeding layer has no radius; pass skipped");
            return PairScan::default();
        }
    }

    let window = ctx.config.pair_window;
    let mut starts = Vec::new();
    ctx.index
        .query_layer_into(start_layer, ctx.config.max_abs_eta, &mut starts);

    let mut pairs = Vec::new();
    let mut seconds = Vec::new();
    for outer in &starts {
        seconds.clear();
        let qbox = QueryBox::around(outer.phi, window.phi, outer.eta, window.eta, inner_layer);
        ctx.index.query_wrapped_into(&qbox, &mut seconds);
        debug!(
            key = %outer.key,
            phi = outer.phi,
            eta = outer.eta,
            partners = seconds.len(),
            "starting cluster"
        );
        pairs.extend(seconds.iter().map(|&inner| SeedPair {
            outer: *outer,
            inner,
        }));
    }

    PairScan {
        start_clusters: starts.len(),
        pairs,
    }
}
