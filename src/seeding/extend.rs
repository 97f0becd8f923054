//! Layer-by-layer extension of a seed pair.
//!
//! The trajectory is treated as locally linear in (phi, r) and (eta, r).
//! Each step extrapolates phi from the last accepted hit with the most recent
//! slope, takes the closest cluster in the step window, and re-measures the
//! slopes between the last accepted hit and the new one.

use tracing::{debug, trace};

use super::pairs::SeedPair;
use super::SeedingContext;
use crate::angle::phi_diff;
use crate::index::{IndexedPoint, QueryBox};
use crate::types::{HitKey, LayerId};

/// Local curvature from the azimuth slope at a radius.
///
/// For a circle of radius R through the origin, `dphi/dr = 1 / sqrt(4R² − r²)`,
/// so `sqrt(r² + (dr/dphi)²) = 2R`. The sign follows the slope.
///
/// Returns `None` for a zero or non-finite slope (no curvature signal).
#[inline]
pub fn curvature_from_slope(phi_slope: f64, radius: f64) -> Option<f64> {
    if phi_slope == 0.0 || !phi_slope.is_finite() {
        return None;
    }
    let kappa = (2.0 / (radius * radius + 1.0 / (phi_slope * phi_slope)).sqrt()).copysign(phi_slope);
    (kappa != 0.0 && kappa.is_finite()).then_some(kappa)
}

/// Slopes and curvature measured between two hits (outer first).
#[derive(Debug, Clone, Copy, PartialEq)]
struct StepFit {
    phi_slope: f64,
    eta_slope: f64,
    curvature: f64,
}

impl StepFit {
    fn between(
        (outer_phi, outer_eta, outer_r): (f64, f64, f64),
        (inner_phi, inner_eta, inner_r): (f64, f64, f64),
    ) -> Option<Self> {
        let dr = outer_r - inner_r;
        if dr == 0.0 || !dr.is_finite() {
            return None;
        }
        let phi_slope = phi_diff(outer_phi, inner_phi) / dr;
        let eta_slope = (outer_eta - inner_eta) / dr;
        let curvature = curvature_from_slope(phi_slope, 0.5 * (outer_r + inner_r))?;
        Some(Self {
            phi_slope,
            eta_slope,
            curvature,
        })
    }
}

/// Hits collected for one seed, outermost first, with the per-step estimates.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub keys: Vec<HitKey>,
    pub curvatures: Vec<f64>,
    pub phi_slopes: Vec<f64>,
    pub eta_slopes: Vec<f64>,
    /// Azimuth and eta of the starting-layer cluster.
    pub start_phi: f64,
    pub start_eta: f64,
    /// Failed layer steps.
    pub failures: usize,
}

impl Chain {
    fn open(pair: &SeedPair, fit: StepFit) -> Self {
        Self {
            keys: vec![pair.outer.key, pair.inner.key],
            curvatures: vec![fit.curvature],
            phi_slopes: vec![fit.phi_slope],
            eta_slopes: vec![fit.eta_slope],
            start_phi: pair.outer.phi,
            start_eta: pair.outer.eta,
            failures: 0,
        }
    }

    fn push(&mut self, key: HitKey, fit: StepFit) {
        self.keys.push(key);
        self.curvatures.push(fit.curvature);
        self.phi_slopes.push(fit.phi_slope);
        self.eta_slopes.push(fit.eta_slope);
    }

    /// Number of hits.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Hit layers, outermost first.
    pub fn layers(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.keys.iter().map(|k| k.layer())
    }
}

/// Why a seed pair produced no track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// A pair layer has no radius.
    UnknownLayer(LayerId),
    /// Zero azimuth slope, or a zero mean curvature at build time.
    NoCurvatureSignal,
    /// Extension stopped after too many failed layer steps.
    TooManyFailures { failures: usize, hits: usize },
    /// Extension finished with fewer hits than required.
    TooShort { hits: usize },
    /// Curvature estimates along the chain disagree by more than the configured cap.
    SpreadTooLarge,
}

/// Result of extending one pair.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionOutcome {
    Accepted(Chain),
    Rejected(Rejection),
}

impl ExtensionOutcome {
    pub fn chain(&self) -> Option<&Chain> {
        match self {
            ExtensionOutcome::Accepted(chain) => Some(chain),
            ExtensionOutcome::Rejected(_) => None,
        }
    }
}

/// Candidate closest to the prediction, by `|Δphi| + |Δeta|`; first wins on ties.
fn closest(candidates: &[IndexedPoint], phi: f64, eta: f64) -> Option<&IndexedPoint> {
    candidates
        .iter()
        .map(|c| (c, phi_diff(c.phi, phi).abs() + (c.eta - eta).abs()))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}

/// Extend a seed pair inward, one layer per step.
pub fn extend_pair(ctx: &SeedingContext<'_>, pair: &SeedPair) -> ExtensionOutcome {
    let cfg = ctx.config;
    let outer = pair.outer;
    let inner = pair.inner;

    let Some(outer_r) = ctx.geometry.radius(outer.layer) else {
        return ExtensionOutcome::Rejected(Rejection::UnknownLayer(outer.layer));
    };
    let Some(inner_r) = ctx.geometry.radius(inner.layer) else {
        return ExtensionOutcome::Rejected(Rejection::UnknownLayer(inner.layer));
    };
    let Some(first) = StepFit::between(
        (outer.phi, outer.eta, outer_r),
        (inner.phi, inner.eta, inner_r),
    ) else {
        debug!(outer = %outer.key, inner = %inner.key, "seed pair has no curvature signal");
        return ExtensionOutcome::Rejected(Rejection::NoCurvatureSignal);
    };

    debug!(
        outer_phi = outer.phi,
        inner_phi = inner.phi,
        dphi_dr = first.phi_slope,
        outer_eta = outer.eta,
        inner_eta = inner.eta,
        deta_dr = first.eta_slope,
        "extending seed pair"
    );

    let mut chain = Chain::open(pair, first);
    let mut current_phi = inner.phi;
    let mut current_eta = inner.eta;
    let mut last_r = inner_r;
    let mut phi_slope = first.phi_slope;
    let mut candidates = Vec::new();

    for step in 1..=cfg.max_extension_steps {
        let Some(layer) = (inner.layer as usize)
            .checked_sub(step)
            .and_then(|l| LayerId::try_from(l).ok())
        else {
            break;
        };

        let fit = ctx.geometry.radius(layer).and_then(|r| {
            let predicted_phi = current_phi - phi_slope * (last_r - r);
            let qbox = QueryBox::around(
                predicted_phi,
                cfg.step_window.phi,
                current_eta,
                cfg.step_window.eta,
                layer,
            );
            candidates.clear();
            ctx.index.query_wrapped_into(&qbox, &mut candidates);
            trace!(
                layer,
                phi_min = qbox.phi_min,
                phi_max = qbox.phi_max,
                eta_min = qbox.eta_min,
                eta_max = qbox.eta_max,
                found = candidates.len(),
                "layer window"
            );

            let best = *closest(&candidates, predicted_phi, current_eta)?;
            let fit = StepFit::between(
                (current_phi, current_eta, last_r),
                (best.phi, best.eta, r),
            )?;
            Some((best, fit, r))
        });

        match fit {
            Some((best, fit, r)) => {
                chain.push(best.key, fit);
                current_phi = best.phi;
                current_eta = 0.5 * (current_eta + best.eta);
                phi_slope = fit.phi_slope;
                last_r = r;
            }
            None => {
                chain.failures += 1;
                if chain.failures > cfg.max_failures {
                    break;
                }
            }
        }
    }

    if chain.failures > cfg.max_failures {
        debug!(failures = chain.failures, hits = chain.len(), "chain dropped");
        return ExtensionOutcome::Rejected(Rejection::TooManyFailures {
            failures: chain.failures,
            hits: chain.len(),
        });
    }
    if chain.len() < cfg.min_hits {
        debug!(hits = chain.len(), "chain too short");
        return ExtensionOutcome::Rejected(Rejection::TooShort { hits: chain.len() });
    }
    ExtensionOutcome::Accepted(chain)
}
