//! Box queries, including the wrap-around split in phi.

use std::f64::consts::TAU;

use super::{IndexedPoint, PhiEtaIndex, QueryBox};
use crate::types::LayerId;

impl PhiEtaIndex {
    /// Append every point inside `qbox` to `out`.
    ///
    /// The phi range is taken literally: nothing is stored outside [0, 2π), so
    /// the parts of a box beyond that range match nothing.
    pub fn query_into(&self, qbox: &QueryBox, out: &mut Vec<IndexedPoint>) {
        self.visit(qbox, |p| {
            out.push(*p);
            true
        });
    }

    /// Like [`query_into`](Self::query_into), but a box crossing phi = 0 or
    /// phi = 2π is also queried at its reflection on the other side.
    ///
    /// A point can appear twice only if the box spans more than a full turn.
    pub fn query_wrapped_into(&self, qbox: &QueryBox, out: &mut Vec<IndexedPoint>) {
        self.query_into(qbox, out);
        for reflected in reflections(qbox).iter().flatten() {
            self.query_into(reflected, out);
        }
    }

    /// Convenience wrapper returning a fresh vector.
    pub fn query_wrapped(&self, qbox: &QueryBox) -> Vec<IndexedPoint> {
        let mut out = Vec::new();
        self.query_wrapped_into(qbox, &mut out);
        out
    }

    /// All points on `layer` with `|eta| <= max_abs_eta`.
    pub fn query_layer_into(&self, layer: LayerId, max_abs_eta: f64, out: &mut Vec<IndexedPoint>) {
        let l = layer as f64;
        let qbox = QueryBox {
            phi_min: 0.0,
            phi_max: TAU,
            eta_min: -max_abs_eta,
            eta_max: max_abs_eta,
            layer_min: l - 0.5,
            layer_max: l + 0.5,
        };
        self.query_into(&qbox, out);
    }

    /// True if the wrapped box contains at least one point.
    pub(super) fn any_wrapped(&self, qbox: &QueryBox) -> bool {
        let mut found = false;
        for b in std::iter::once(qbox).chain(reflections(qbox).iter().flatten()) {
            self.visit(b, |_| {
                found = true;
                false
            });
            if found {
                break;
            }
        }
        found
    }

    /// Visit points inside `qbox` in (layer, bucket, eta) order until `f` returns false.
    fn visit<F>(&self, qbox: &QueryBox, mut f: F)
    where
        F: FnMut(&IndexedPoint) -> bool,
    {
        if qbox.phi_max < 0.0
            || qbox.phi_min >= TAU
            || qbox.phi_max < qbox.phi_min
            || qbox.eta_max < qbox.eta_min
            || qbox.layer_max < 0.0
            || self.layers.is_empty()
        {
            return;
        }

        let layer_lo = qbox.layer_min.max(0.0).ceil();
        let layer_hi = qbox.layer_max.floor().min((self.layers.len() - 1) as f64);
        if layer_hi < layer_lo {
            return;
        }
        let bucket_lo = self.phi_bucket(qbox.phi_min.max(0.0));
        let bucket_hi = self.phi_bucket(qbox.phi_max.min(TAU));

        for layer in (layer_lo as usize)..=(layer_hi as usize) {
            let Some(buckets) = self.layers[layer].as_ref() else {
                continue;
            };
            for bucket in &buckets.buckets[bucket_lo..=bucket_hi] {
                let start = bucket.partition_point(|&i| self.points[i as usize].eta < qbox.eta_min);
                for &i in &bucket[start..] {
                    let p = &self.points[i as usize];
                    if p.eta > qbox.eta_max {
                        break;
                    }
                    if p.phi >= qbox.phi_min && p.phi <= qbox.phi_max && !f(p) {
                        return;
                    }
                }
            }
        }
    }
}

/// Parts of `qbox` lying below 0 or above 2π, moved by one full turn.
fn reflections(qbox: &QueryBox) -> [Option<QueryBox>; 2] {
    let below = (qbox.phi_min < 0.0).then(|| QueryBox {
        phi_min: TAU + qbox.phi_min,
        phi_max: (TAU + qbox.phi_max).min(TAU),
        ..*qbox
    });
    let above = (qbox.phi_max > TAU).then(|| QueryBox {
        phi_min: (qbox.phi_min - TAU).max(0.0),
        phi_max: qbox.phi_max - TAU,
        ..*qbox
    });
    [below, above]
}
