//! Seeding configuration.

use serde::{Deserialize, Serialize};

use crate::error::SeedingError;
use crate::index::DEFAULT_PHI_BINS;
use crate::types::LayerId;

/// Speed of light in the units that turn `T * m` into `GeV/c`.
pub const GEV_PER_TESLA_METER: f64 = 0.299_792_458;

/// Half-widths of a search box in azimuth and pseudorapidity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchWindow {
    pub phi: f64,
    pub eta: f64,
}

impl SearchWindow {
    pub const fn new(phi: f64, eta: f64) -> Self {
        Self { phi, eta }
    }

    fn is_valid(&self) -> bool {
        self.phi.is_finite() && self.phi > 0.0 && self.eta.is_finite() && self.eta > 0.0
    }
}

/// Configuration for a seeding pass.
///
/// Lengths are in the unit of the geometry and cluster positions;
/// `units_per_meter` ties that unit to the field constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedingConfig {
    /// Outermost layer; seed pairs use this layer and the one below it.
    pub start_layer: LayerId,
    /// Clusters on lower layers are not indexed.
    pub min_index_layer: LayerId,
    /// Window around an outer cluster in which inner partners are accepted.
    pub pair_window: SearchWindow,
    /// Window around the extrapolated position on each following layer.
    pub step_window: SearchWindow,
    /// Eta band of the starting-layer scan.
    pub max_abs_eta: f64,
    /// A chain is dropped once it has more failed layer steps than this.
    pub max_failures: usize,
    /// Layers searched below the pair's inner layer.
    pub max_extension_steps: usize,
    /// Shortest chain (including the pair) turned into a track.
    pub min_hits: usize,
    /// Largest accepted `curvature_std / |mean_curvature|` of a chain. `None` accepts any spread.
    pub max_curvature_spread: Option<f64>,
    pub b_field_tesla: f64,
    /// Length units per meter (100 for centimetres, 1000 for millimetres).
    pub units_per_meter: f64,
    /// Half-width in phi and eta under which two clusters on one layer are duplicates.
    pub duplicate_tolerance: f64,
    /// Azimuth buckets per layer in the spatial index.
    pub phi_bins: usize,
    /// Seeding passes per event.
    pub iterations: usize,
    /// Start-layer decrement between passes.
    pub iteration_layer_step: LayerId,
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            start_layer: 54,
            min_index_layer: 39,
            pair_window: SearchWindow::new(0.01, 0.007),
            step_window: SearchWindow::new(0.002, 0.006),
            max_abs_eta: 3.0,
            max_failures: 2,
            max_extension_steps: 6,
            min_hits: 3,
            max_curvature_spread: None,
            b_field_tesla: 1.4,
            units_per_meter: 100.0,
            duplicate_tolerance: 1e-5,
            phi_bins: DEFAULT_PHI_BINS,
            iterations: 1,
            iteration_layer_step: 7,
        }
    }
}

impl SeedingConfig {
    /// `pt = pt_constant / |curvature|`, with curvature in inverse length units.
    #[inline]
    pub fn pt_constant(&self) -> f64 {
        GEV_PER_TESLA_METER * self.b_field_tesla / self.units_per_meter
    }

    /// Start layer of pass `iteration`, if it still leaves room for a pair.
    pub fn start_layer_for(&self, iteration: usize) -> Option<LayerId> {
        let offset = iteration.checked_mul(self.iteration_layer_step as usize)?;
        let layer = (self.start_layer as usize).checked_sub(offset)?;
        (layer >= 1).then_some(layer as LayerId)
    }

    pub fn validate(&self) -> Result<(), SeedingError> {
        let fail = |msg: String| Err(SeedingError::InvalidConfig(msg));

        if self.start_layer < 1 {
            return fail("start_layer must leave room for the inner seed layer".into());
        }
        if !self.pair_window.is_valid() {
            return fail(format!("pair_window must be positive: {:?}", self.pair_window));
        }
        if !self.step_window.is_valid() {
            return fail(format!("step_window must be positive: {:?}", self.step_window));
        }
        if !(self.max_abs_eta.is_finite() && self.max_abs_eta > 0.0) {
            return fail(format!("max_abs_eta must be positive, got {}", self.max_abs_eta));
        }
        if self.min_hits < 2 {
            return fail(format!("min_hits must be at least 2, got {}", self.min_hits));
        }
        if let Some(cap) = self.max_curvature_spread {
            if cap.is_nan() || cap <= 0.0 {
                return fail(format!("max_curvature_spread must be positive, got {cap}"));
            }
        }
        if !(self.b_field_tesla.is_finite() && self.b_field_tesla > 0.0) {
            return fail(format!("b_field_tesla must be positive, got {}", self.b_field_tesla));
        }
        if !(self.units_per_meter.is_finite() && self.units_per_meter > 0.0) {
            return fail(format!(
                "units_per_meter must be positive, got {}",
                self.units_per_meter
            ));
        }
        if !(self.duplicate_tolerance.is_finite() && self.duplicate_tolerance >= 0.0) {
            return fail(format!(
                "duplicate_tolerance must be non-negative, got {}",
                self.duplicate_tolerance
            ));
        }
        if self.phi_bins == 0 {
            return fail("phi_bins must be at least 1".into());
        }
        if self.iterations == 0 {
            return fail("iterations must be at least 1".into());
        }
        if self.iterations > 1 && self.iteration_layer_step == 0 {
            return fail(format!(
                "{} iterations with iteration_layer_step 0 would repeat the same seeds",
                self.iterations
            ));
        }
        if self.start_layer_for(self.iterations - 1).is_none() {
            return fail(format!(
                "{} iterations stepping {} layers run below layer 1",
                self.iterations, self.iteration_layer_step
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SeedingConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.pt_constant() - 0.01 * 1.4 * 0.299792458).abs() < 1e-15);
    }

    #[test]
    fn test_start_layer_per_iteration() {
        let config = SeedingConfig {
            start_layer: 20,
            iterations: 3,
            iteration_layer_step: 7,
            ..SeedingConfig::default()
        };
        assert_eq!(config.start_layer_for(0), Some(20));
        assert_eq!(config.start_layer_for(1), Some(13));
        assert_eq!(config.start_layer_for(2), Some(6));
        assert_eq!(config.start_layer_for(3), None);
        assert!(config.validate().is_ok());

        let too_many = SeedingConfig {
            iterations: 4,
            ..config
        };
        assert!(matches!(
            too_many.validate(),
            Err(SeedingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = [
            SeedingConfig {
                start_layer: 0,
                ..SeedingConfig::default()
            },
            SeedingConfig {
                step_window: SearchWindow::new(0.0, 0.1),
                ..SeedingConfig::default()
            },
            SeedingConfig {
                min_hits: 1,
                ..SeedingConfig::default()
            },
            SeedingConfig {
                b_field_tesla: f64::NAN,
                ..SeedingConfig::default()
            },
            SeedingConfig {
                phi_bins: 0,
                ..SeedingConfig::default()
            },
            SeedingConfig {
                max_curvature_spread: Some(0.0),
                ..SeedingConfig::default()
            },
            SeedingConfig {
                max_curvature_spread: Some(f64::NAN),
                ..SeedingConfig::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    #[test]
    fn test_zero_layer_step_needs_single_iteration() {
        let repeated = SeedingConfig {
            iterations: 2,
            iteration_layer_step: 0,
            ..SeedingConfig::default()
        };
        assert!(matches!(
            repeated.validate(),
            Err(SeedingError::InvalidConfig(msg)) if msg.contains("iteration_layer_step")
        ));

        let single = SeedingConfig {
            iterations: 1,
            ..repeated
        };
        assert!(single.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SeedingConfig = serde_json::from_str(
            r#"{ "start_layer": 45, "units_per_meter": 1000.0, "step_window": { "phi": 0.003, "eta": 0.01 } }"#,
        )
        .unwrap();
        assert_eq!(config.start_layer, 45);
        assert_eq!(config.step_window, SearchWindow::new(0.003, 0.01));
        assert_eq!(config.pair_window, SeedingConfig::default().pair_window);
        assert_eq!(config.max_failures, 2);
        assert_eq!(config.max_curvature_spread, None);
        assert!(config.validate().is_ok());
    }
}
