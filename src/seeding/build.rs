//! Conversion of an accepted chain into a track record.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::extend::{Chain, Rejection};
use super::stats::RunningStats;
use super::SeedingContext;
use crate::angle::theta_of_eta;
use crate::track::{Covariance6, Track};
use crate::types::ClusterSource;

/// Summary statistics of a chain, kept on the track record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedQuality {
    pub pt: f64,
    pub pt_error: f64,
    pub mean_curvature: f64,
    pub curvature_std: f64,
    pub mean_phi_slope: f64,
    pub phi_slope_std: f64,
    pub mean_eta_slope: f64,
    pub eta_slope_std: f64,
    pub hits: usize,
    pub failures: usize,
}

impl SeedQuality {
    fn of(chain: &Chain, pt_constant: f64) -> Self {
        let kappa: RunningStats = chain.curvatures.iter().copied().collect();
        let phi: RunningStats = chain.phi_slopes.iter().copied().collect();
        let eta: RunningStats = chain.eta_slopes.iter().copied().collect();
        let mean_kappa = kappa.mean();

        Self {
            pt: pt_constant / mean_kappa.abs(),
            pt_error: pt_constant * kappa.std_dev() / (mean_kappa * mean_kappa),
            mean_curvature: mean_kappa,
            curvature_std: kappa.std_dev(),
            mean_phi_slope: phi.mean(),
            phi_slope_std: phi.std_dev(),
            mean_eta_slope: eta.mean(),
            eta_slope_std: eta.std_dev(),
            hits: chain.len(),
            failures: chain.failures,
        }
    }

    /// Curvature standard deviation over the magnitude of its mean.
    ///
    /// NaN for a single curvature sample.
    #[inline]
    pub fn relative_curvature_spread(&self) -> f64 {
        self.curvature_std / self.mean_curvature.abs()
    }
}

/// Build the track for `chain`.
///
/// The track starts at the event vertex with the direction of the
/// starting-layer hit. A single curvature sample leaves the spread undefined:
/// it passes the spread cap, and with a NaN pt error the momentum block stays zero.
pub fn build_track<C>(
    ctx: &SeedingContext<'_>,
    chain: &Chain,
    clusters: &C,
    id: u32,
) -> Result<Track, Rejection>
where
    C: ClusterSource + ?Sized,
{
    let quality = SeedQuality::of(chain, ctx.config.pt_constant());
    if quality.mean_curvature == 0.0 || !quality.pt.is_finite() {
        debug!(mean_curvature = quality.mean_curvature, "chain has no curvature signal");
        return Err(Rejection::NoCurvatureSignal);
    }
    if let Some(cap) = ctx.config.max_curvature_spread {
        let spread = quality.relative_curvature_spread();
        if spread > cap {
            debug!(spread, cap, hits = quality.hits, "curvature spread too large");
            return Err(Rejection::SpreadTooLarge);
        }
    }

    let charge: i8 = if chain.start_phi * quality.mean_curvature < 0.0 {
        1
    } else {
        -1
    };

    let (sin_phi, cos_phi) = chain.start_phi.sin_cos();
    let cot_theta = 1.0 / theta_of_eta(chain.start_eta).tan();
    let pt = quality.pt;
    let momentum = DVec3::new(pt * cos_phi, pt * sin_phi, pt * cot_theta);

    let mut covariance = Covariance6::ZERO;
    if let Some(first) = chain.keys.first().and_then(|&k| clusters.cluster(k)) {
        covariance.set_position_block(&first.covariance);
    }
    if quality.pt_error.is_finite() {
        let var = quality.pt_error * quality.pt_error;
        covariance.set(3, 3, var * cos_phi * cos_phi);
        covariance.set(4, 4, var * sin_phi * sin_phi);
        covariance.set(5, 5, var * cot_theta * cot_theta);
    }

    Ok(Track {
        id,
        keys: chain.keys.clone(),
        charge,
        momentum,
        position: ctx.vertex,
        covariance,
        ndf: 2 * chain.len() as i32 - 5,
        quality,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedingConfig;
    use crate::geometry::GeometryTable;
    use crate::index::PhiEtaIndex;
    use crate::types::{Cluster, HitKey};
    use glam::DMat3;

    const NO_CLUSTERS: &[Cluster] = &[];

    /// Builds with `config` and `vertex`; geometry and index are not read.
    fn build<C: ClusterSource + ?Sized>(
        config: &SeedingConfig,
        vertex: DVec3,
        chain: &Chain,
        clusters: &C,
        id: u32,
    ) -> Result<Track, Rejection> {
        let geometry = GeometryTable::default();
        let index = PhiEtaIndex::default();
        let ctx = SeedingContext {
            config,
            geometry: &geometry,
            index: &index,
            vertex,
        };
        build_track(&ctx, chain, clusters, id)
    }

    /// Config whose pt constant is `pt_constant`.
    fn config_with_pt_constant(pt_constant: f64) -> SeedingConfig {
        SeedingConfig {
            b_field_tesla: pt_constant / crate::config::GEV_PER_TESLA_METER,
            units_per_meter: 1.0,
            ..SeedingConfig::default()
        }
    }

    fn chain(curvatures: &[f64], start_phi: f64, start_eta: f64) -> Chain {
        let n = curvatures.len() + 1;
        Chain {
            keys: (0..n).map(|i| HitKey::new(45 - i as u8, 0)).collect(),
            curvatures: curvatures.to_vec(),
            phi_slopes: vec![-1e-3; n - 1],
            eta_slopes: vec![0.0; n - 1],
            start_phi,
            start_eta,
            failures: 1,
        }
    }

    #[test]
    fn test_momentum_and_charge() {
        let kappa = -2e-3;
        let c = chain(&[kappa, kappa, kappa, kappa], 1.0, 0.5);
        let config = SeedingConfig::default();
        let pt_constant = config.pt_constant();
        let track = build(&config, DVec3::ZERO, &c, NO_CLUSTERS, 4).unwrap();

        let pt = pt_constant / 2e-3;
        assert!((track.pt() - pt).abs() < 1e-12);
        assert!((track.momentum.x - pt * 1.0f64.cos()).abs() < 1e-12);
        assert!((track.momentum.z - pt * 0.5f64.sinh()).abs() < 1e-12);
        // phi > 0 and kappa < 0.
        assert_eq!(track.charge, 1);
        assert_eq!(track.id, 4);
        assert_eq!(track.ndf, 5);
        assert_eq!(track.quality.hits, 5);
        assert_eq!(track.quality.pt_error, 0.0);
        assert_eq!(track.position, DVec3::ZERO);
    }

    #[test]
    fn test_charge_flips_with_curvature() {
        let c = chain(&[2e-3, 2.1e-3], 1.0, 0.0);
        let track = build(&config_with_pt_constant(1.0), DVec3::ZERO, &c, NO_CLUSTERS, 0).unwrap();
        assert_eq!(track.charge, -1);
        assert!(track.momentum.z.abs() < 1e-12);
    }

    #[test]
    fn test_zero_mean_curvature_is_dropped() {
        let c = chain(&[1e-3, -1e-3], 1.0, 0.0);
        assert_eq!(
            build(&config_with_pt_constant(1.0), DVec3::ZERO, &c, NO_CLUSTERS, 0),
            Err(Rejection::NoCurvatureSignal)
        );
    }

    #[test]
    fn test_covariance_from_first_hit_and_pt_error() {
        let c = chain(&[-1e-3, -1.2e-3, -0.8e-3], 0.3, 1.0);
        let clusters = [
            Cluster::new(HitKey::new(45, 0), [1.0, 0.0, 0.0])
                .with_covariance(DMat3::from_diagonal(DVec3::new(0.01, 0.02, 0.03))),
            Cluster::new(HitKey::new(44, 0), [1.0, 0.0, 0.0])
                .with_covariance(DMat3::from_diagonal(DVec3::splat(9.0))),
        ];
        let track = build(&config_with_pt_constant(1.0), DVec3::ONE, &c, &clusters[..], 0).unwrap();
        let cov = track.covariance;
        assert!(cov.is_symmetric());
        assert_eq!(cov.diagonal()[..3], [0.01, 0.02, 0.03]);

        let sigma = 0.2e-3;
        let pt_err = sigma / 1e-6;
        assert!((track.quality.pt_error - pt_err).abs() / pt_err < 1e-9);
        let var = pt_err * pt_err;
        assert!((cov.get(3, 3) - var * 0.3f64.cos().powi(2)).abs() / var < 1e-9);
        assert!((cov.get(4, 4) - var * 0.3f64.sin().powi(2)).abs() / var < 1e-9);
        assert!((cov.get(5, 5) - var * 1.0f64.sinh().powi(2)).abs() / var < 1e-9);
        assert_eq!(cov.get(0, 3), 0.0);
        assert_eq!(track.position, DVec3::ONE);
    }

    #[test]
    fn test_single_curvature_sample_leaves_momentum_block_empty() {
        let c = chain(&[-1e-3, -1e-3], 0.3, 0.0);
        let c = Chain {
            keys: c.keys[..2].to_vec(),
            curvatures: c.curvatures[..1].to_vec(),
            phi_slopes: c.phi_slopes[..1].to_vec(),
            eta_slopes: c.eta_slopes[..1].to_vec(),
            ..c
        };
        let config = SeedingConfig {
            max_curvature_spread: Some(0.1),
            ..config_with_pt_constant(1.0)
        };
        let track = build(&config, DVec3::ZERO, &c, NO_CLUSTERS, 0).unwrap();
        assert!(track.quality.pt_error.is_nan());
        assert_eq!(track.covariance.diagonal()[3..], [0.0; 3]);
        assert_eq!(track.ndf, -1);
    }

    #[test]
    fn test_curvature_spread_cap() {
        // Sign flips: the spread is about 15 times the mean.
        let c = chain(&[1e-3, -0.9e-3, 5e-2, -4e-2], 1.0, 0.0);
        let open = config_with_pt_constant(1.0);
        let track = build(&open, DVec3::ZERO, &c, NO_CLUSTERS, 0).unwrap();
        assert!(track.quality.relative_curvature_spread() > 10.0);

        let capped = SeedingConfig {
            max_curvature_spread: Some(0.5),
            ..open
        };
        assert_eq!(
            build(&capped, DVec3::ZERO, &c, NO_CLUSTERS, 0),
            Err(Rejection::SpreadTooLarge)
        );

        // A consistent chain passes the same cap.
        let steady = chain(&[-1e-3, -1.1e-3, -0.95e-3, -1.05e-3], 1.0, 0.0);
        let track = build(&capped, DVec3::ZERO, &steady, NO_CLUSTERS, 0).unwrap();
        assert!(track.quality.relative_curvature_spread() < 0.5);
    }
}
