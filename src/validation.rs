//! Consistency checks for seeded tracks.
//!
//! Useful for tests and for catching numerical issues in the builder.

use rustc_hash::FxHashSet;

use crate::geometry::GeometryTable;
use crate::track::Track;

/// Result of checking a set of tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackValidationReport {
    pub num_tracks: usize,
    /// Tracks whose layers are not strictly decreasing, or that repeat a key.
    pub bad_layer_order: usize,
    /// Tracks with a hit on a layer missing from the geometry.
    pub unknown_layers: usize,
    /// Charge other than ±1.
    pub bad_charge: usize,
    /// Non-finite momentum or position.
    pub non_finite: usize,
    /// Asymmetric covariance, or a negative diagonal term.
    pub bad_covariance: usize,
    /// Ids used by more than one track.
    pub duplicate_ids: usize,
    /// Hit keys that appear in more than one track. Informational: seeds may share hits.
    pub shared_keys: usize,
}

impl TrackValidationReport {
    pub fn is_valid(&self) -> bool {
        self.bad_layer_order == 0
            && self.unknown_layers == 0
            && self.bad_charge == 0
            && self.non_finite == 0
            && self.bad_covariance == 0
            && self.duplicate_ids == 0
    }

    /// Format a summary of any issues found.
    pub fn summary(&self) -> String {
        let checks = [
            (self.bad_layer_order, "with bad layer order"),
            (self.unknown_layers, "on unknown layers"),
            (self.bad_charge, "with bad charge"),
            (self.non_finite, "with non-finite kinematics"),
            (self.bad_covariance, "with bad covariance"),
            (self.duplicate_ids, "with duplicate ids"),
        ];
        let issues: Vec<String> = checks
            .iter()
            .filter(|(n, _)| *n > 0)
            .map(|(n, what)| format!("{n} tracks {what}"))
            .collect();
        if issues.is_empty() {
            "Valid".to_string()
        } else {
            issues.join(", ")
        }
    }
}

impl std::fmt::Display for TrackValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TrackValidationReport {{ tracks={}, shared_keys={}, {} }}",
            self.num_tracks,
            self.shared_keys,
            self.summary()
        )
    }
}

fn layers_strictly_decreasing(track: &Track) -> bool {
    track
        .keys
        .windows(2)
        .all(|w| w[0].layer() > w[1].layer())
}

fn covariance_ok(track: &Track) -> bool {
    let cov = &track.covariance;
    cov.is_symmetric() && cov.diagonal().iter().all(|&d| d.is_finite() && d >= 0.0)
}

/// Check every track against the geometry it was seeded with.
pub fn validate_tracks(tracks: &[Track], geometry: &GeometryTable) -> TrackValidationReport {
    let mut report = TrackValidationReport {
        num_tracks: tracks.len(),
        ..TrackValidationReport::default()
    };
    let mut ids = FxHashSet::default();
    let mut seen_keys = FxHashSet::default();
    let mut shared = FxHashSet::default();

    for track in tracks {
        let unique: FxHashSet<_> = track.keys.iter().collect();
        if unique.len() < track.keys.len() || !layers_strictly_decreasing(track) {
            report.bad_layer_order += 1;
        }
        if track.keys.iter().any(|k| !geometry.contains(k.layer())) {
            report.unknown_layers += 1;
        }
        if track.charge != 1 && track.charge != -1 {
            report.bad_charge += 1;
        }
        if !track.momentum.is_finite() || !track.position.is_finite() {
            report.non_finite += 1;
        }
        if !covariance_ok(track) {
            report.bad_covariance += 1;
        }
        if !ids.insert(track.id) {
            report.duplicate_ids += 1;
        }
        for &key in unique {
            if !seen_keys.insert(key) {
                shared.insert(key);
            }
        }
    }

    report.shared_keys = shared.len();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeding::SeedQuality;
    use crate::track::Covariance6;
    use crate::types::HitKey;
    use glam::DVec3;

    fn geometry() -> GeometryTable {
        GeometryTable::from_radii((39..=45).map(|l| (l, l as f64))).unwrap()
    }

    fn track(id: u32, layers: &[u8]) -> Track {
        Track {
            id,
            keys: layers.iter().map(|&l| HitKey::new(l, id)).collect(),
            charge: 1,
            momentum: DVec3::new(1.0, 0.0, 0.0),
            position: DVec3::ZERO,
            covariance: Covariance6::ZERO,
            ndf: 2 * layers.len() as i32 - 5,
            quality: SeedQuality::default(),
        }
    }

    #[test]
    fn test_clean_tracks_are_valid() {
        let report = validate_tracks(&[track(0, &[45, 44, 43]), track(1, &[45, 43, 41])], &geometry());
        assert!(report.is_valid(), "{report}");
        assert_eq!(report.summary(), "Valid");
        assert_eq!(report.shared_keys, 0);
    }

    #[test]
    fn test_each_check_fires() {
        let mut bad_charge = track(2, &[45, 44, 43]);
        bad_charge.charge = 0;
        let mut bad_momentum = track(3, &[45, 44, 43]);
        bad_momentum.momentum.z = f64::NAN;
        let mut bad_cov = track(4, &[45, 44, 43]);
        bad_cov.covariance.set(3, 3, -1.0);

        let tracks = [
            track(0, &[45, 43, 44]),
            track(1, &[45, 44, 30]),
            bad_charge,
            bad_momentum,
            bad_cov,
            track(4, &[45, 44, 43]),
        ];
        let report = validate_tracks(&tracks, &geometry());
        assert!(!report.is_valid());
        assert_eq!(report.bad_layer_order, 1);
        assert_eq!(report.unknown_layers, 1);
        assert_eq!(report.bad_charge, 1);
        assert_eq!(report.non_finite, 1);
        assert_eq!(report.bad_covariance, 1);
        assert_eq!(report.duplicate_ids, 1);
        // Tracks 4 and the second id-4 track use the same keys.
        assert_eq!(report.shared_keys, 3);
    }

    #[test]
    fn test_repeated_key_is_bad_order() {
        let mut t = track(0, &[45, 44]);
        t.keys.push(HitKey::new(44, 0));
        let report = validate_tracks(&[t], &geometry());
        assert_eq!(report.bad_layer_order, 1);
    }
}
