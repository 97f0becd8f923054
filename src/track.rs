//! Track records and the sinks that receive them.

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::seeding::SeedQuality;
use crate::types::HitKey;

/// Symmetric 6x6 covariance over (x, y, z, px, py, pz).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Covariance6(pub [[f64; 6]; 6]);

impl Covariance6 {
    pub const ZERO: Self = Self([[0.0; 6]; 6]);

    /// Set `(row, col)` and its mirror.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.0[row][col] = value;
        self.0[col][row] = value;
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[row][col]
    }

    /// Copy a 3x3 block into the position sub-block.
    pub fn set_position_block(&mut self, m: &DMat3) {
        for row in 0..3 {
            for col in row..3 {
                self.set(row, col, m.col(col)[row]);
            }
        }
    }

    pub fn diagonal(&self) -> [f64; 6] {
        std::array::from_fn(|i| self.0[i][i])
    }

    pub fn is_symmetric(&self) -> bool {
        (0..6).all(|r| (r + 1..6).all(|c| self.0[r][c] == self.0[c][r]))
    }
}

/// One seed track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: u32,
    /// Hit keys, outermost layer first.
    pub keys: Vec<HitKey>,
    /// +1 or −1.
    pub charge: i8,
    /// Momentum in GeV/c.
    pub momentum: DVec3,
    /// Reference position (the event vertex).
    pub position: DVec3,
    pub covariance: Covariance6,
    /// Degrees of freedom of a helix through the hits: `2 * n − 5`.
    pub ndf: i32,
    pub quality: SeedQuality,
}

impl Track {
    #[inline]
    pub fn num_hits(&self) -> usize {
        self.keys.len()
    }

    /// Transverse momentum.
    #[inline]
    pub fn pt(&self) -> f64 {
        self.momentum.truncate().length()
    }
}

/// Receives finished tracks and stores them under an id.
pub trait TrackSink {
    /// Store `track`; returns the id it was stored under.
    fn store(&mut self, track: Track) -> u32;
}

impl TrackSink for Vec<Track> {
    fn store(&mut self, track: Track) -> u32 {
        let id = track.id;
        self.push(track);
        id
    }
}

/// Id-keyed track collection.
///
/// A track keeps the id it arrives with unless that id is taken; it is then
/// stored under the next free id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMap {
    tracks: BTreeMap<u32, Track>,
}

impl TrackMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Track> {
        self.tracks.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> + '_ {
        self.tracks.values()
    }

    fn free_id(&self, wanted: u32) -> u32 {
        if !self.tracks.contains_key(&wanted) {
            return wanted;
        }
        self.tracks
            .keys()
            .next_back()
            .map_or(0, |&last| last.saturating_add(1))
    }
}

impl TrackSink for TrackMap {
    fn store(&mut self, mut track: Track) -> u32 {
        let id = self.free_id(track.id);
        track.id = id;
        self.tracks.insert(id, track);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: u32) -> Track {
        Track {
            id,
            keys: vec![HitKey::new(45, 0), HitKey::new(44, 0), HitKey::new(43, 0)],
            charge: 1,
            momentum: DVec3::new(1.0, 0.0, 0.5),
            position: DVec3::ZERO,
            covariance: Covariance6::ZERO,
            ndf: 1,
            quality: SeedQuality::default(),
        }
    }

    #[test]
    fn test_covariance_set_is_symmetric() {
        let mut cov = Covariance6::ZERO;
        cov.set(0, 4, 2.5);
        cov.set(3, 3, 1.0);
        assert_eq!(cov.get(4, 0), 2.5);
        assert!(cov.is_symmetric());
        assert_eq!(cov.diagonal(), [0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

        cov.0[1][2] = 1.0;
        assert!(!cov.is_symmetric());
    }

    #[test]
    fn test_position_block() {
        let m = DMat3::from_cols(
            DVec3::new(1.0, 0.1, 0.2),
            DVec3::new(0.1, 2.0, 0.3),
            DVec3::new(0.2, 0.3, 3.0),
        );
        let mut cov = Covariance6::ZERO;
        cov.set_position_block(&m);
        assert_eq!(cov.get(1, 2), 0.3);
        assert_eq!(cov.get(2, 1), 0.3);
        assert_eq!(cov.diagonal()[..3], [1.0, 2.0, 3.0]);
        assert!(cov.is_symmetric());
    }

    #[test]
    fn test_track_map_keeps_or_reassigns_ids() {
        let mut map = TrackMap::new();
        assert_eq!(map.store(track(0)), 0);
        assert_eq!(map.store(track(1)), 1);
        assert_eq!(map.store(track(7)), 7);
        // 1 is taken; next free after the highest id.
        assert_eq!(map.store(track(1)), 8);
        assert_eq!(map.len(), 4);
        assert_eq!(map.get(8).map(|t| t.id), Some(8));
    }

    #[test]
    fn test_vec_sink_and_pt() {
        let mut tracks: Vec<Track> = Vec::new();
        assert_eq!(tracks.store(track(3)), 3);
        assert_eq!(tracks.len(), 1);
        assert!((tracks[0].pt() - 1.0).abs() < 1e-15);
        assert_eq!(tracks[0].num_hits(), 3);
    }
}
