//! Per-player motion history and the metrics derived from it.

use nalgebra as na;
use serde_derive::Serialize;
use std::collections::BTreeMap;
use std::f32::consts::FRAC_PI_6;

use crate::math;

/// Turning angle above which a step counts as a direction change.
pub const DIRECTION_CHANGE_THRESHOLD: f32 = FRAC_PI_6;

/// Pixel displacement per frame times frame rate, divided by this, gives speed.
pub const SPEED_SCALE: f32 = 100.0;

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct PlayerRecord {
    pub positions: Vec<(f32, f32)>,
    pub distances: Vec<f32>,
    pub speed: Vec<f32>,
    pub direction_changes: u32,
    pub first_frame: u64,
    pub last_frame: u64,
}

impl PlayerRecord {
    /// Appends one centroid sample, deriving distance, speed and direction
    /// change from the samples already held.
    pub fn push(&mut self, frame: u64, centroid: na::Point2<f32>, frame_rate: u32) {
        let current = centroid;

        if let Some(&(px, py)) = self.positions.last() {
            let prev = na::Point2::new(px, py);
            let distance = na::distance(&prev, &current);

            self.distances.push(distance);
            self.speed.push(distance * frame_rate as f32 / SPEED_SCALE);

            if self.positions.len() > 1 {
                let (qx, qy) = self.positions[self.positions.len() - 2];
                let prev2 = na::Point2::new(qx, qy);

                if math::turning_angle(&prev2, &prev, &current) > DIRECTION_CHANGE_THRESHOLD {
                    self.direction_changes += 1;
                }
            }
        } else {
            self.first_frame = frame;
        }

        self.positions.push((current.x, current.y));
        self.last_frame = frame;
    }

    #[inline]
    pub fn total_distance(&self) -> f32 {
        self.distances.iter().sum()
    }

    #[inline]
    pub fn average_speed(&self) -> f32 {
        math::mean(&self.speed)
    }

    #[inline]
    pub fn cumulative_distance(&self) -> Vec<f32> {
        math::cumsum(&self.distances)
    }
}

/// All player records of one run, keyed and ordered by track id.
#[derive(Debug, Clone, Default)]
pub struct PlayerStore {
    players: BTreeMap<u32, PlayerRecord>,
}

impl PlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record of `track_id`, created empty on first access.
    #[inline]
    pub fn entry(&mut self, track_id: u32) -> &mut PlayerRecord {
        self.players.entry(track_id).or_default()
    }

    pub fn update(
        &mut self,
        track_id: u32,
        frame: u64,
        centroid: na::Point2<f32>,
        frame_rate: u32,
    ) {
        self.entry(track_id).push(frame, centroid, frame_rate);
    }

    #[inline]
    pub fn get(&self, track_id: u32) -> Option<&PlayerRecord> {
        self.players.get(&track_id)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&u32, &PlayerRecord)> {
        self.players.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
