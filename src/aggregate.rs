use serde_derive::Serialize;
use std::collections::BTreeMap;

use crate::config::FilterConfig;
use crate::metrics::{PlayerRecord, PlayerStore};

/// A retained player with its derived ratings.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PlayerSummary {
    pub record: PlayerRecord,
    pub average_speed: f32,
    pub total_distance: f32,
    pub performance_score: f32,
}

impl PlayerSummary {
    pub fn new(record: PlayerRecord) -> Self {
        let average_speed = record.average_speed();
        let total_distance = record.total_distance();
        let performance_score =
            performance_score(average_speed, total_distance, record.direction_changes);

        Self {
            record,
            average_speed,
            total_distance,
            performance_score,
        }
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct FilteredAggregate {
    pub players: BTreeMap<u32, PlayerSummary>,
    pub total_raw_tracks: usize,
    pub total_retained: usize,
    pub roster_exceeded: bool,
}

impl FilteredAggregate {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&u32, &PlayerSummary)> {
        self.players.iter()
    }
}

/// `(mean(speed) * 2 + total_distance / 100 + direction_changes * 3) / 6`
pub fn performance_score(average_speed: f32, total_distance: f32, direction_changes: u32) -> f32 {
    (average_speed * 2.0 + total_distance / 100.0 + direction_changes as f32 * 3.0) / 6.0
}

/// Whether a record moved far enough, for long enough, to be a real player.
#[inline]
pub fn is_retained(record: &PlayerRecord, config: &FilterConfig) -> bool {
    record.total_distance() > config.min_movement && record.speed.len() > config.min_frames
}

pub fn finalize(store: &PlayerStore, config: &FilterConfig) -> FilteredAggregate {
    let players: BTreeMap<u32, PlayerSummary> = store
        .iter()
        .filter(|(_, record)| is_retained(record, config))
        .map(|(&id, record)| (id, PlayerSummary::new(record.clone())))
        .collect();

    let total_raw_tracks = store.len();
    let total_retained = players.len();
    let roster_exceeded = total_retained > config.roster_cap;

    log::info!(
        "Total Players Processed: {} (Filtered from {})",
        total_retained,
        total_raw_tracks
    );

    if roster_exceeded {
        log::warn!(
            "More than {} players detected ({}). Check tracking system for duplicate IDs!",
            config.roster_cap,
            total_retained
        );
    }

    FilteredAggregate {
        players,
        total_raw_tracks,
        total_retained,
        roster_exceeded,
    }
}
