use serde_derive::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Association thresholds of the BYTE-style tracker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Detections at or above this confidence take part in the first pass.
    pub activation_threshold: f32,

    /// Detections below this confidence are ignored entirely.
    pub low_confidence_threshold: f32,

    /// Extra confidence over `activation_threshold` required to start a track.
    pub new_track_margin: f32,

    /// Maximum `1 - IoU` cost accepted in the first pass.
    pub matching_threshold: f32,

    /// Maximum `1 - IoU` cost accepted in the low-confidence pass.
    pub low_matching_threshold: f32,

    /// Frames a lost track is kept, at 30 fps; scaled by the stream frame rate.
    pub lost_track_buffer: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            activation_threshold: 0.25,
            low_confidence_threshold: 0.1,
            new_track_margin: 0.1,
            matching_threshold: 0.8,
            low_matching_threshold: 0.5,
            lost_track_buffer: 30,
        }
    }
}

impl TrackerConfig {
    /// Lost-track retention in frames for the given stream rate.
    pub fn max_frames_lost(&self, frame_rate: u32) -> u32 {
        (frame_rate as f32 / 30.0 * self.lost_track_buffer as f32).round() as u32
    }
}

/// Retention thresholds applied once the stream ends.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    /// Minimum total displacement in pixels.
    pub min_movement: f32,

    /// Minimum number of speed samples.
    pub min_frames: usize,

    /// Retained player count above which the run is flagged (two 11-a-side rosters).
    pub roster_cap: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_movement: 10.0,
            min_frames: 5,
            roster_cap: 22,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub tracker: TrackerConfig,
    pub filter: FilterConfig,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            filter: FilterConfig::default(),
            output_dir: PathBuf::from("metrics"),
        }
    }
}

impl Config {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let t = &self.tracker;

        for (name, value) in [
            ("activation_threshold", t.activation_threshold),
            ("low_confidence_threshold", t.low_confidence_threshold),
            ("new_track_margin", t.new_track_margin),
            ("matching_threshold", t.matching_threshold),
            ("low_matching_threshold", t.low_matching_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if t.low_confidence_threshold > t.activation_threshold {
            return Err(Error::InvalidConfig(
                "low_confidence_threshold must not exceed activation_threshold".to_string(),
            ));
        }

        // confidence never exceeds 1, so no track could start
        if t.activation_threshold + t.new_track_margin > 1.0 {
            return Err(Error::InvalidConfig(format!(
                "activation_threshold + new_track_margin must not exceed 1, got {}",
                t.activation_threshold + t.new_track_margin
            )));
        }

        if !self.filter.min_movement.is_finite() {
            return Err(Error::InvalidConfig(
                "min_movement must be finite".to_string(),
            ));
        }

        Ok(())
    }
}
