pub mod aggregate;
pub mod analysis;
pub mod bbox;
pub mod config;
pub mod detection;
pub mod detector;
pub mod error;
pub mod frame;
pub mod math;
pub mod metrics;
pub mod replay;
pub mod report;
pub mod scene;
pub mod tracker;

mod circular_queue;
mod track;

pub use aggregate::{finalize, FilteredAggregate, PlayerSummary};
pub use analysis::Analysis;
pub use config::{Config, FilterConfig, TrackerConfig};
pub use detection::{Detection, PERSON_CLASS};
pub use frame::{FrameSource, StreamInfo, VideoFrame};
pub use metrics::{PlayerRecord, PlayerStore};
pub use track::{Track, TrackState};

use error::Error;
use std::rc::Rc;

pub trait Tracking {
    /// Associates one frame of person detections; returns the tracks matched in it.
    fn update(&mut self, frame: u64, dets: &[Detection]) -> Result<Vec<Track>, Error>;
    fn tracks(&self) -> Rc<[Track]>;
    fn reset(&mut self);
}

/// Two-pass (high then low confidence) IoU tracker.
pub struct ByteTracker {
    scene: scene::Scene,
}

impl ByteTracker {
    pub fn new(config: TrackerConfig, frame_rate: u32) -> Self {
        Self {
            scene: scene::Scene::new(config, frame_rate),
        }
    }
}

impl Default for ByteTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default(), 30)
    }
}

impl crate::Tracking for ByteTracker {
    fn update(&mut self, frame: u64, dets: &[Detection]) -> Result<Vec<Track>, Error> {
        self.scene.update(frame, dets)?;

        Ok(self.scene.matched())
    }

    #[inline]
    fn tracks(&self) -> Rc<[Track]> {
        self.scene.tracks().into_boxed_slice().into()
    }

    #[inline]
    fn reset(&mut self) {
        self.scene.reset();
    }
}
