//! Frame-sequential fold: detections -> tracker -> per-player metrics.

use crate::aggregate::{finalize, FilteredAggregate};
use crate::config::{Config, FilterConfig};
use crate::detection::Detection;
use crate::detector::{Detector, PersonDetector};
use crate::error::Error;
use crate::frame::{FrameSource, StreamInfo};
use crate::metrics::PlayerStore;
use crate::{ByteTracker, Track, Tracking};

/// Owns the tracker and the player store for one stream.
///
/// `finish` consumes the analysis, so the store cannot change once the
/// aggregate has been computed.
pub struct Analysis<T: Tracking = ByteTracker> {
    info: StreamInfo,
    tracker: T,
    store: PlayerStore,
    filter: FilterConfig,
    frames: u64,
}

impl Analysis<ByteTracker> {
    pub fn new(info: StreamInfo, config: &Config) -> Self {
        let tracker = ByteTracker::new(config.tracker.clone(), info.frame_rate);

        Self::with_tracker(info, tracker, config.filter.clone())
    }
}

impl<T: Tracking> Analysis<T> {
    pub fn with_tracker(info: StreamInfo, tracker: T, filter: FilterConfig) -> Self {
        Self {
            info,
            tracker,
            store: PlayerStore::new(),
            filter,
            frames: 0,
        }
    }

    /// Feeds one frame of raw detections. Every record is validated; only
    /// persons reach the tracker. Returns the tracks matched in this frame.
    pub fn process(&mut self, frame: u64, detections: &[Detection]) -> Result<Vec<Track>, Error> {
        for det in detections {
            det.validate(frame)?;
        }

        let persons: Vec<Detection> = detections
            .iter()
            .filter(|d| d.is_person())
            .copied()
            .collect();

        let tracks = self.tracker.update(frame, &persons)?;

        for track in &tracks {
            self.store
                .update(track.track_id, frame, track.centroid(), self.info.frame_rate);
        }

        log::debug!(
            "frame {}: {} persons, {} tracked",
            frame,
            persons.len(),
            tracks.len()
        );

        self.frames += 1;

        Ok(tracks)
    }

    #[inline]
    pub fn info(&self) -> StreamInfo {
        self.info
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[inline]
    pub fn store(&self) -> &PlayerStore {
        &self.store
    }

    #[inline]
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn finish(self) -> FilteredAggregate {
        log::info!("processed {} frames", self.frames);

        finalize(&self.store, &self.filter)
    }
}

/// Consumes `source` until it is exhausted or `stop` returns true for the
/// next frame index, then finalizes.
pub fn run_until<S, D, F>(
    source: &mut S,
    detector: D,
    config: &Config,
    mut stop: F,
) -> Result<FilteredAggregate, Error>
where
    S: FrameSource,
    D: Detector,
    F: FnMut(u64) -> bool,
{
    let info = source.info();
    log::info!(
        "stream {}x{} @ {} fps",
        info.width,
        info.height,
        info.frame_rate
    );

    let mut detector = PersonDetector::new(detector);
    let mut analysis = Analysis::new(info, config);

    while let Some(frame) = source.next_frame()? {
        if stop(frame.index) {
            log::info!("stopped before frame {}", frame.index);
            break;
        }

        let persons = detector.detect(&frame)?;
        analysis.process(frame.index, &persons)?;
    }

    Ok(analysis.finish())
}

pub fn run<S: FrameSource, D: Detector>(
    source: &mut S,
    detector: D,
    config: &Config,
) -> Result<FilteredAggregate, Error> {
    run_until(source, detector, config, |_| false)
}
