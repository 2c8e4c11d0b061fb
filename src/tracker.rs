use crate::bbox::{BBox, Ltrb};
use crate::circular_queue::CircularQueue;
use nalgebra as na;

const HISTORY_LEN: usize = 8;
const VELOCITY_SMOOTHING: f32 = 0.2;

/// Constant-velocity motion model of a single tracked box.
#[derive(Debug)]
pub struct Object {
    pub history: CircularQueue<(u64, na::Point2<f32>)>,
    pub vel: na::Vector2<f32>,
    pub bbox: BBox<Ltrb>,
    pub frame: u64,
    pub initialized: bool,
}

impl Object {
    pub fn new(frame: u64, bbox: BBox<Ltrb>) -> Self {
        let mut history = CircularQueue::with_capacity(HISTORY_LEN);
        history.push((frame, bbox.center()));

        Self {
            history,
            vel: na::Vector2::zeros(),
            bbox,
            frame,
            initialized: false,
        }
    }

    /// Box extrapolated to `frame` from the last observation.
    #[inline]
    pub fn predict(&self, frame: u64) -> BBox<Ltrb> {
        let dt = frame.saturating_sub(self.frame) as f32;

        self.bbox.translated(self.vel * dt)
    }

    /// Velocity over the retained window, newest against oldest sample.
    fn window_velocity(&self) -> Option<na::Vector2<f32>> {
        let mut iter = self.history.iter();
        let (newest_frame, newest) = iter.next()?;
        let (oldest_frame, oldest) = iter.last()?;

        let dt = newest_frame.checked_sub(*oldest_frame)?;
        if dt == 0 {
            return None;
        }

        Some((newest - oldest) / dt as f32)
    }

    pub fn update(&mut self, frame: u64, bbox: BBox<Ltrb>) {
        self.history.push((frame, bbox.center()));

        if let Some(vel) = self.window_velocity() {
            if self.initialized {
                self.vel = self.vel * (1.0 - VELOCITY_SMOOTHING) + vel * VELOCITY_SMOOTHING;
            } else {
                self.vel = vel;
                self.initialized = true;
            }
        }

        self.bbox = bbox;
        self.frame = frame;
    }
}
