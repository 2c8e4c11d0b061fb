use nalgebra as na;

use crate::bbox::{BBox, Ltrb};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Active,
    Lost,
}

#[derive(Debug, Clone)]
pub struct Track {
    pub track_id: u32,
    pub state: TrackState,
    pub frames_since_update: u32,
    pub class: i32,
    pub confidence: f32,
    pub bbox: BBox<Ltrb>,
}

impl Track {
    /// Box midpoint truncated to whole pixels.
    #[inline]
    pub fn centroid(&self) -> na::Point2<f32> {
        let c = self.bbox.center();

        na::Point2::new(c.x.trunc(), c.y.trunc())
    }
}
