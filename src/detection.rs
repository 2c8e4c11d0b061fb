use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};
use crate::error::Error;

/// COCO class id of `person`.
pub const PERSON_CLASS: i32 = 0;

/// Contains (x1,y1) top-left and (x2,y2) bottom-right corners of bbox, in pixels
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub bbox: [f32; 4],
    pub class: i32,
    pub confidence: f32,
}

impl Detection {
    #[inline]
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, class: i32, confidence: f32) -> Self {
        Self {
            bbox: [x1, y1, x2, y2],
            class,
            confidence,
        }
    }

    /// Person detection given its center and size.
    pub fn person_at(cx: f32, cy: f32, w: f32, h: f32, confidence: f32) -> Self {
        let b = BBox::xywh(cx, cy, w, h).as_ltrb();

        Self::new(b.left(), b.top(), b.right(), b.bottom(), PERSON_CLASS, confidence)
    }

    #[inline(always)]
    pub fn bbox(&self) -> BBox<Ltrb> {
        let [x1, y1, x2, y2] = self.bbox;
        BBox::ltrb(x1, y1, x2, y2)
    }

    #[inline(always)]
    pub fn is_person(&self) -> bool {
        self.class == PERSON_CLASS
    }

    /// Box midpoint truncated to whole pixels.
    pub fn centroid(&self) -> na::Point2<f32> {
        let c = self.bbox().center();

        na::Point2::new(c.x.trunc(), c.y.trunc())
    }

    /// Rejects records that would corrupt a track's history.
    pub fn validate(&self, frame: u64) -> Result<(), Error> {
        let malformed = |reason: String| Error::MalformedDetection { frame, reason };
        let bbox = self.bbox();

        if !bbox.is_finite() {
            return Err(malformed(format!("non-finite bbox {:?}", self.bbox)));
        }

        if bbox.right() < bbox.left() || bbox.bottom() < bbox.top() {
            return Err(malformed(format!("inverted bbox {:?}", self.bbox)));
        }

        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(malformed(format!(
                "confidence {} outside [0, 1]",
                self.confidence
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centroid_truncates() {
        let det = Detection::new(0.0, 0.0, 11.0, 5.0, PERSON_CLASS, 0.9);

        assert_eq!(det.centroid(), na::Point2::new(5.0, 2.0));
    }

    #[test]
    fn test_person_at() {
        let det = Detection::person_at(50.0, 100.0, 20.0, 40.0, 0.8);

        assert_eq!(det.bbox, [40.0, 80.0, 60.0, 120.0]);
        assert!(det.is_person());
    }

    #[test]
    fn test_validate_rejects_bad_records() {
        let ok = Detection::new(0.0, 0.0, 10.0, 10.0, 0, 0.5);
        assert!(ok.validate(0).is_ok());

        let nan = Detection::new(f32::NAN, 0.0, 10.0, 10.0, 0, 0.5);
        let inverted = Detection::new(10.0, 0.0, 0.0, 10.0, 0, 0.5);
        let conf = Detection::new(0.0, 0.0, 10.0, 10.0, 0, 1.5);

        for det in [nan, inverted, conf] {
            match det.validate(7) {
                Err(Error::MalformedDetection { frame, .. }) => assert_eq!(frame, 7),
                other => panic!("expected malformed detection, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_deserialize_requires_all_fields() {
        let det: Detection =
            serde_json::from_str(r#"{"bbox":[1,2,3,4],"class":0,"confidence":0.5}"#).unwrap();
        assert_eq!(det.bbox, [1.0, 2.0, 3.0, 4.0]);

        let missing = serde_json::from_str::<Detection>(r#"{"bbox":[1,2,3,4],"class":0}"#);
        assert!(missing.is_err());
    }
}
