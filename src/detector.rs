use crate::detection::Detection;
use crate::error::Error;
use crate::frame::VideoFrame;

/// Object detector boundary: one frame in, candidate boxes out.
pub trait Detector {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<Detection>, Error>;
}

impl<D: Detector + ?Sized> Detector for &mut D {
    #[inline]
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<Detection>, Error> {
        (**self).detect(frame)
    }
}

/// Validates every record of the wrapped detector and keeps persons only.
pub struct PersonDetector<D> {
    inner: D,
}

impl<D: Detector> PersonDetector<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: Detector> Detector for PersonDetector<D> {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<Detection>, Error> {
        let mut dets = self.inner.detect(frame)?;

        for det in &dets {
            det.validate(frame.index)?;
        }

        dets.retain(Detection::is_person);

        Ok(dets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<Detection>);

    impl Detector for Fixed {
        fn detect(&mut self, _frame: &VideoFrame) -> Result<Vec<Detection>, Error> {
            Ok(self.0.clone())
        }
    }

    fn frame(index: u64) -> VideoFrame {
        VideoFrame {
            index,
            dims: (640, 480),
            data: Vec::new(),
        }
    }

    #[test]
    fn test_keeps_persons_only() {
        let mut det = PersonDetector::new(Fixed(vec![
            Detection::new(0.0, 0.0, 10.0, 10.0, 0, 0.9),
            Detection::new(0.0, 0.0, 10.0, 10.0, 32, 0.9),
        ]));

        let dets = det.detect(&frame(0)).unwrap();
        assert_eq!(dets.len(), 1);
        assert!(dets[0].is_person());
    }

    #[test]
    fn test_fails_fast_on_malformed_record() {
        // non-person records are validated too
        let mut det = PersonDetector::new(Fixed(vec![Detection::new(
            0.0,
            0.0,
            f32::INFINITY,
            10.0,
            2,
            0.9,
        )]));

        assert!(matches!(
            det.detect(&frame(4)),
            Err(Error::MalformedDetection { frame: 4, .. })
        ));
    }
}
