use std::cmp::Ordering;

use crate::bbox::{BBox, Ltrb};
use crate::config::TrackerConfig;
use crate::error::Error;
use crate::track::{Track, TrackState};
use crate::tracker::Object;
use crate::Detection;

use munkres::{solve_assignment, WeightMatrix};

// cost of padded rows and columns of the square assignment matrix
const PADDING_COST: f32 = 100000.0;

pub struct IndexedSlice<'a, T> {
    pub slice: &'a [T],
    idxs: Vec<usize>,
}

impl<'a, T> IndexedSlice<'a, T> {
    pub fn new(slice: &'a [T]) -> Self {
        Self {
            slice,
            idxs: (0..slice.len()).collect(),
        }
    }

    pub fn new_with_indexes(slice: &'a [T], idxs: Vec<usize>) -> Self {
        Self { slice, idxs }
    }

    #[inline]
    pub fn get_index(&self, idx: usize) -> usize {
        self.idxs[idx]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.idxs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idxs.is_empty()
    }

    #[inline]
    pub fn indexes(&self) -> &[usize] {
        &self.idxs
    }
}

impl<'a, T> std::ops::Index<usize> for IndexedSlice<'a, T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.slice[self.idxs[index]]
    }
}

/// Descending confidence, ties broken by top-left corner.
fn detection_order(a: &Detection, b: &Detection) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then(a.bbox[0].total_cmp(&b.bbox[0]))
        .then(a.bbox[1].total_cmp(&b.bbox[1]))
}

#[derive(Debug)]
pub struct Participant {
    pub id: u32,
    pub state: TrackState,
    pub frames_since_update: u32,
    pub last_detection: Detection,
    pub predicted: BBox<Ltrb>,
    pub object: Object,
}

impl Participant {
    pub fn new(id: u32, frame: u64, det: &Detection) -> Self {
        Self {
            id,
            state: TrackState::Active,
            frames_since_update: 0,
            last_detection: *det,
            predicted: det.bbox(),
            object: Object::new(frame, det.bbox()),
        }
    }

    pub fn update(&mut self, frame: u64, det: &Detection) {
        self.object.update(frame, det.bbox());
        self.last_detection = *det;
        self.state = TrackState::Active;
        self.frames_since_update = 0;
    }

    pub fn mark_missed(&mut self) {
        self.state = TrackState::Lost;
        self.frames_since_update += 1;
    }
}

impl From<&Participant> for Track {
    fn from(p: &Participant) -> Track {
        Track {
            track_id: p.id,
            state: p.state,
            frames_since_update: p.frames_since_update,
            class: p.last_detection.class,
            confidence: p.last_detection.confidence,
            bbox: p.last_detection.bbox(),
        }
    }
}

type Matches = Vec<(usize, usize, f32)>;

/// Association state of one stream.
pub struct Scene {
    pub tracks: Vec<Participant>,
    config: TrackerConfig,
    max_frames_lost: u32,
    next_id: u32,
}

impl Scene {
    pub fn new(config: TrackerConfig, frame_rate: u32) -> Self {
        let max_frames_lost = config.max_frames_lost(frame_rate);

        Self {
            tracks: Vec::with_capacity(32),
            config,
            max_frames_lost,
            next_id: 1,
        }
    }

    pub fn reset(&mut self) {
        self.tracks.clear();
        self.next_id = 1;
    }

    /// Optimal `1 - IoU` assignment of `dets` to `objs`; matches costlier than
    /// `threshold` are dropped. Returns (track, detection, iou) triples and the
    /// detections left over, both as indexes into the underlying slices.
    fn assignment<'a>(
        &self,
        threshold: f32,
        dets: IndexedSlice<'a, Detection>,
        objs: IndexedSlice<'_, Participant>,
    ) -> Result<(Matches, IndexedSlice<'a, Detection>), Error> {
        if objs.is_empty() || dets.is_empty() {
            let missed = dets.indexes().to_vec();
            return Ok((Vec::new(), IndexedSlice::new_with_indexes(dets.slice, missed)));
        }

        let n = dets.len().max(objs.len());
        let mut costs = Vec::with_capacity(n * n);

        for r in 0..n {
            for c in 0..n {
                let cost = if r < objs.len() && c < dets.len() {
                    1.0 - objs[r].predicted.iou(&dets[c].bbox())
                } else {
                    PADDING_COST
                };

                costs.push(cost);
            }
        }

        let mut mat = WeightMatrix::from_row_vec(n, costs.clone());
        let solution = solve_assignment(&mut mat)
            .map_err(|err| Error::AssignmentError(format!("{:?}", err)))?;

        let mut assignments = Vec::new();
        for pos in solution {
            if pos.row < objs.len() && pos.column < dets.len() {
                let cost = costs[pos.row * n + pos.column];

                if cost <= threshold {
                    assignments.push((pos.row, pos.column, 1.0 - cost));
                }
            }
        }

        let missed = (0..dets.len())
            .filter(|c| !assignments.iter().any(|&(_, d, _)| d == *c))
            .map(|c| dets.get_index(c))
            .collect();

        assignments.iter_mut().for_each(|(x, y, _)| {
            *x = objs.get_index(*x);
            *y = dets.get_index(*y);
        });

        Ok((
            assignments,
            IndexedSlice::new_with_indexes(dets.slice, missed),
        ))
    }

    pub fn update(&mut self, frame: u64, detections: &[Detection]) -> Result<(), Error> {
        let mut order: Vec<usize> = (0..detections.len()).collect();
        order.sort_by(|&a, &b| detection_order(&detections[a], &detections[b]));

        let (high, low): (Vec<usize>, Vec<usize>) = order
            .into_iter()
            .filter(|&i| detections[i].confidence >= self.config.low_confidence_threshold)
            .partition(|&i| detections[i].confidence >= self.config.activation_threshold);

        for t in &mut self.tracks {
            t.predicted = t.object.predict(frame);
        }

        let all_tracks = IndexedSlice::new(&self.tracks);
        let high_dets = IndexedSlice::new_with_indexes(detections, high);
        let (high_matched, high_missed) =
            self.assignment(self.config.matching_threshold, high_dets, all_tracks)?;

        let remaining: Vec<usize> = (0..self.tracks.len())
            .filter(|i| !high_matched.iter().any(|&(t, _, _)| t == *i))
            .filter(|&i| self.tracks[i].state == TrackState::Active)
            .collect();

        let remaining_tracks = IndexedSlice::new_with_indexes(&self.tracks, remaining);
        let low_dets = IndexedSlice::new_with_indexes(detections, low);
        let (low_matched, _) =
            self.assignment(self.config.low_matching_threshold, low_dets, remaining_tracks)?;

        let mut updated = vec![false; self.tracks.len()];
        for (i, j, _) in high_matched.into_iter().chain(low_matched) {
            self.tracks[i].update(frame, &detections[j]);
            updated[i] = true;
        }

        for (t, _) in self.tracks.iter_mut().zip(updated).filter(|(_, u)| !u) {
            t.mark_missed();
        }

        let max_frames_lost = self.max_frames_lost;
        self.tracks.retain(|t| {
            let keep = t.frames_since_update <= max_frames_lost;
            if !keep {
                log::debug!("frame {}: track {} expired", frame, t.id);
            }
            keep
        });

        let spawn_threshold = self.config.activation_threshold + self.config.new_track_margin;
        let spawned: Vec<usize> = high_missed
            .indexes()
            .iter()
            .copied()
            .filter(|&j| detections[j].confidence >= spawn_threshold)
            .collect();

        for j in spawned {
            let id = self.next_id;
            self.next_id += 1;

            log::debug!("frame {}: new track {}", frame, id);
            self.tracks.push(Participant::new(id, frame, &detections[j]));
        }

        Ok(())
    }

    /// Tracks associated with a detection in the last update.
    pub fn matched(&self) -> Vec<Track> {
        self.tracks
            .iter()
            .filter(|t| t.frames_since_update == 0)
            .map(Into::into)
            .collect()
    }

    pub fn tracks(&self) -> Vec<Track> {
        self.tracks.iter().map(Into::into).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::new(TrackerConfig::default(), 30)
    }

    #[test]
    fn test_indexed_slice() {
        let data = [10, 20, 30, 40];
        let s = IndexedSlice::new_with_indexes(&data, vec![3, 1]);

        assert_eq!(s.len(), 2);
        assert_eq!(s[0], 40);
        assert_eq!(s.get_index(1), 1);
        assert_eq!(s.indexes(), &[3, 1]);
    }

    #[test]
    fn test_detection_order_by_confidence_then_position() {
        let a = Detection::new(5.0, 0.0, 10.0, 10.0, 0, 0.9);
        let b = Detection::new(0.0, 0.0, 10.0, 10.0, 0, 0.9);
        let c = Detection::new(0.0, 0.0, 10.0, 10.0, 0, 0.95);

        let mut dets = vec![a, b, c];
        dets.sort_by(detection_order);

        assert_eq!(dets, vec![c, b, a]);
    }

    #[test]
    fn test_new_ids_follow_confidence_order() {
        let mut s = scene();
        let dets = [
            Detection::new(0.0, 0.0, 10.0, 20.0, 0, 0.5),
            Detection::new(100.0, 0.0, 110.0, 20.0, 0, 0.9),
        ];

        s.update(1, &dets).unwrap();
        let tracks = s.matched();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].track_id, 1);
        assert_eq!(tracks[0].bbox.left(), 100.0);
        assert_eq!(tracks[1].track_id, 2);
    }

    #[test]
    fn test_low_confidence_does_not_spawn() {
        let mut s = scene();
        s.update(1, &[Detection::new(0.0, 0.0, 10.0, 20.0, 0, 0.3)])
            .unwrap();

        assert!(s.tracks().is_empty());
    }

    #[test]
    fn test_low_confidence_keeps_existing_track_alive() {
        let mut s = scene();
        s.update(1, &[Detection::new(0.0, 0.0, 10.0, 20.0, 0, 0.9)])
            .unwrap();
        s.update(2, &[Detection::new(1.0, 0.0, 11.0, 20.0, 0, 0.15)])
            .unwrap();

        let tracks = s.matched();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].track_id, 1);
        assert_eq!(tracks[0].state, TrackState::Active);
    }

    #[test]
    fn test_empty_frame_marks_tracks_lost() {
        let mut s = scene();
        s.update(1, &[Detection::new(0.0, 0.0, 10.0, 20.0, 0, 0.9)])
            .unwrap();
        s.update(2, &[]).unwrap();

        assert!(s.matched().is_empty());

        let tracks = s.tracks();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].state, TrackState::Lost);
        assert_eq!(tracks[0].frames_since_update, 1);
    }

    #[test]
    fn test_lost_track_expires_after_buffer() {
        let mut config = TrackerConfig::default();
        config.lost_track_buffer = 2;
        let mut s = Scene::new(config, 30);

        s.update(1, &[Detection::new(0.0, 0.0, 10.0, 20.0, 0, 0.9)])
            .unwrap();
        s.update(2, &[]).unwrap();
        s.update(3, &[]).unwrap();
        assert_eq!(s.tracks().len(), 1);

        s.update(4, &[]).unwrap();
        assert!(s.tracks().is_empty());
    }

    #[test]
    fn test_reset_restarts_ids() {
        let mut s = scene();
        s.update(1, &[Detection::new(0.0, 0.0, 10.0, 20.0, 0, 0.9)])
            .unwrap();
        s.reset();
        s.update(1, &[Detection::new(50.0, 0.0, 60.0, 20.0, 0, 0.9)])
            .unwrap();

        assert_eq!(s.matched()[0].track_id, 1);
    }
}
