//! End-to-end tests: detections through tracking, metrics, filtering and report.

use approx::assert_relative_eq;
use athtrack::replay::DetectionLog;
use athtrack::{analysis, report, Analysis, Config, Detection, StreamInfo};

const INFO: StreamInfo = StreamInfo {
    frame_rate: 30,
    width: 1280,
    height: 720,
};

fn person(x: f32, y: f32, confidence: f32) -> Detection {
    Detection::person_at(x, y, 30.0, 80.0, confidence)
}

/// Two runners on separate lanes, one of them turning twice, plus a ball.
fn scripted_frames(n: usize) -> Vec<Vec<Detection>> {
    (0..n)
        .map(|i| {
            let t = i as f32;
            let zigzag_y = if (i / 5) % 2 == 0 { 300.0 } else { 310.0 };

            vec![
                person(100.0 + t * 5.0, 100.0, 0.9),
                person(100.0 + t * 3.0, zigzag_y, 0.85),
                Detection::new(600.0, 600.0, 610.0, 610.0, 32, 0.6),
            ]
        })
        .collect()
}

fn track_ids(frames: &[Vec<Detection>]) -> Vec<Vec<u32>> {
    let mut analysis = Analysis::new(INFO, &Config::default());

    frames
        .iter()
        .enumerate()
        .map(|(i, dets)| {
            let mut ids: Vec<u32> = analysis
                .process(i as u64, dets)
                .unwrap()
                .iter()
                .map(|t| t.track_id)
                .collect();
            ids.sort_unstable();
            ids
        })
        .collect()
}

#[test]
fn test_track_ids_are_deterministic() {
    let frames = scripted_frames(30);

    let first = track_ids(&frames);
    let second = track_ids(&frames);

    assert_eq!(first, second);
    assert!(first.iter().all(|ids| ids == &vec![1, 2]));
}

#[test]
fn test_identity_survives_short_occlusion() {
    let mut analysis = Analysis::new(INFO, &Config::default());

    for i in 0..20u64 {
        // hidden for frames 8..11
        let dets = if (8..11).contains(&i) {
            vec![]
        } else {
            vec![person(200.0 + i as f32 * 2.0, 200.0, 0.9)]
        };

        let tracks = analysis.process(i, &dets).unwrap();
        if !dets.is_empty() {
            assert_eq!(tracks.len(), 1, "frame {}", i);
            assert_eq!(tracks[0].track_id, 1, "frame {}", i);
        }
    }

    let record = analysis.store().get(1).unwrap();
    assert_eq!(record.positions.len(), 17);
    assert_eq!(record.first_frame, 0);
    assert_eq!(record.last_frame, 19);
}

#[test]
fn test_replayed_run_filters_and_scores() {
    let frames = scripted_frames(30);
    let dump = DetectionLog::new(INFO, frames);
    let mut source = dump.source();

    let aggregate = analysis::run(&mut source, dump, &Config::default()).unwrap();

    assert_eq!(aggregate.total_raw_tracks, 2);
    assert_eq!(aggregate.total_retained, 2);
    assert!(!aggregate.roster_exceeded);

    let straight = &aggregate.players[&1];
    assert_eq!(straight.record.distances.len(), 29);
    assert_eq!(straight.record.direction_changes, 0);
    assert_relative_eq!(straight.average_speed, 1.5, epsilon = 1e-5);
    assert_relative_eq!(straight.total_distance, 145.0, epsilon = 1e-3);

    let zigzag = &aggregate.players[&2];
    assert!(zigzag.record.direction_changes > 0);

    let report = report::render_report(&aggregate);
    assert!(report.starts_with("Player 1:\n- Average Speed: 1.50 m/s\n"));
    assert_eq!(report.matches("Performance Rating").count(), 2);
}

#[test]
fn test_run_until_stops_early() {
    let dump = DetectionLog::new(INFO, scripted_frames(30));
    let mut source = dump.source();

    let aggregate =
        analysis::run_until(&mut source, dump, &Config::default(), |frame| frame >= 4).unwrap();

    // 4 frames give 3 speed samples, below the minimum
    assert_eq!(aggregate.total_raw_tracks, 2);
    assert!(aggregate.is_empty());
}

#[test]
fn test_empty_stream() {
    let dump = DetectionLog::new(INFO, Vec::new());
    let mut source = dump.source();

    let aggregate = analysis::run(&mut source, dump, &Config::default()).unwrap();
    assert!(aggregate.is_empty());
    assert_eq!(aggregate.total_raw_tracks, 0);

    let dir = tempfile::tempdir().unwrap();
    let written = report::emit(&aggregate, dir.path()).unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), "");
}

#[test]
fn test_malformed_record_aborts_run() {
    let mut frames = scripted_frames(5);
    frames[2].push(Detection::new(10.0, 10.0, 5.0, 20.0, 0, 0.9));

    let dump = DetectionLog::new(INFO, frames);
    let mut source = dump.source();

    let err = analysis::run(&mut source, dump, &Config::default());
    assert!(matches!(
        err,
        Err(athtrack::error::Error::MalformedDetection { frame: 2, .. })
    ));
}
