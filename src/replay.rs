//! Replays detections dumped by an external detector.
//!
//! The dump starts with a header line `#<frame_rate> <width> <height>`,
//! followed by one line per frame: `<frame_index>:<json array of detections>`.
//! Blank lines are skipped. Frames missing between two listed indexes are
//! replayed with no detections.

use std::io::BufRead;
use std::ops::Range;
use std::path::Path;

use crate::detection::Detection;
use crate::detector::Detector;
use crate::error::Error;
use crate::frame::{FrameSource, StreamInfo, VideoFrame};

/// Parsed dump; acts as the detector of a replayed stream.
pub struct DetectionLog {
    info: StreamInfo,
    frames: Vec<(u64, Vec<Detection>)>,
}

/// Frame source yielding every frame index from the first to the last frame
/// of a [`DetectionLog`].
pub struct ReplaySource {
    info: StreamInfo,
    indexes: Range<u64>,
}

fn parse_header(line: &str) -> Option<StreamInfo> {
    let mut it = line.strip_prefix('#')?.split_whitespace();

    let frame_rate = it.next()?.parse().ok()?;
    let width = it.next()?.parse().ok()?;
    let height = it.next()?.parse().ok()?;

    Some(StreamInfo {
        frame_rate,
        width,
        height,
    })
}

impl DetectionLog {
    pub fn new(info: StreamInfo, frames: Vec<Vec<Detection>>) -> Self {
        Self {
            info,
            frames: frames
                .into_iter()
                .enumerate()
                .map(|(i, dets)| (i as u64, dets))
                .collect(),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = std::fs::File::open(path)?;

        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut lines = reader.lines().enumerate();

        let info = match lines.next() {
            Some((_, line)) => {
                let line = line?;
                parse_header(line.trim()).ok_or_else(|| Error::MalformedReplay {
                    line: 1,
                    reason: format!("expected `#<frame_rate> <width> <height>`, got {:?}", line),
                })?
            }
            None => {
                return Err(Error::MalformedReplay {
                    line: 1,
                    reason: "empty dump".to_string(),
                })
            }
        };

        let mut frames: Vec<(u64, Vec<Detection>)> = Vec::new();

        for (idx, line) in lines {
            let line = line?;
            let line = line.trim();
            let lineno = idx + 1;

            if line.is_empty() {
                continue;
            }

            let malformed = |reason: String| Error::MalformedReplay {
                line: lineno,
                reason,
            };

            let (index, vector) = line
                .split_once(':')
                .ok_or_else(|| malformed("expected `:`".to_string()))?;

            let index: u64 = index
                .trim()
                .parse()
                .map_err(|err| malformed(format!("parse frame index failed: {}", err)))?;

            if let Some(&(prev, _)) = frames.last() {
                if index <= prev {
                    return Err(malformed(format!(
                        "frame {} does not follow frame {}",
                        index, prev
                    )));
                }
            }

            let dets: Vec<Detection> = serde_json::from_str(vector)
                .map_err(|err| malformed(format!("parse json failed: {}", err)))?;

            frames.push((index, dets));
        }

        Ok(Self { info, frames })
    }

    #[inline]
    pub fn info(&self) -> StreamInfo {
        self.info
    }

    pub fn source(&self) -> ReplaySource {
        let indexes = match (self.frames.first(), self.frames.last()) {
            (Some(&(first, _)), Some(&(last, _))) => first..last.saturating_add(1),
            _ => 0..0,
        };

        ReplaySource {
            info: self.info,
            indexes,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for ReplaySource {
    #[inline]
    fn info(&self) -> StreamInfo {
        self.info
    }

    fn next_frame(&mut self) -> Result<Option<VideoFrame>, Error> {
        let Some(index) = self.indexes.next() else {
            return Ok(None);
        };

        Ok(Some(VideoFrame {
            index,
            dims: (self.info.width, self.info.height),
            data: Vec::new(),
        }))
    }
}

impl Detector for DetectionLog {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<Detection>, Error> {
        Ok(self
            .frames
            .binary_search_by_key(&frame.index, |(i, _)| *i)
            .map(|pos| self.frames[pos].1.clone())
            .unwrap_or_default())
    }
}
