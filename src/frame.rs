use crate::error::Error;

/// Stream properties reported once by a frame source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamInfo {
    pub frame_rate: u32,
    pub width: u32,
    pub height: u32,
}

/// One decoded frame. `data` is the raw pixel buffer, empty for replayed streams.
pub struct VideoFrame {
    pub index: u64,
    pub dims: (u32, u32),
    pub data: Vec<u8>,
}

impl VideoFrame {
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Finite, non-restartable producer of frames.
pub trait FrameSource {
    fn info(&self) -> StreamInfo;
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, Error>;
}
