use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Malformed detection in frame {frame}: {reason}")]
    MalformedDetection { frame: u64, reason: String },

    #[error("Malformed replay line {line}: {reason}")]
    MalformedReplay { line: usize, reason: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Assignment Error: {0}")]
    AssignmentError(String),
}
