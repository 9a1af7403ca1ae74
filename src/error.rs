use thiserror::Error;

#[derive(Error, Debug)]
pub enum VadsplitError {
    #[error("Audio decoding failed: {0}")]
    Decode(String),

    #[error("Frame classification failed: {0}")]
    Classification(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Run cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

pub type Result<T> = std::result::Result<T, VadsplitError>;
