use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Media not found: {0}")]
    MediaNotFound(uuid::Uuid),

    #[error("Nothing to export")]
    EmptyTimeline,

    #[error("render engine exited with status {0}")]
    EngineStatus(i32),

    #[error("ffmpeg binary not found on PATH")]
    FfmpegNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
