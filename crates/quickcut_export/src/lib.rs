//! Export pipeline: compiles a timeline snapshot into an ffmpeg filter
//! graph and drives a render engine through one attempt at a time.

pub mod compile;
pub mod engine;
pub mod error;
pub mod exporter;

pub use compile::{compile, ExportJob};
pub use engine::{FfmpegEngine, RenderEngine};
pub use error::{ExportError, Result};
pub use exporter::{ExportOutput, ExportState, Exporter, EXPORT_TIMER_INTERVAL};
