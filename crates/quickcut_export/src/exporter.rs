use crate::compile::compile;
use crate::engine::RenderEngine;
use crate::error::{ExportError, Result};
use quickcut_core::media::MediaCatalog;
use quickcut_core::types::{AspectRatio, TimeMs, Timeline};
use quickcut_playback::AdjustingInterval;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tick rate of the elapsed-time indicator shown during an export.
pub const EXPORT_TIMER_INTERVAL: Duration = Duration::from_millis(1000);

/// Export lifecycle. `Complete` and `Failed` are both terminal for the
/// attempt; only an explicit reset returns to `NotStarted`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportState {
    #[default]
    NotStarted,
    Processing,
    Complete,
    Failed,
}

/// The rendered file and its size in MiB, rounded to two decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutput {
    pub bytes: Vec<u8>,
    pub size_mib: f64,
}

pub fn file_size_mib(len: usize) -> f64 {
    (len as f64 / 1_048_576.0 * 100.0).round() / 100.0
}

/// Drives one export attempt at a time against a render engine: compile the
/// timeline, generate the background clip, stage inputs, run the filter
/// graph and read the result back. Any failure is terminal for the attempt;
/// there are no retries, and the elapsed timer always stops.
///
/// A hung render is cancelled by dropping the `export` future (the engine
/// abandons its work on drop) and then calling [`Exporter::terminate`] to
/// clear out the attempt's leftovers.
#[derive(Debug)]
pub struct Exporter<E: RenderEngine> {
    engine: E,
    state: ExportState,
    elapsed_ms: Arc<AtomicU64>,
    timer: Option<AdjustingInterval>,
    output: Option<ExportOutput>,
}

impl<E: RenderEngine> Exporter<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: ExportState::NotStarted,
            elapsed_ms: Arc::new(AtomicU64::new(0)),
            timer: None,
            output: None,
        }
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    /// How long the current or last attempt has been running.
    pub fn elapsed(&self) -> TimeMs {
        TimeMs(self.elapsed_ms.load(Ordering::Relaxed) as i64)
    }

    pub fn output(&self) -> Option<&ExportOutput> {
        self.output.as_ref()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Run one export of the given snapshot.
    pub async fn export(
        &mut self,
        timeline: &Timeline,
        media: &MediaCatalog,
        aspect: AspectRatio,
    ) -> Result<()> {
        self.elapsed_ms.store(0, Ordering::Relaxed);
        self.start_timer();
        self.state = ExportState::Processing;
        self.output = None;

        let result = self.run(timeline, media, aspect).await;
        self.state = match result {
            Ok(()) => ExportState::Complete,
            Err(ref e) => {
                tracing::error!(error = %e, "export failed");
                ExportState::Failed
            }
        };
        self.stop_timer();
        result
    }

    async fn run(
        &mut self,
        timeline: &Timeline,
        media: &MediaCatalog,
        aspect: AspectRatio,
    ) -> Result<()> {
        let job = compile(timeline, media, aspect)?;

        match self.engine.exec(&job.blank_args).await? {
            0 => {}
            status => return Err(ExportError::EngineStatus(status)),
        }

        for (name, data) in &job.files {
            self.engine.write_file(name, data).await?;
        }

        match self.engine.exec(&job.args).await? {
            0 => {}
            status => return Err(ExportError::EngineStatus(status)),
        }

        let bytes = self.engine.read_file(&job.output_name).await?;
        tracing::info!(size = bytes.len(), "export complete");
        self.output = Some(ExportOutput {
            size_mib: file_size_mib(bytes.len()),
            bytes,
        });
        Ok(())
    }

    /// Return to idle after a finished or abandoned attempt: the engine is
    /// reset, output discarded, state back to `NotStarted`. An in-flight
    /// attempt must be abandoned first by dropping its `export` future,
    /// which kills the engine's child process.
    pub async fn terminate(&mut self) -> Result<()> {
        self.stop_timer();
        self.engine.terminate().await?;
        self.state = ExportState::NotStarted;
        self.output = None;
        self.elapsed_ms.store(0, Ordering::Relaxed);
        Ok(())
    }

    fn start_timer(&mut self) {
        let elapsed = self.elapsed_ms.clone();
        let step = EXPORT_TIMER_INTERVAL.as_millis() as u64;
        self.timer = Some(AdjustingInterval::start(
            EXPORT_TIMER_INTERVAL,
            move || {
                elapsed.fetch_add(step, Ordering::Relaxed);
            },
            || tracing::warn!("export timer fell behind"),
        ));
    }

    fn stop_timer(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.stop();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
