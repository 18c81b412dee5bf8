use crate::error::{ExportError, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::process::Command;

/// The rendering backend as the exporter sees it: execute one invocation
/// with an argument list, stage and read back named files, and reset. Status
/// follows process conventions, zero is success. Dropping the future
/// returned by `exec` cancels the invocation; no work may outlive it.
pub trait RenderEngine {
    fn exec(&mut self, args: &[String]) -> impl std::future::Future<Output = Result<i32>> + Send;
    fn write_file(
        &mut self,
        name: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn read_file(&mut self, name: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    /// Discard all staged and produced files and return to a clean engine.
    fn terminate(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Engine backed by the `ffmpeg` binary, run inside a scratch directory so
/// the relative file names the compiler emits resolve there. The child is
/// killed if the `exec` future is dropped mid-render, so abandoning an
/// export never leaves an orphaned process writing into the scratch dir.
#[derive(Debug)]
pub struct FfmpegEngine {
    binary: PathBuf,
    scratch: TempDir,
}

impl FfmpegEngine {
    pub fn new() -> Result<Self> {
        Self::with_binary("ffmpeg")
    }

    /// Use a specific binary instead of the `ffmpeg` on PATH.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            binary: binary.into(),
            scratch: TempDir::new()?,
        })
    }

    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }
}

impl RenderEngine for FfmpegEngine {
    async fn exec(&mut self, args: &[String]) -> Result<i32> {
        tracing::debug!(?args, "running ffmpeg");
        let status = Command::new(&self.binary)
            .args(args)
            .kill_on_drop(true)
            .current_dir(self.scratch.path())
            .status()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ExportError::FfmpegNotFound
                } else {
                    ExportError::Io(e)
                }
            })?;
        Ok(status.code().unwrap_or(-1))
    }

    async fn write_file(&mut self, name: &str, data: &[u8]) -> Result<()> {
        tokio::fs::write(self.scratch.path().join(name), data).await?;
        Ok(())
    }

    async fn read_file(&mut self, name: &str) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(self.scratch.path().join(name)).await?)
    }

    /// Replace the scratch directory wholesale. Callers drop any in-flight
    /// `exec` future first, which kills the child, so nothing is still
    /// writing into the discarded directory.
    async fn terminate(&mut self) -> Result<()> {
        self.scratch = TempDir::new()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
