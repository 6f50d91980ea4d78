use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::MontageResult;

/// Job-scoped scratch directory, removed with everything in it when dropped.
#[derive(Debug)]
pub struct JobWorkspace {
    dir: tempfile::TempDir,
}

impl JobWorkspace {
    /// Create a fresh workspace under `parent`, or the system temp dir.
    pub fn create(parent: Option<&Path>) -> MontageResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("montage-job-");
        let dir = match parent {
            Some(p) => {
                std::fs::create_dir_all(p)
                    .with_context(|| format!("create temp parent '{}'", p.display()))?;
                builder
                    .tempdir_in(p)
                    .with_context(|| format!("create job workspace in '{}'", p.display()))?
            }
            None => builder.tempdir().context("create job workspace")?,
        };
        tracing::debug!(path = %dir.path().display(), "job workspace created");
        Ok(Self { dir })
    }

    /// Workspace root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}
