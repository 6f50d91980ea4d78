use std::path::{Path, PathBuf};

use crate::foundation::error::{MontageError, MontageResult};

/// Caller-visible location of a published artifact.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PublicRef(pub String);

impl std::fmt::Display for PublicRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persists a finished artifact somewhere durable.
pub trait Publisher {
    /// Persist the file at `artifact` and return where callers can find it.
    ///
    /// Must not consume `artifact`, so a failed publish can be retried.
    fn publish(&self, artifact: &Path) -> MontageResult<PublicRef>;
}

/// Copies artifacts into a directory under a unique `<uuid>.mp4` name.
#[derive(Clone, Debug)]
pub struct LocalDirPublisher {
    dir: PathBuf,
}

impl LocalDirPublisher {
    /// Publish into `dir`, creating it on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Publish into the user's download directory, falling back to `~/Downloads`.
    pub fn downloads() -> MontageResult<Self> {
        dirs_next::download_dir()
            .or_else(|| dirs_next::home_dir().map(|h| h.join("Downloads")))
            .map(Self::new)
            .ok_or_else(|| MontageError::publish("cannot locate a download directory"))
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Publisher for LocalDirPublisher {
    fn publish(&self, artifact: &Path) -> MontageResult<PublicRef> {
        if !artifact.is_file() {
            return Err(MontageError::publish(format!(
                "artifact '{}' does not exist",
                artifact.display()
            )));
        }
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            MontageError::publish(format!(
                "failed to create publish directory '{}': {e}",
                self.dir.display()
            ))
        })?;

        let dest = self.dir.join(format!("{}.mp4", uuid::Uuid::new_v4()));
        // Staged in the target dir; `persist` is then a same-filesystem rename.
        let staged = tempfile::Builder::new()
            .prefix(".montage-")
            .suffix(".part")
            .tempfile_in(&self.dir)
            .map_err(|e| MontageError::publish(format!("failed to stage artifact: {e}")))?;
        std::fs::copy(artifact, staged.path()).map_err(|e| {
            MontageError::publish(format!("failed to copy artifact: {e}"))
        })?;
        staged
            .persist(&dest)
            .map_err(|e| MontageError::publish(format!("failed to persist artifact: {}", e.error)))?;

        tracing::info!(dest = %dest.display(), "artifact published");
        Ok(PublicRef(dest.display().to_string()))
    }
}
