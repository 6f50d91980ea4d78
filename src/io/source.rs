use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::foundation::error::{MontageError, MontageResult};

/// Caller-supplied reference to one media item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaRef {
    /// A file already on local disk.
    Path(PathBuf),
    /// A remote location to fetch.
    Url(String),
    /// Uploaded content with its original file name.
    Bytes {
        /// Name used for kind classification (extension) and logs.
        file_name: String,
        /// Raw file content.
        bytes: Vec<u8>,
    },
}

impl MediaRef {
    /// Name used to classify the media kind by extension.
    pub fn file_name(&self) -> String {
        match self {
            Self::Path(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Self::Url(u) => u
                .split(['?', '#'])
                .next()
                .and_then(|s| s.rsplit('/').next())
                .unwrap_or_default()
                .to_string(),
            Self::Bytes { file_name, .. } => file_name.clone(),
        }
    }
}

/// A locally decodable media file. Scratch copies are deleted when the handle drops.
#[derive(Debug)]
pub struct MediaHandle {
    path: PathBuf,
    file_name: String,
    _scratch: Option<tempfile::TempPath>,
}

impl MediaHandle {
    /// Local path to decode from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Original file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Resolves media references to local files.
pub trait MediaSource: Send + Sync {
    /// Make `media` available locally. Scratch files go under `scratch_dir`.
    ///
    /// Failures are reported as [`MontageError::Decode`]; the pipeline drops that item.
    fn acquire(&self, media: &MediaRef, scratch_dir: &Path) -> MontageResult<MediaHandle>;
}

/// Resolves local paths in place and spills uploaded bytes into the job workspace.
///
/// Remote URLs are not fetched.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalMediaSource;

impl MediaSource for LocalMediaSource {
    fn acquire(&self, media: &MediaRef, scratch_dir: &Path) -> MontageResult<MediaHandle> {
        match media {
            MediaRef::Path(path) => {
                if !path.is_file() {
                    return Err(MontageError::decode(format!(
                        "media file '{}' does not exist",
                        path.display()
                    )));
                }
                Ok(MediaHandle {
                    path: path.clone(),
                    file_name: media.file_name(),
                    _scratch: None,
                })
            }
            MediaRef::Url(url) => Err(MontageError::decode(format!(
                "remote media '{url}' cannot be fetched by the local source"
            ))),
            MediaRef::Bytes { file_name, bytes } => {
                let suffix = Path::new(file_name)
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default();
                let mut file = tempfile::Builder::new()
                    .prefix("upload-")
                    .suffix(&suffix)
                    .tempfile_in(scratch_dir)
                    .map_err(|e| {
                        MontageError::decode(format!("failed to stage upload '{file_name}': {e}"))
                    })?;
                file.write_all(bytes).map_err(|e| {
                    MontageError::decode(format!("failed to stage upload '{file_name}': {e}"))
                })?;
                let scratch = file.into_temp_path();
                Ok(MediaHandle {
                    path: scratch.to_path_buf(),
                    file_name: file_name.clone(),
                    _scratch: Some(scratch),
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/io/source.rs"]
mod tests;
