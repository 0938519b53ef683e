//! On-disk storage for uploaded model and cover files
//!
//! Uploads are written under a fresh UUID v4 name in the directory for their
//! kind and served back verbatim by the static routes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Model,
    Cover,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Model => "model",
            FileKind::Cover => "cover",
        }
    }
}

/// Whether `name` refers to a file directly inside a storage directory
pub fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[derive(Debug, Clone)]
pub struct UploadStorage {
    model_dir: PathBuf,
    cover_dir: PathBuf,
}

impl UploadStorage {
    pub fn new(model_dir: impl Into<PathBuf>, cover_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            cover_dir: cover_dir.into(),
        }
    }

    pub fn dir(&self, kind: FileKind) -> &Path {
        match kind {
            FileKind::Model => &self.model_dir,
            FileKind::Cover => &self.cover_dir,
        }
    }

    /// Create both storage directories if they are missing
    pub async fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.model_dir, &self.cover_dir] {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;
        }
        Ok(())
    }

    /// Stream `reader` into a new file and return its generated name.
    /// A partially written file is removed on failure.
    pub async fn store<R>(&self, kind: FileKind, reader: &mut R) -> Result<String>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let filename = Uuid::new_v4().to_string();
        let path = self.dir(kind).join(&filename);

        let written = async {
            let mut file = fs::File::create(&path)
                .await
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let bytes = tokio::io::copy(reader, &mut file)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            file.flush().await?;
            anyhow::Ok(bytes)
        }
        .await;

        match written {
            Ok(bytes) => {
                tracing::debug!(kind = kind.as_str(), filename = %filename, bytes, "Stored upload");
                Ok(filename)
            }
            Err(e) => {
                let _ = fs::remove_file(&path).await;
                Err(e)
            }
        }
    }

    /// Whether a stored file called `filename` exists. Names that are not
    /// plain file names never exist.
    pub async fn exists(&self, kind: FileKind, filename: &str) -> Result<bool> {
        if !is_plain_filename(filename) {
            return Ok(false);
        }

        match fs::metadata(self.dir(kind).join(filename)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a stored file. Missing files are ignored.
    pub async fn remove(&self, kind: FileKind, filename: &str) -> Result<()> {
        if !is_plain_filename(filename) {
            return Ok(());
        }

        match fs::remove_file(self.dir(kind).join(filename)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
