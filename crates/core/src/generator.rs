//! Scaffolding of new context directories.
//!
//! Every step checks for an existing artefact first and only creates what is missing, so
//! running the generator twice is harmless and never overwrites an author's edits.

use crate::constants::INDEX_FILENAME;
use crate::{ContextError, ContextResult};
use dotcontext_types::ScaffoldReport;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Starter metadata document written into a fresh context directory.
pub const INDEX_TEMPLATE: &str = include_str!("../templates/index.md");

/// Starter ignore-patterns file written next to the context directory.
pub const IGNORE_TEMPLATE: &str = include_str!("../templates/contextignore");

/// Creates the directory, metadata document and ignore file of a new context.
#[derive(Debug, Clone)]
pub struct ScaffoldGenerator {
    context_dir: PathBuf,
    ignore_path: PathBuf,
}

impl ScaffoldGenerator {
    /// Create a generator for `context_dir` whose ignore file lives at `ignore_path`.
    ///
    /// Both paths are used as given; resolve them against a base directory first.
    pub fn new(context_dir: impl Into<PathBuf>, ignore_path: impl Into<PathBuf>) -> Self {
        Self {
            context_dir: context_dir.into(),
            ignore_path: ignore_path.into(),
        }
    }

    pub fn context_dir(&self) -> &Path {
        &self.context_dir
    }

    pub fn ignore_path(&self) -> &Path {
        &self.ignore_path
    }

    /// Create the context directory (and any missing parents).
    ///
    /// Returns `true` if the directory was created, `false` if it already existed.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::Scaffold` if the directory cannot be created, including when a
    /// file already occupies its path.
    pub async fn create_directory(&self) -> ContextResult<bool> {
        let scaffold_err = |source| ContextError::Scaffold {
            target: self.context_dir.clone(),
            source,
        };

        match tokio::fs::metadata(&self.context_dir).await {
            Ok(metadata) if metadata.is_dir() => return Ok(false),
            Ok(_) => {
                return Err(scaffold_err(std::io::Error::new(
                    ErrorKind::AlreadyExists,
                    "a file already exists at this path",
                )));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(scaffold_err(e)),
        }

        tokio::fs::create_dir_all(&self.context_dir)
            .await
            .map_err(scaffold_err)?;
        tracing::info!("created context directory {}", self.context_dir.display());
        Ok(true)
    }

    /// Write the template metadata document unless one already exists.
    ///
    /// Creates the context directory first when needed. Returns `true` if the document was
    /// written.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::Scaffold` if the directory or document cannot be created.
    pub async fn create_metadata_document(&self) -> ContextResult<bool> {
        self.create_directory().await?;
        let index_path = self.context_dir.join(INDEX_FILENAME);
        let created = write_new(&index_path, INDEX_TEMPLATE).await?;
        if created {
            tracing::info!("created metadata document {}", index_path.display());
        }
        Ok(created)
    }

    /// Write the template ignore file unless one already exists.
    ///
    /// Returns `true` if the file was written.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::Scaffold` if the file cannot be created.
    pub async fn create_ignore_file(&self) -> ContextResult<bool> {
        let created = write_new(&self.ignore_path, IGNORE_TEMPLATE).await?;
        if created {
            tracing::info!("created ignore file {}", self.ignore_path.display());
        }
        Ok(created)
    }

    /// Run every scaffold step, reporting which artefacts were newly created.
    ///
    /// # Errors
    ///
    /// Stops at the first step that fails and returns its `ContextError::Scaffold`.
    pub async fn generate_all(&self) -> ContextResult<ScaffoldReport> {
        let dir_created = self.create_directory().await?;
        let index_created = self.create_metadata_document().await?;
        let ignore_created = self.create_ignore_file().await?;

        Ok(ScaffoldReport {
            dir_created,
            index_created,
            ignore_created,
        })
    }
}

/// Create `path` with `content`, leaving an existing file alone.
async fn write_new(path: &Path, content: &str) -> ContextResult<bool> {
    use tokio::io::AsyncWriteExt;

    let scaffold_err = |source| ContextError::Scaffold {
        target: path.to_path_buf(),
        source,
    };

    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(scaffold_err(e)),
    };

    file.write_all(content.as_bytes())
        .await
        .map_err(scaffold_err)?;
    file.flush().await.map_err(scaffold_err)?;
    Ok(true)
}
