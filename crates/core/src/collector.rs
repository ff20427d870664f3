//! Metadata extraction.
//!
//! Reads a context directory's metadata document, splits the header from the prose body,
//! normalises the header into a [`MetadataRecord`](dotcontext_types::MetadataRecord) and
//! attaches every readable diagram. Only access failures are errors; content problems come
//! back as empty or missing record fields.

use crate::config::ContextConfig;
use crate::constants::INDEX_FILENAME;
use crate::diagrams::DiagramLocator;
use crate::frontmatter::parse_document;
use crate::schema::metadata_from_header;
use crate::{ContextError, ContextResult};
use dotcontext_types::CollectedContext;
use std::path::{Path, PathBuf};

/// Collects the full context of a module from its context directory.
#[derive(Debug, Clone)]
pub struct ContextCollector {
    config: ContextConfig,
    diagrams: DiagramLocator,
}

impl ContextCollector {
    pub fn new(config: ContextConfig) -> Self {
        tracing::debug!("context collector base dir: {}", config.base_dir().display());
        Self {
            config,
            diagrams: DiagramLocator::new(),
        }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Resolve `dir_path` against the configured base directory.
    pub fn resolve_path(&self, dir_path: impl AsRef<Path>) -> PathBuf {
        let dir_path = dir_path.as_ref();
        let resolved = self.config.resolve(dir_path);
        tracing::debug!(
            "resolved {} against {} to {}",
            dir_path.display(),
            self.config.base_dir().display(),
            resolved.display()
        );
        resolved
    }

    /// Read and normalise the context stored in `dir_path`.
    ///
    /// # Errors
    ///
    /// - `ContextError::NotFound` if the metadata document does not exist.
    /// - `ContextError::Read` if it exists but cannot be read.
    /// - `ContextError::Parse` if the header cannot be split from the body or is not valid YAML.
    pub async fn collect(&self, dir_path: impl AsRef<Path>) -> ContextResult<CollectedContext> {
        let full_path = self.resolve_path(dir_path);
        let index_path = full_path.join(INDEX_FILENAME);
        tracing::debug!("collecting context from {}", index_path.display());

        let content = match tokio::fs::read_to_string(&index_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ContextError::NotFound { path: index_path });
            }
            Err(source) => {
                return Err(ContextError::Read {
                    path: index_path,
                    source,
                });
            }
        };

        let document = parse_document(&content).map_err(|source| ContextError::Parse {
            path: index_path.clone(),
            source,
        })?;

        let metadata = metadata_from_header(&document.header);
        let diagrams = self.diagrams.read_all(&full_path).await;

        Ok(CollectedContext {
            metadata,
            related_modules: Vec::new(),
            diagrams,
            unstructured_body: document.body,
            source_path: index_path.display().to_string(),
        })
    }

    /// Names of the readable diagrams in `dir_path`.
    pub async fn diagrams(&self, dir_path: impl AsRef<Path>) -> Vec<String> {
        self.diagrams.list(&self.resolve_path(dir_path)).await
    }

    /// Names and contents of the readable diagrams in `dir_path`.
    ///
    /// Unlike [`collect`](Self::collect) this does not require a metadata document.
    pub async fn diagram_contents(
        &self,
        dir_path: impl AsRef<Path>,
    ) -> std::collections::BTreeMap<String, String> {
        self.diagrams.read_all(&self.resolve_path(dir_path)).await
    }
}
