//! Discovery of diagram files inside a context directory.
//!
//! Listing and reading are two separate best-effort steps. Neither ever fails: a missing
//! `diagrams/` folder, a permission problem or an entry that vanishes between listing and
//! reading all just shrink the result.

use crate::constants::{DIAGRAMS_DIR_NAME, DIAGRAM_EXTENSION};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Locates diagram files in the `diagrams/` subdirectory of a context directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagramLocator;

impl DiagramLocator {
    pub fn new() -> Self {
        Self
    }

    /// Directory that holds the diagrams of `context_dir`.
    pub fn diagrams_dir(&self, context_dir: &Path) -> PathBuf {
        context_dir.join(DIAGRAMS_DIR_NAME)
    }

    /// Lists readable diagram filenames under `context_dir`, sorted by name.
    ///
    /// Only regular files with the diagram extension that can be opened are returned. Entries
    /// that fail any of those checks are left out rather than reported.
    pub async fn list(&self, context_dir: &Path) -> Vec<String> {
        let dir = self.diagrams_dir(context_dir);

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("no diagrams listed for {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!("stopped listing {}: {}", dir.display(), e);
                    break;
                }
            };

            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if !has_diagram_extension(&name) {
                continue;
            }
            if is_readable_file(&entry.path()).await {
                names.push(name);
            }
        }

        names.sort();
        names
    }

    /// Lists and reads every diagram under `context_dir`.
    ///
    /// A diagram that was listed but cannot be read is logged and skipped, so the returned map
    /// holds exactly the listed diagrams whose content could be read.
    pub async fn read_all(&self, context_dir: &Path) -> BTreeMap<String, String> {
        let dir = self.diagrams_dir(context_dir);
        let mut diagrams = BTreeMap::new();

        for name in self.list(context_dir).await {
            let path = dir.join(&name);
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => {
                    diagrams.insert(name, content);
                }
                Err(e) => tracing::warn!("failed to read diagram {}: {}", path.display(), e),
            }
        }

        diagrams
    }
}

fn has_diagram_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext == DIAGRAM_EXTENSION)
}

async fn is_readable_file(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => tokio::fs::File::open(path).await.is_ok(),
        _ => false,
    }
}
