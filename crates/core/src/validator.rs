//! Structural validation of context directories.
//!
//! This is a cheap existence check run before paying for a full extraction. It never opens
//! the metadata document, so a structurally valid directory can still fail to parse.

use crate::config::ContextConfig;
use crate::constants::INDEX_FILENAME;
use dotcontext_types::StructureReport;
use std::path::Path;

/// Checks that a context directory has the expected shape.
#[derive(Debug, Clone)]
pub struct StructureValidator {
    config: ContextConfig,
}

impl StructureValidator {
    pub fn new(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Validates the directory at `dir_path` (resolved against the configured base directory).
    ///
    /// A missing or non-directory path short-circuits with a single error. A missing metadata
    /// document is reported as an error without stopping further checks.
    pub async fn check_structure(&self, dir_path: impl AsRef<Path>) -> StructureReport {
        let full_path = self.config.resolve(dir_path);
        tracing::debug!("validating context structure at {}", full_path.display());

        let mut errors = Vec::new();

        match tokio::fs::metadata(&full_path).await {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => {
                errors.push(format!(
                    "Invalid context directory: {} is not a directory",
                    full_path.display()
                ));
                return StructureReport::from_errors(errors);
            }
            Err(e) => {
                errors.push(format!("Invalid context directory: {}", e));
                return StructureReport::from_errors(errors);
            }
        }

        if !tokio::fs::try_exists(full_path.join(INDEX_FILENAME))
            .await
            .unwrap_or(false)
        {
            errors.push(format!("Missing {} file", INDEX_FILENAME));
        }

        StructureReport::from_errors(errors)
    }
}
