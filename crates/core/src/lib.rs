//! # dotcontext Core
//!
//! Core logic for `.context` directories: the metadata document, its diagrams and the ignore
//! file that sits next to them.
//!
//! This crate contains pure data operations and file/folder management:
//! - Header extraction and normalisation into a [`MetadataRecord`]
//! - Structural validation and line-level linting with auto-fix
//! - Diagram discovery and scaffolding of new context directories
//!
//! **No transport concerns**: argument parsing, terminal output and the stdio protocol belong
//! in `dotcontext-cli` and `dotcontext-mcp-server`.

pub mod collector;
pub mod config;
pub mod constants;
pub mod diagrams;
pub mod error;
pub mod frontmatter;
pub mod generator;
pub mod linter;
pub mod schema;
pub mod validator;

pub use collector::ContextCollector;
pub use config::ContextConfig;
pub use diagrams::DiagramLocator;
pub use error::{ContextError, ContextResult, FrontMatterError};
pub use generator::ScaffoldGenerator;
pub use linter::ContextLinter;
pub use validator::StructureValidator;

pub use dotcontext_types::{
    Architecture, CollectedContext, Component, LintIssue, LintReport, MetadataRecord, Pattern,
    Permissions, RelatedModule, ScaffoldReport, StructureReport,
};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Entry point for every operation on context directories.
///
/// Holds one immutable [`ContextConfig`]; every relative path handed to it is resolved against
/// the configured base directory, never the process working directory.
#[derive(Clone, Debug)]
pub struct ContextService {
    config: ContextConfig,
    collector: ContextCollector,
    validator: StructureValidator,
}

impl ContextService {
    /// Creates a new `ContextService` bound to `config`.
    pub fn new(config: ContextConfig) -> Self {
        Self {
            collector: ContextCollector::new(config.clone()),
            validator: StructureValidator::new(config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Absolute form of `dir_path`.
    pub fn resolve(&self, dir_path: impl AsRef<Path>) -> PathBuf {
        self.config.resolve(dir_path)
    }

    /// Extract the full context of the directory at `dir_path`.
    pub async fn collect(&self, dir_path: impl AsRef<Path>) -> ContextResult<CollectedContext> {
        self.collector.collect(dir_path).await
    }

    /// Structural check of the directory at `dir_path`.
    pub async fn check_structure(&self, dir_path: impl AsRef<Path>) -> StructureReport {
        self.validator.check_structure(dir_path).await
    }

    pub async fn diagrams(&self, dir_path: impl AsRef<Path>) -> Vec<String> {
        self.collector.diagrams(dir_path).await
    }

    pub async fn diagram_contents(&self, dir_path: impl AsRef<Path>) -> BTreeMap<String, String> {
        self.collector.diagram_contents(dir_path).await
    }

    /// A linter for the directory at `dir_path`.
    pub fn linter(&self, dir_path: impl AsRef<Path>) -> ContextLinter {
        ContextLinter::new(self.resolve(dir_path))
    }

    /// A scaffold generator for the directory at `dir_path`.
    ///
    /// The ignore file goes in the parent of the context directory.
    pub fn scaffold_generator(&self, dir_path: impl AsRef<Path>) -> ScaffoldGenerator {
        let context_dir = self.resolve(dir_path);
        let ignore_path = self.config.ignore_path_for(&context_dir);
        ScaffoldGenerator::new(context_dir, ignore_path)
    }

    /// Scaffold a new context at `dir_path`, creating only what is missing.
    pub async fn scaffold(&self, dir_path: impl AsRef<Path>) -> ContextResult<ScaffoldReport> {
        self.scaffold_generator(dir_path).generate_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn service(temp: &TempDir) -> ContextService {
        ContextService::new(ContextConfig::new(temp.path()).unwrap())
    }

    #[tokio::test]
    async fn scaffold_then_validate_lint_and_collect() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        let report = service.scaffold(".context").await.unwrap();
        assert!(report.dir_created && report.index_created && report.ignore_created);
        assert!(temp.path().join(".contextignore").is_file());

        assert!(service.check_structure(".context").await.valid);
        assert!(service.linter(".context").lint(false).await.unwrap().issues.is_empty());

        let context = service.collect(".context").await.unwrap();
        assert_eq!(context.metadata.module_name.as_deref(), Some("Project Name"));
        assert!(context.diagrams.is_empty());
    }

    #[tokio::test]
    async fn ignore_file_lands_next_to_nested_context_dir() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        service.scaffold("modules/auth/.context").await.unwrap();
        assert!(temp.path().join("modules/auth/.contextignore").is_file());
        assert!(!temp.path().join(".contextignore").exists());
    }

    #[tokio::test]
    async fn diagrams_are_listed_through_the_service() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".context/diagrams")).unwrap();
        fs::write(temp.path().join(".context/diagrams/flow.mmd"), "graph TD").unwrap();

        let service = service(&temp);
        assert_eq!(service.diagrams(".context").await, vec!["flow.mmd"]);
        assert_eq!(service.diagram_contents(".context").await["flow.mmd"], "graph TD");
    }
}
