//! Line-level linting of metadata documents.
//!
//! The linter works on raw text lines instead of the parsed record, so it can flag formatting
//! the YAML parser would quietly accept (a missing opening delimiter, a version written as a
//! number). With auto-fix it applies a small set of textual repairs and rewrites the document
//! in a single write.

use crate::constants::{HEADER_DELIMITER, INDEX_FILENAME, REQUIRED_LINT_FIELDS};
use crate::{ContextError, ContextResult};
use dotcontext_types::{LintIssue, LintReport};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static VERSION_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+$").expect("version pattern is valid"));

/// Lints the metadata document of one context directory.
#[derive(Debug, Clone)]
pub struct ContextLinter {
    context_dir: PathBuf,
}

impl ContextLinter {
    /// Create a linter for the (already resolved) context directory.
    pub fn new(context_dir: impl Into<PathBuf>) -> Self {
        Self {
            context_dir: context_dir.into(),
        }
    }

    pub fn context_dir(&self) -> &Path {
        &self.context_dir
    }

    /// Lint the metadata document, optionally repairing what can be repaired.
    ///
    /// The issue list always describes the document as it was read; `fixed_count` says how
    /// many of those issues the rewrite addressed.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::Lint` wrapping the underlying failure when the directory or
    /// document is missing, cannot be read, or cannot be rewritten.
    pub async fn lint(&self, auto_fix: bool) -> ContextResult<LintReport> {
        self.run(auto_fix)
            .await
            .map_err(|e| ContextError::Lint(Box::new(e)))
    }

    async fn run(&self, auto_fix: bool) -> ContextResult<LintReport> {
        let index_path = self.context_dir.join(INDEX_FILENAME);

        match tokio::fs::try_exists(&self.context_dir).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(ContextError::DirectoryNotFound {
                    path: self.context_dir.clone(),
                });
            }
            Err(source) => {
                return Err(ContextError::Read {
                    path: self.context_dir.clone(),
                    source,
                });
            }
        }

        let content = match tokio::fs::read_to_string(&index_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ContextError::NotFound { path: index_path });
            }
            Err(source) => {
                return Err(ContextError::Read {
                    path: index_path,
                    source,
                })
            }
        };

        let findings = check_content(&content);
        let mut report = LintReport {
            issues: findings.issues,
            fixed_count: 0,
        };

        if auto_fix {
            let (fixed_content, fixed_count) =
                apply_fixes(&content, findings.missing_delimiter, &findings.missing_fields);
            if fixed_count > 0 {
                tokio::fs::write(&index_path, fixed_content)
                    .await
                    .map_err(|source| ContextError::Write {
                        path: index_path.clone(),
                        source,
                    })?;
                tracing::info!(
                    "fixed {} lint issue(s) in {}",
                    fixed_count,
                    index_path.display()
                );
            }
            report.fixed_count = fixed_count;
        }

        Ok(report)
    }
}

/// What a pass over the raw text found.
#[derive(Debug, Default)]
struct Findings {
    issues: Vec<LintIssue>,
    missing_delimiter: bool,
    missing_fields: Vec<&'static str>,
}

fn check_content(content: &str) -> Findings {
    let mut findings = Findings::default();
    let lines: Vec<&str> = content.split('\n').collect();

    if !content.starts_with(HEADER_DELIMITER) {
        findings.missing_delimiter = true;
        findings.issues.push(issue(
            "Missing frontmatter delimiter at the start",
            1,
            format!("Add \"{}\" at the start of the file", HEADER_DELIMITER),
        ));
    }

    // An absent field has no location, so its position in the required list stands in for
    // the line number.
    for (index, &field) in REQUIRED_LINT_FIELDS.iter().enumerate() {
        if field_line(&lines, field).is_none() {
            findings.missing_fields.push(field);
            findings.issues.push(issue(
                format!("Missing required field: {}", field),
                index + 1,
                format!("Add \"{}: your-value-here\"", field),
            ));
        }
    }

    if let Some(line_index) = field_line(&lines, "version") {
        // Only the text between the first and second colon counts as the value.
        let value = lines[line_index].split(':').nth(1).unwrap_or("").trim();
        if !VERSION_FORMAT.is_match(value) {
            findings.issues.push(issue(
                "Invalid version format",
                line_index + 1,
                "Use semantic versioning format (e.g., 1.0.0)",
            ));
        }
    }

    findings
}

/// Index of the first line that starts with `<field>:`, ignoring case.
fn field_line(lines: &[&str], field: &str) -> Option<usize> {
    let prefix = format!("{}:", field.to_lowercase());
    lines
        .iter()
        .position(|line| line.to_lowercase().starts_with(&prefix))
}

/// Apply the repairs the linter knows how to make. Returns the new text and the repair count.
fn apply_fixes(content: &str, missing_delimiter: bool, missing_fields: &[&str]) -> (String, usize) {
    let mut fixed = String::with_capacity(content.len() + 64);
    let mut count = 0;

    if missing_delimiter {
        fixed.push_str(HEADER_DELIMITER);
        fixed.push('\n');
        count += 1;
    }
    fixed.push_str(content);

    for field in missing_fields {
        fixed.push('\n');
        fixed.push_str(field);
        fixed.push_str(": ");
        count += 1;
    }

    (fixed, count)
}

fn issue(message: impl Into<String>, line: usize, suggestion: impl Into<String>) -> LintIssue {
    LintIssue {
        message: message.into(),
        file: INDEX_FILENAME.to_string(),
        line,
        suggestion: Some(suggestion.into()),
    }
}
