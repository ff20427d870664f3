//! Shared data model for dotcontext.
//!
//! These types are the canonical, schema-shaped view of a context directory. They are produced
//! by `dotcontext-core` and consumed by the CLI and the protocol server. Serialisation uses the
//! key names found in the metadata document itself (`module-name`, `business-requirements`, ...)
//! so a serialised record reads like the header it came from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named architectural component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub description: String,
}

/// A named design pattern and how the module uses it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub name: String,
    pub usage: String,
}

/// The `architecture` block of a metadata record.
///
/// Always present on a normalised record. Missing input yields an empty style and empty lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Architecture {
    pub style: String,
    pub components: Vec<Component>,
    pub patterns: Vec<Pattern>,
}

/// The `permissions` block of a metadata record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(
        rename = "allow-ai-modifications",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub allow_ai_modifications: Option<bool>,

    /// Any other permission keys, kept as written.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Canonical representation of a module's metadata header.
///
/// `module_name` and `description` are required by the schema but are deliberately optional
/// here: absence is reported by the validator and linter, not by the extractor. Optional
/// fields are `None` only when the key was absent (or null) in the source header, so "absent"
/// and "present but empty" remain distinguishable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(rename = "module-name", default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conventions: Option<Vec<String>>,

    #[serde(default)]
    pub architecture: Architecture,

    /// Setup, testing and deployment details. Passed through without validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development: Option<serde_json::Value>,

    #[serde(
        rename = "business-requirements",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub business_requirements: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,

    /// Unrecognised top-level keys, preserved verbatim.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, serde_json::Value>,
}

/// A module referenced from another module's context.
///
/// Reserved: nothing populates this yet, so collected contexts always carry an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedModule {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything read from one context directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedContext {
    pub metadata: MetadataRecord,
    pub related_modules: Vec<RelatedModule>,
    /// Diagram filename to diagram text, for every diagram that could be read.
    pub diagrams: BTreeMap<String, String>,
    /// The prose that follows the header.
    pub unstructured_body: String,
    /// Path of the metadata document the context was read from.
    pub source_path: String,
}

/// Outcome of a structural check. Failures are data, not errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl StructureReport {
    /// Builds a report whose validity follows from the collected errors.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// A single lint finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintIssue {
    pub message: String,
    pub file: String,
    /// 1-based line number. For missing required fields this is the field's position in the
    /// required-field list rather than a location in the document.
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl std::fmt::Display for LintIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}:{})", self.message, self.file, self.line)
    }
}

/// Result of a lint run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintReport {
    pub issues: Vec<LintIssue>,
    pub fixed_count: usize,
}

impl LintReport {
    /// True when there was nothing to report or every reported issue was repaired.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() || self.fixed_count == self.issues.len()
    }
}

/// Which scaffold artefacts were created by a `generate_all` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldReport {
    pub dir_created: bool,
    pub index_created: bool,
    pub ignore_created: bool,
}

impl ScaffoldReport {
    /// True when nothing had to be created.
    pub fn already_present(&self) -> bool {
        !self.dir_created && !self.index_created && !self.ignore_created
    }
}
