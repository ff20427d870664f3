//! Constants used throughout the dotcontext core crate.
//!
//! This module contains all path, filename and schema constants to ensure
//! consistency across the codebase and make maintenance easier.

/// Conventional name of a context directory.
pub const DEFAULT_CONTEXT_DIR: &str = ".context";

/// Filename of the metadata document inside a context directory.
pub const INDEX_FILENAME: &str = "index.md";

/// Subdirectory of a context directory holding diagrams.
pub const DIAGRAMS_DIR_NAME: &str = "diagrams";

/// Extension (without the dot) that marks a file as a diagram.
pub const DIAGRAM_EXTENSION: &str = "mmd";

/// Filename of the ignore-patterns file written next to the context directory.
pub const IGNORE_FILENAME: &str = ".contextignore";

/// Line that opens and closes the metadata header.
pub const HEADER_DELIMITER: &str = "---";

/// Fields the linter requires, in reporting order.
pub const REQUIRED_LINT_FIELDS: [&str; 5] = [
    "module-name",
    "version",
    "description",
    "technologies",
    "architecture",
];

/// Environment variable overriding the protocol server's base directory.
pub const ROOT_ENV_VAR: &str = "DOTCONTEXT_ROOT";
