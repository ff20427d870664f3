//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the collector,
//! validator, linter and scaffold generator. Nothing in this crate reads the process working
//! directory or environment while handling a request: a long-lived server shares one
//! configuration across many calls, and each caller must be explicit about which base
//! directory relative paths are resolved against.

use crate::constants::{DEFAULT_CONTEXT_DIR, IGNORE_FILENAME};
use crate::{ContextError, ContextResult};
use std::path::{Component, Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ContextConfig {
    base_dir: PathBuf,
}

impl ContextConfig {
    /// Create a new `ContextConfig` rooted at `base_dir`.
    ///
    /// A relative `base_dir` is made absolute once, here, against the current working directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> ContextResult<Self> {
        let base_dir = base_dir.into();
        if base_dir.as_os_str().is_empty() {
            return Err(ContextError::InvalidInput(
                "base directory cannot be empty".into(),
            ));
        }

        let absolute = std::path::absolute(&base_dir).map_err(|e| {
            ContextError::InvalidInput(format!(
                "cannot resolve base directory {}: {}",
                base_dir.display(),
                e
            ))
        })?;

        Ok(Self {
            base_dir: normalize_path(&absolute),
        })
    }

    /// Configuration rooted at the current working directory, as a CLI invocation expects.
    pub fn from_current_dir() -> ContextResult<Self> {
        let cwd = std::env::current_dir().map_err(|e| {
            ContextError::InvalidInput(format!("cannot determine working directory: {}", e))
        })?;
        Self::new(cwd)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a caller-supplied path.
    ///
    /// Absolute paths are normalised as-is; relative paths are joined onto the configured base
    /// directory first.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        };
        normalize_path(&joined)
    }

    /// The conventional context directory under the base directory.
    pub fn default_context_dir(&self) -> PathBuf {
        self.base_dir.join(DEFAULT_CONTEXT_DIR)
    }

    /// Location of the ignore file that accompanies `context_dir`.
    ///
    /// The ignore file lives in the directory containing the context directory (the
    /// repository root). A context directory without a parent falls back to the base directory.
    pub fn ignore_path_for(&self, context_dir: &Path) -> PathBuf {
        context_dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(&self.base_dir)
            .join(IGNORE_FILENAME)
    }
}

/// Resolve a base directory from an optional override value.
///
/// If `value` is `None` or empty/whitespace, `fallback` is used.
pub fn base_dir_from_env_value(value: Option<String>, fallback: PathBuf) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or(fallback)
}

/// Lexically normalise a path, removing `.` segments and folding `..` into its parent.
///
/// The filesystem is not consulted, so symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_resolve_against_base_dir() {
        let config = ContextConfig::new("/srv/project").unwrap();
        assert_eq!(
            config.resolve(".context"),
            PathBuf::from("/srv/project/.context")
        );
        assert_eq!(
            config.resolve("./modules/../.context"),
            PathBuf::from("/srv/project/.context")
        );
    }

    #[test]
    fn absolute_paths_ignore_base_dir() {
        let config = ContextConfig::new("/srv/project").unwrap();
        assert_eq!(
            config.resolve("/other/./place/.context"),
            PathBuf::from("/other/place/.context")
        );
    }

    #[test]
    fn empty_base_dir_is_rejected() {
        let err = ContextConfig::new("").unwrap_err();
        assert!(matches!(err, ContextError::InvalidInput(msg) if msg.contains("cannot be empty")));
    }

    #[test]
    fn ignore_file_sits_beside_context_dir() {
        let config = ContextConfig::new("/srv/project").unwrap();
        let context_dir = config.resolve("modules/auth/.context");
        assert_eq!(
            config.ignore_path_for(&context_dir),
            PathBuf::from("/srv/project/modules/auth/.contextignore")
        );
    }

    #[test]
    fn normalize_path_keeps_leading_parent_segments() {
        assert_eq!(normalize_path(Path::new("../a/./b")), PathBuf::from("../a/b"));
        assert_eq!(normalize_path(Path::new("/a/../../b")), PathBuf::from("/b"));
        assert_eq!(normalize_path(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn env_value_overrides_fallback_when_non_empty() {
        let fallback = PathBuf::from("/opt/dotcontext");
        assert_eq!(
            base_dir_from_env_value(Some(" /srv ".into()), fallback.clone()),
            PathBuf::from("/srv")
        );
        assert_eq!(
            base_dir_from_env_value(Some("  ".into()), fallback.clone()),
            fallback
        );
        assert_eq!(base_dir_from_env_value(None, fallback.clone()), fallback);
    }
}
