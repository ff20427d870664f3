use std::path::PathBuf;

/// Errors raised while splitting a metadata document into header and body.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("front matter must be a YAML mapping")]
    NotMapping,
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("could not access index.md at path: {path}", path = path.display())]
    NotFound { path: PathBuf },

    #[error("context directory not found: {path}", path = path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read {path}: {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse front matter in {path}: {source}", path = path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },

    #[error("failed to write {path}: {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to generate {target}: {source}", target = target.display())]
    Scaffold {
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("linting failed: {0}")]
    Lint(#[source] Box<ContextError>),
}

pub type ContextResult<T> = std::result::Result<T, ContextError>;
