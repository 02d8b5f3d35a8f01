use std::path::PathBuf;

/// Infrastructure failures raised by a frontend. Problems in the analyzed
/// source never end up here; those are diagnostics.
#[derive(thiserror::Error, Debug)]
pub enum FrontendError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid flag: {0}")]
    InvalidOption(String),
    #[error("invalid source release: {0}")]
    InvalidRelease(String),
    #[error("target release {target} conflicts with source release {source_release}")]
    ReleaseConflict { source_release: u32, target: u32 },
    #[error("unreadable archive {}: {reason}", path.display())]
    Archive { path: PathBuf, reason: String },
    #[error("parser gave up on {0}")]
    ParseAborted(String),
    #[error(transparent)]
    Language(#[from] tree_sitter::LanguageError),
}

impl FrontendError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FrontendError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures that abort an `analyze` call.
#[derive(thiserror::Error, Debug)]
pub enum AnalyzerError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("invalid settings file {}: {source}", path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Frontend(#[from] FrontendError),
}
