use std::path::Path;

use serde::{
    Deserialize,
    Serialize,
};

use crate::error::AnalyzerError;

pub const DEFAULT_VERSION: &str = "7";

/// Compiler settings the analyzer reads on every call.
///
/// A settings file is a flat JSON object. Missing keys fall back to the
/// defaults, so `{}` is a valid file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Language level applied to both `-source` and `-target`.
    pub version: String,
    /// Colon separated user classpath.
    pub classpath: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            classpath: String::new(),
        }
    }
}

impl Settings {
    pub fn load_from_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    #[tracing::instrument]
    pub fn load_from_file(path: &Path) -> Result<Self, AnalyzerError> {
        let content = std::fs::read_to_string(path).map_err(|source| AnalyzerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::load_from_str(&content).map_err(|source| AnalyzerError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_classpath(mut self, classpath: impl Into<String>) -> Self {
        self.classpath = classpath.into();
        self
    }
}
