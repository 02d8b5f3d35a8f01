use std::path::{
    Path,
    PathBuf,
};

use walkdir::WalkDir;

use crate::error::AnalyzerError;

pub const SOURCE_EXTENSION: &str = ".java";

/// Collects every `.java` file under `root`, depth first with entries sorted
/// by name inside each directory.
#[tracing::instrument]
pub fn collect_sources(root: &Path) -> Result<Vec<PathBuf>, AnalyzerError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = entry?;

        if entry.file_type().is_file() && is_source_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    tracing::debug!("collected {} source files", files.len());

    Ok(files)
}

fn is_source_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(SOURCE_EXTENSION))
        .unwrap_or(false)
}
