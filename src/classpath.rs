use std::path::{
    Path,
    PathBuf,
};

/// Stub archives that make up the platform classpath, in search order.
pub const PLATFORM_ARCHIVES: [&str; 2] = ["android.jar", "core-lambda-stubs.jar"];

pub const PATH_SEPARATOR: char = ':';

/// Always the two bundled stub archives under `classpath_dir`. Whether they
/// exist is the frontend's concern.
pub fn platform_classpath(classpath_dir: &Path) -> Vec<PathBuf> {
    PLATFORM_ARCHIVES
        .iter()
        .map(|archive| classpath_dir.join(archive))
        .collect()
}

/// Splits the user classpath setting into entries, keeping their order and
/// skipping empty segments.
pub fn user_classpath(setting: &str) -> Vec<PathBuf> {
    setting
        .split(PATH_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(PathBuf::from)
        .collect()
}
