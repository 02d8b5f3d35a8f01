use std::path::{
    Path,
    PathBuf,
};

use indexmap::IndexMap;
use tracing::debug;
use walkdir::WalkDir;

use super::archive::Archive;
use super::symbols::ClassIndex;
use super::{
    FileManager,
    Location,
};
use crate::error::FrontendError;
use crate::sources::SOURCE_EXTENSION;

/// File manager of the bundled frontend.
///
/// Classpath archives are opened when the class index is built and stay open
/// until [`FileManager::close`].
#[derive(Debug, Default)]
pub struct StandardFileManager {
    locations: IndexMap<Location, Vec<PathBuf>>,
    open_archives: Vec<Archive>,
}

impl StandardFileManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_archive_count(&self) -> usize {
        self.open_archives.len()
    }

    /// Every class reachable through the platform classpath and the user
    /// classpath, on top of the `java.lang` bootstrap set.
    #[tracing::instrument(skip_all)]
    pub fn class_index(&mut self) -> Result<ClassIndex, FrontendError> {
        let mut index = ClassIndex::with_bootstrap();
        let entries: Vec<PathBuf> = [Location::PlatformClassPath, Location::ClassPath]
            .iter()
            .filter_map(|location| self.locations.get(location))
            .flatten()
            .cloned()
            .collect();

        for entry in entries {
            if entry.is_dir() {
                index_directory(&entry, &mut index)?;
            } else if entry.is_file() {
                let mut archive = Archive::open(&entry)?;
                for name in archive.entry_names()? {
                    index.add_class_file(&name);
                }
                self.open_archives.push(archive);
            } else {
                debug!("skipping missing classpath entry {}", entry.display());
            }
        }

        debug!("indexed {} classes", index.len());

        Ok(index)
    }

    /// Source files on the source path. Directory entries are expanded.
    pub fn source_path_files(&self) -> Result<Vec<PathBuf>, FrontendError> {
        let mut files = Vec::new();

        for entry in self.location(Location::SourcePath).unwrap_or_default() {
            if entry.is_dir() {
                for file in WalkDir::new(entry).sort_by_file_name() {
                    let file = file.map_err(|err| FrontendError::io(entry, err.into()))?;
                    if file.file_type().is_file()
                        && file.file_name().to_string_lossy().ends_with(SOURCE_EXTENSION)
                    {
                        files.push(file.into_path());
                    }
                }
            } else {
                files.push(entry.clone());
            }
        }

        Ok(files)
    }
}

fn index_directory(root: &Path, index: &mut ClassIndex) -> Result<(), FrontendError> {
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|err| FrontendError::io(root, err.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        if let Ok(relative) = entry.path().strip_prefix(root) {
            index.add_class_file(&relative.to_string_lossy());
        }
    }

    Ok(())
}

impl FileManager for StandardFileManager {
    fn set_location(
        &mut self,
        location: Location,
        paths: Vec<PathBuf>,
    ) -> Result<(), FrontendError> {
        debug!("{location} = {paths:?}");
        self.locations.insert(location, paths);
        Ok(())
    }

    fn location(&self, location: Location) -> Option<&[PathBuf]> {
        self.locations.get(&location).map(Vec::as_slice)
    }

    fn close(&mut self) -> Result<(), FrontendError> {
        debug!("closing {} archives", self.open_archives.len());
        self.open_archives.clear();
        Ok(())
    }
}
