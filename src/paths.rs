use std::io;
use std::path::{
    Path,
    PathBuf,
};

/// Directory layout the analyzer works in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    bin_dir: PathBuf,
    classpath_dir: PathBuf,
    source_root_dir: PathBuf,
}

impl Directories {
    pub fn new(
        bin_dir: impl Into<PathBuf>,
        classpath_dir: impl Into<PathBuf>,
        source_root_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            classpath_dir: classpath_dir.into(),
            source_root_dir: source_root_dir.into(),
        }
    }

    /// Lays out `bin/`, `classpath/` and `src/` under a single project root.
    pub fn under(root: &Path) -> Self {
        Self::new(root.join("bin"), root.join("classpath"), root.join("src"))
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Holds the bundled platform stub archives.
    pub fn classpath_dir(&self) -> &Path {
        &self.classpath_dir
    }

    pub fn source_root_dir(&self) -> &Path {
        &self.source_root_dir
    }

    /// Output directory for compiled classes.
    pub fn classes_dir(&self) -> PathBuf {
        self.bin_dir.join("classes")
    }
}

pub fn read_file(path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
}

/// Creates `path` and its parents; an existing directory is not an error.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    match std::fs::create_dir_all(path) {
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        result => result,
    }
}
