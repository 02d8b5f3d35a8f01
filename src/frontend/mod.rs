//! The compiler frontend seam.
//!
//! The analyzer only needs three capabilities from a frontend: a file
//! manager whose search paths can be set per [`Location`], and a task that
//! runs `parse` then `analyze` over a set of [`SourceUnit`]s while reporting
//! into a [`DiagnosticListener`]. [`StandardFrontend`] is the bundled
//! implementation; anything else implementing [`Frontend`] can be dropped in.

use std::fmt::{
    self,
    Debug,
    Display,
};
use std::path::PathBuf;

use crate::diagnostic::DiagnosticListener;
use crate::error::FrontendError;

pub mod archive;
pub mod attr;
pub mod file_manager;
pub mod options;
pub mod standard;
pub mod symbols;
pub mod syntax;

pub use file_manager::StandardFileManager;
pub use options::CompilerOptions;
pub use standard::StandardFrontend;

/// Search path roles a file manager can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    PlatformClassPath,
    ClassPath,
    SourcePath,
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::PlatformClassPath => write!(f, "PLATFORM_CLASS_PATH"),
            Location::ClassPath => write!(f, "CLASS_PATH"),
            Location::SourcePath => write!(f, "SOURCE_PATH"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Source,
}

/// One compilable input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceUnit {
    /// Text held in memory under a logical name such as `"Foo"`.
    Memory {
        name: String,
        text: String,
        kind: SourceKind,
    },
    File(PathBuf),
}

impl SourceUnit {
    pub fn memory(name: impl Into<String>, text: impl Into<String>) -> Self {
        SourceUnit::Memory {
            name: name.into(),
            text: text.into(),
            kind: SourceKind::Source,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        SourceUnit::File(path.into())
    }

    /// Name used when reporting diagnostics against this unit.
    pub fn display_name(&self) -> String {
        match self {
            SourceUnit::Memory { name, .. } => name.clone(),
            SourceUnit::File(path) => path.to_string_lossy().into_owned(),
        }
    }
}

pub trait FileManager: Debug {
    /// Replaces the search path for `location`.
    fn set_location(&mut self, location: Location, paths: Vec<PathBuf>)
        -> Result<(), FrontendError>;

    fn location(&self, location: Location) -> Option<&[PathBuf]>;

    /// Releases every handle the manager opened.
    fn close(&mut self) -> Result<(), FrontendError>;
}

pub trait CompilationTask {
    fn parse(&mut self) -> Result<(), FrontendError>;
    fn analyze(&mut self) -> Result<(), FrontendError>;
}

pub trait Frontend: Debug {
    type FileManager: FileManager;
    type Task<'a>: CompilationTask
    where
        Self: 'a;

    fn file_manager(&self) -> Self::FileManager;

    /// Builds a task over `units`. Fails on options the frontend does not
    /// accept; problems inside the units are reported to `listener` later.
    fn task<'a>(
        &'a self,
        file_manager: &'a mut Self::FileManager,
        listener: &'a mut dyn DiagnosticListener,
        options: &[String],
        units: Vec<SourceUnit>,
    ) -> Result<Self::Task<'a>, FrontendError>;
}
