//! Java source analysis for editor feedback.
//!
//! [`JavacAnalyzer`] runs a compiler [`frontend`] over either a single
//! in-memory unit or a whole source tree and keeps the reported
//! [`Diagnostic`]s in an [`AnalysisSession`].

pub mod analyzer;
pub mod classpath;
pub mod diagnostic;
pub mod error;
pub mod frontend;
pub mod paths;
pub mod settings;
pub mod sources;

pub use analyzer::{
    AnalysisMode,
    AnalysisSession,
    JavacAnalyzer,
};
pub use diagnostic::{
    Diagnostic,
    Kind,
    Position,
};
pub use error::{
    AnalyzerError,
    FrontendError,
};
pub use paths::Directories;
pub use settings::Settings;
