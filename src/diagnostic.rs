use std::fmt::{
    self,
    Display,
};

use serde::Serialize;

/// Diagnostic codes emitted by the bundled frontend. The strings follow the
/// javac resource-key layout so hosts can match on prefixes.
pub mod codes {
    /// Prefix shared by every "cannot find symbol" style error.
    pub const CANT_RESOLVE_PREFIX: &str = "compiler.err.cant.resolve";

    pub const CANT_RESOLVE_LOCATION: &str = "compiler.err.cant.resolve.location";
    pub const DOESNT_EXIST: &str = "compiler.err.doesnt.exist";
    pub const DUPLICATE_CLASS: &str = "compiler.err.duplicate.class";

    pub const PREMATURE_EOF: &str = "compiler.err.premature.eof";
    pub const EXPECTED: &str = "compiler.err.expected";
    pub const ILLEGAL_START_OF_EXPR: &str = "compiler.err.illegal.start.of.expr";
    pub const ILLEGAL_START_OF_TYPE: &str = "compiler.err.illegal.start.of.type";

    pub const LAMBDA_NOT_SUPPORTED: &str = "compiler.err.lambda.not.supported.in.source";
    pub const METHOD_REFERENCES_NOT_SUPPORTED: &str =
        "compiler.err.method.references.not.supported.in.source";
    pub const DEFAULT_METHODS_NOT_SUPPORTED: &str =
        "compiler.err.default.methods.not.supported.in.source";
    pub const DIAMOND_NOT_SUPPORTED: &str = "compiler.err.diamond.not.supported.in.source";
    pub const TRY_WITH_RESOURCES_NOT_SUPPORTED: &str =
        "compiler.err.try.with.resources.not.supported.in.source";

    const SYNTAX: [&str; 4] = [
        PREMATURE_EOF,
        EXPECTED,
        ILLEGAL_START_OF_EXPR,
        ILLEGAL_START_OF_TYPE,
    ];

    pub fn is_syntax(code: &str) -> bool {
        SYNTAX.contains(&code)
    }

    pub fn is_cant_resolve(code: &str) -> bool {
        code.starts_with(CANT_RESOLVE_PREFIX)
    }
}

/// Severity of a diagnostic, mirroring the kinds a Java compiler reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Error,
    Warning,
}

impl Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Error => write!(f, "error"),
            Kind::Warning => write!(f, "warning"),
        }
    }
}

/// 1-based line/column plus the byte offset into the unit's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

/// One issue found while parsing or analyzing a source unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    pub kind: Kind,
    pub code: String,
    pub message: String,
    /// Logical unit name for in-memory sources, the file path otherwise.
    pub source: Option<String>,
    pub position: Option<Position>,
}

impl Diagnostic {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: Kind::Error,
            code: code.into(),
            message: message.into(),
            source: None,
            position: None,
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: Kind::Warning,
            ..Self::error(code, message)
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == Kind::Error
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "{source}:")?;
        }
        if let Some(position) = &self.position {
            write!(f, "{}:{}:", position.line, position.column)?;
        }
        if self.source.is_some() || self.position.is_some() {
            write!(f, " ")?;
        }
        write!(f, "{}: {} [{}]", self.kind, self.message, self.code)
    }
}

/// Receives diagnostics as the frontend produces them.
pub trait DiagnosticListener {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Append-only, order-preserving diagnostic sink.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Drops everything reported after `len` entries. Used to roll back a
    /// call that failed part way through.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.diagnostics.truncate(len);
    }
}

impl DiagnosticListener for DiagnosticCollector {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
