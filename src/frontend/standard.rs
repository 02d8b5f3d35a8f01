use std::path::PathBuf;

use rustc_hash::FxHashSet;
use tracing::debug;
use tree_sitter::{
    Parser,
    Tree,
};

use super::attr::{
    enter_unit,
    UnitChecker,
};
use super::file_manager::StandardFileManager;
use super::options::CompilerOptions;
use super::symbols::ClassIndex;
use super::syntax::syntax_errors;
use super::{
    CompilationTask,
    Frontend,
    SourceUnit,
};
use crate::diagnostic::{
    Diagnostic,
    DiagnosticListener,
};
use crate::error::FrontendError;

/// Java frontend backed by `tree-sitter-java`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardFrontend;

impl StandardFrontend {
    pub fn new() -> Self {
        StandardFrontend
    }
}

pub(crate) fn java_parser() -> Result<Parser, FrontendError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_java::language())?;
    Ok(parser)
}

impl Frontend for StandardFrontend {
    type FileManager = StandardFileManager;
    type Task<'a> = StandardTask<'a>;

    fn file_manager(&self) -> Self::FileManager {
        StandardFileManager::new()
    }

    #[tracing::instrument(skip_all)]
    fn task<'a>(
        &'a self,
        file_manager: &'a mut Self::FileManager,
        listener: &'a mut dyn DiagnosticListener,
        options: &[String],
        units: Vec<SourceUnit>,
    ) -> Result<Self::Task<'a>, FrontendError> {
        let options = CompilerOptions::parse(options)?;
        debug!(
            "source {} target {} with {} units",
            options.source,
            options.target,
            units.len()
        );

        Ok(StandardTask {
            file_manager,
            listener,
            options,
            units,
            parser: java_parser()?,
            parsed: Vec::new(),
            parse_failed: false,
        })
    }
}

struct ParsedUnit {
    name: String,
    path: Option<PathBuf>,
    text: String,
    tree: Tree,
}

/// Parse then analyze over a fixed set of units.
pub struct StandardTask<'a> {
    file_manager: &'a mut StandardFileManager,
    listener: &'a mut dyn DiagnosticListener,
    options: CompilerOptions,
    units: Vec<SourceUnit>,
    parser: Parser,
    parsed: Vec<ParsedUnit>,
    parse_failed: bool,
}

impl StandardTask<'_> {
    pub fn options(&self) -> CompilerOptions {
        self.options
    }

    fn parse_text(&mut self, name: &str, text: &str) -> Result<Tree, FrontendError> {
        self.parser
            .parse(text, None)
            .ok_or_else(|| FrontendError::ParseAborted(name.to_string()))
    }

    fn report(&mut self, source: &str, diagnostics: Vec<Diagnostic>) {
        for diagnostic in diagnostics {
            self.listener.report(diagnostic.with_source(source));
        }
    }

    /// Types declared by source path files that are not part of the task.
    /// They resolve but are not checked.
    fn implicit_sources(&mut self, sources: &mut ClassIndex) -> Result<(), FrontendError> {
        let explicit: FxHashSet<PathBuf> = self
            .parsed
            .iter()
            .filter_map(|unit| unit.path.clone())
            .collect();

        for path in self.file_manager.source_path_files()? {
            if explicit.contains(&path) {
                continue;
            }

            let text = std::fs::read_to_string(&path).map_err(|err| FrontendError::io(&path, err))?;
            let tree = self.parse_text(&path.to_string_lossy(), &text)?;
            enter_unit(&tree, &text, sources);
        }

        Ok(())
    }
}

impl CompilationTask for StandardTask<'_> {
    #[tracing::instrument(skip_all)]
    fn parse(&mut self) -> Result<(), FrontendError> {
        let units = std::mem::take(&mut self.units);

        for unit in units {
            let name = unit.display_name();
            let (path, text) = match unit {
                SourceUnit::Memory { text, .. } => (None, text),
                SourceUnit::File(path) => {
                    let text =
                        std::fs::read_to_string(&path).map_err(|err| FrontendError::io(&path, err))?;
                    (Some(path), text)
                }
            };

            let tree = self.parse_text(&name, &text)?;
            let errors = syntax_errors(&tree, &text);
            debug!("parsed {name}: {} syntax errors", errors.len());

            self.parse_failed |= !errors.is_empty();
            self.report(&name, errors);
            self.parsed.push(ParsedUnit {
                name,
                path,
                text,
                tree,
            });
        }

        Ok(())
    }

    #[tracing::instrument(skip_all)]
    fn analyze(&mut self) -> Result<(), FrontendError> {
        if self.parse_failed {
            debug!("skipping attribution after syntax errors");
            return Ok(());
        }

        let classpath = self.file_manager.class_index()?;
        let mut sources = ClassIndex::new();
        let mut reports = Vec::new();

        for unit in &self.parsed {
            let duplicates = enter_unit(&unit.tree, &unit.text, &mut sources);
            reports.push((unit.name.clone(), duplicates));
        }
        self.implicit_sources(&mut sources)?;

        for (unit, (_, diagnostics)) in self.parsed.iter().zip(reports.iter_mut()) {
            let checker = UnitChecker::new(&unit.text, self.options, &classpath, &sources);
            diagnostics.extend(checker.check(&unit.tree));
        }

        for (name, diagnostics) in reports {
            self.report(&name, diagnostics);
        }

        Ok(())
    }
}
