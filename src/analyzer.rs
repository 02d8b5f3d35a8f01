use std::fmt::{
    self,
    Display,
};
use std::path::PathBuf;

use tracing::{
    debug,
    info,
};

use crate::classpath::{
    platform_classpath,
    user_classpath,
};
use crate::diagnostic::{
    codes,
    Diagnostic,
    DiagnosticCollector,
    DiagnosticListener,
};
use crate::error::{
    AnalyzerError,
    FrontendError,
};
use crate::frontend::{
    CompilationTask,
    FileManager,
    Frontend,
    Location,
    SourceUnit,
    StandardFrontend,
};
use crate::paths::{
    ensure_dir,
    Directories,
};
use crate::settings::Settings;
use crate::sources::collect_sources;

/// Which source set a completed call covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    /// One in-memory unit. Unresolved symbols are expected and filtered.
    SingleUnit,
    Tree,
}

impl Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMode::SingleUnit => write!(f, "single-unit"),
            AnalysisMode::Tree => write!(f, "tree"),
        }
    }
}

/// Diagnostics sink plus the first-run flag.
///
/// Every completed call records where its diagnostics start in the sink and
/// which mode produced them, so each entry is filtered by its own origin.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    diagnostics: DiagnosticCollector,
    calls: Vec<(usize, AnalysisMode)>,
    first_run: bool,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self {
            diagnostics: DiagnosticCollector::new(),
            calls: Vec::new(),
            first_run: true,
        }
    }

    /// A session with an empty sink. `first_run` is carried over.
    pub fn reset(self) -> Self {
        Self {
            first_run: self.first_run,
            ..Self::new()
        }
    }

    pub fn is_first_run(&self) -> bool {
        self.first_run
    }

    /// Mode of the most recent completed call since the last reset.
    pub fn last_mode(&self) -> Option<AnalysisMode> {
        self.calls.last().map(|&(_, mode)| mode)
    }

    /// Sink contents in emission order. Unresolved symbols are dropped from
    /// the output of single-unit calls only.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let all = self.diagnostics.diagnostics();
        let mut kept = Vec::with_capacity(all.len());

        for (i, &(start, mode)) in self.calls.iter().enumerate() {
            let end = self
                .calls
                .get(i + 1)
                .map(|&(next, _)| next)
                .unwrap_or(all.len());

            kept.extend(
                all[start..end]
                    .iter()
                    .filter(|diagnostic| {
                        mode == AnalysisMode::Tree || !codes::is_cant_resolve(&diagnostic.code)
                    })
                    .cloned(),
            );
        }

        kept
    }

    pub fn raw_diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.diagnostics()
    }

    fn complete(&mut self, start: usize, mode: AnalysisMode) {
        self.first_run = false;
        self.calls.push((start, mode));
    }
}

/// Compiler flags for one analysis at the given language level.
pub fn compiler_options(version: &str) -> Vec<String> {
    vec![
        "-proc:none".to_string(),
        "-source".to_string(),
        version.to_string(),
        "-target".to_string(),
        version.to_string(),
    ]
}

/// Drives a [`Frontend`] over either one in-memory unit or the whole source
/// tree, collecting diagnostics into an [`AnalysisSession`].
#[derive(Debug)]
pub struct JavacAnalyzer<F: Frontend = StandardFrontend> {
    frontend: F,
    settings: Settings,
    directories: Directories,
    session: AnalysisSession,
}

impl JavacAnalyzer<StandardFrontend> {
    pub fn new(settings: Settings, directories: Directories) -> Self {
        Self::with_frontend(StandardFrontend::new(), settings, directories)
    }
}

impl<F: Frontend> JavacAnalyzer<F> {
    pub fn with_frontend(frontend: F, settings: Settings, directories: Directories) -> Self {
        Self {
            frontend,
            settings,
            directories,
            session: AnalysisSession::new(),
        }
    }

    /// Analyzes `text` as the unit `name`. No source path is configured, so
    /// references to other project types cannot resolve; those diagnostics
    /// are dropped by [`Self::diagnostics`].
    #[tracing::instrument(skip_all, fields(name = %name))]
    pub fn analyze(&mut self, name: &str, text: &str) -> Result<(), AnalyzerError> {
        self.run(AnalysisMode::SingleUnit, vec![SourceUnit::memory(name, text)], None)
    }

    /// Analyzes every `.java` file under the source root.
    #[tracing::instrument(skip_all)]
    pub fn analyze_tree(&mut self) -> Result<(), AnalyzerError> {
        let files = collect_sources(self.directories.source_root_dir())?;
        let units = files.iter().cloned().map(SourceUnit::file).collect();

        self.run(AnalysisMode::Tree, units, Some(files))
    }

    fn run(
        &mut self,
        mode: AnalysisMode,
        units: Vec<SourceUnit>,
        source_path: Option<Vec<PathBuf>>,
    ) -> Result<(), AnalyzerError> {
        let classes_dir = self.directories.classes_dir();
        ensure_dir(&classes_dir).map_err(|source| AnalyzerError::Io {
            path: classes_dir.clone(),
            source,
        })?;

        let mut locations = vec![
            (
                Location::PlatformClassPath,
                platform_classpath(self.directories.classpath_dir()),
            ),
            (Location::ClassPath, user_classpath(&self.settings.classpath)),
        ];
        if let Some(files) = source_path {
            locations.push((Location::SourcePath, files));
        }

        let options = compiler_options(&self.settings.version);
        let mark = self.session.diagnostics.len();
        let mut file_manager = self.frontend.file_manager();

        let result = run_task(
            &self.frontend,
            &mut file_manager,
            &mut self.session.diagnostics,
            locations,
            &options,
            units,
        );
        let closed = file_manager.close();
        let result = result.and(closed).map_err(AnalyzerError::from);

        match result {
            Ok(()) => {
                self.session.complete(mark, mode);
                info!(
                    "{mode} analysis finished with {} diagnostics",
                    self.session.diagnostics.len() - mark
                );
                Ok(())
            }
            Err(err) => {
                debug!("{mode} analysis failed, dropping partial diagnostics");
                self.session.diagnostics.truncate(mark);
                Err(err)
            }
        }
    }

    pub fn is_first_run(&self) -> bool {
        self.session.is_first_run()
    }

    /// Starts a fresh diagnostics sink. `is_first_run` is unaffected.
    pub fn reset(&mut self) {
        self.session = std::mem::take(&mut self.session).reset();
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.session.diagnostics()
    }

    pub fn raw_diagnostics(&self) -> &[Diagnostic] {
        self.session.raw_diagnostics()
    }

    pub fn session(&self) -> &AnalysisSession {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn directories(&self) -> &Directories {
        &self.directories
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }
}

fn run_task<F: Frontend>(
    frontend: &F,
    file_manager: &mut F::FileManager,
    listener: &mut dyn DiagnosticListener,
    locations: Vec<(Location, Vec<PathBuf>)>,
    options: &[String],
    units: Vec<SourceUnit>,
) -> Result<(), FrontendError> {
    for (location, paths) in locations {
        file_manager.set_location(location, paths)?;
    }

    let mut task = frontend.task(file_manager, listener, options, units)?;
    task.parse()?;
    debug!("parse phase done");
    task.analyze()
}

#[cfg(test)]
mod tests {
    use std::cell::{
        Cell,
        RefCell,
    };
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Default)]
    struct Calls {
        locations: Vec<(Location, Vec<PathBuf>)>,
        options: Vec<String>,
        units: Vec<SourceUnit>,
        closed: usize,
    }

    /// Records its configuration and replays canned diagnostics.
    #[derive(Debug, Default)]
    struct ScriptedFrontend {
        calls: Rc<RefCell<Calls>>,
        emit: Vec<Diagnostic>,
        fail: Cell<bool>,
    }

    #[derive(Debug)]
    struct ScriptedFileManager {
        calls: Rc<RefCell<Calls>>,
        locations: Vec<(Location, Vec<PathBuf>)>,
    }

    impl FileManager for ScriptedFileManager {
        fn set_location(
            &mut self,
            location: Location,
            paths: Vec<PathBuf>,
        ) -> Result<(), FrontendError> {
            self.calls
                .borrow_mut()
                .locations
                .push((location, paths.clone()));
            self.locations.push((location, paths));
            Ok(())
        }

        fn location(&self, location: Location) -> Option<&[PathBuf]> {
            self.locations
                .iter()
                .find(|(set, _)| *set == location)
                .map(|(_, paths)| paths.as_slice())
        }

        fn close(&mut self) -> Result<(), FrontendError> {
            self.calls.borrow_mut().closed += 1;
            Ok(())
        }
    }

    struct ScriptedTask<'a> {
        frontend: &'a ScriptedFrontend,
        listener: &'a mut dyn DiagnosticListener,
    }

    impl CompilationTask for ScriptedTask<'_> {
        fn parse(&mut self) -> Result<(), FrontendError> {
            Ok(())
        }

        fn analyze(&mut self) -> Result<(), FrontendError> {
            for diagnostic in &self.frontend.emit {
                self.listener.report(diagnostic.clone());
            }
            if self.frontend.fail.get() {
                return Err(FrontendError::ParseAborted("scripted".to_string()));
            }
            Ok(())
        }
    }

    impl Frontend for ScriptedFrontend {
        type FileManager = ScriptedFileManager;
        type Task<'a> = ScriptedTask<'a>;

        fn file_manager(&self) -> Self::FileManager {
            ScriptedFileManager {
                calls: Rc::clone(&self.calls),
                locations: Vec::new(),
            }
        }

        fn task<'a>(
            &'a self,
            _file_manager: &'a mut Self::FileManager,
            listener: &'a mut dyn DiagnosticListener,
            options: &[String],
            units: Vec<SourceUnit>,
        ) -> Result<Self::Task<'a>, FrontendError> {
            let mut calls = self.calls.borrow_mut();
            calls.options = options.to_vec();
            calls.units = units;

            Ok(ScriptedTask {
                frontend: self,
                listener,
            })
        }
    }

    fn scripted(emit: Vec<Diagnostic>) -> ScriptedFrontend {
        ScriptedFrontend {
            emit,
            ..Default::default()
        }
    }

    fn unresolved() -> Diagnostic {
        Diagnostic::error(codes::CANT_RESOLVE_LOCATION, "cannot find symbol")
    }

    fn analyzer(
        frontend: ScriptedFrontend,
        root: &std::path::Path,
    ) -> JavacAnalyzer<ScriptedFrontend> {
        let settings = Settings::default()
            .with_version("8")
            .with_classpath("a.jar:b.jar");
        JavacAnalyzer::with_frontend(frontend, settings, Directories::under(root))
    }

    #[test]
    fn test_single_unit_configuration() {
        let tmp = tempfile::tempdir().unwrap();
        let mut analyzer = analyzer(scripted(vec![]), tmp.path());

        assert!(analyzer.is_first_run());
        analyzer.analyze("Foo", "class Foo {}").unwrap();
        assert!(!analyzer.is_first_run());
        assert!(tmp.path().join("bin/classes").is_dir());

        let calls = analyzer.frontend().calls.borrow();
        assert_eq!(calls.options, compiler_options("8"));
        assert_eq!(
            calls.locations,
            vec![
                (
                    Location::PlatformClassPath,
                    vec![
                        tmp.path().join("classpath/android.jar"),
                        tmp.path().join("classpath/core-lambda-stubs.jar"),
                    ]
                ),
                (
                    Location::ClassPath,
                    vec![PathBuf::from("a.jar"), PathBuf::from("b.jar")]
                ),
            ]
        );
        assert_eq!(calls.units, vec![SourceUnit::memory("Foo", "class Foo {}")]);
        assert_eq!(calls.closed, 1);
    }

    #[test]
    fn test_tree_sets_source_path() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(src.join("p")).unwrap();
        std::fs::write(src.join("Main.java"), "class Main {}").unwrap();
        std::fs::write(src.join("p/Util.java"), "package p; class Util {}").unwrap();

        let mut analyzer = analyzer(scripted(vec![]), tmp.path());
        analyzer.analyze_tree().unwrap();

        let expected = vec![src.join("Main.java"), src.join("p").join("Util.java")];
        let calls = analyzer.frontend().calls.borrow();
        assert_eq!(
            calls.locations.last(),
            Some(&(Location::SourcePath, expected.clone()))
        );
        assert_eq!(
            calls.units,
            expected.into_iter().map(SourceUnit::file).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_single_unit_filters_unresolved() {
        let tmp = tempfile::tempdir().unwrap();
        let other = Diagnostic::error(codes::EXPECTED, "';' expected");
        let mut analyzer = analyzer(scripted(vec![unresolved(), other.clone()]), tmp.path());

        assert!(analyzer.diagnostics().is_empty());
        analyzer.analyze("Foo", "").unwrap();

        assert_eq!(analyzer.diagnostics(), vec![other]);
        assert_eq!(analyzer.raw_diagnostics().len(), 2);
    }

    #[test]
    fn test_tree_keeps_unresolved() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("src")).unwrap();
        let mut analyzer = analyzer(scripted(vec![unresolved()]), tmp.path());

        analyzer.analyze_tree().unwrap();
        assert_eq!(analyzer.diagnostics(), vec![unresolved()]);
    }

    #[test]
    fn test_failure_rolls_back() {
        let tmp = tempfile::tempdir().unwrap();
        let frontend = scripted(vec![unresolved()]);
        frontend.fail.set(true);
        let mut analyzer = analyzer(frontend, tmp.path());

        let result = analyzer.analyze("Foo", "");
        assert!(matches!(
            result,
            Err(AnalyzerError::Frontend(FrontendError::ParseAborted(_)))
        ));
        assert!(analyzer.is_first_run());
        assert!(analyzer.raw_diagnostics().is_empty());
        assert_eq!(analyzer.frontend().calls.borrow().closed, 1);

        analyzer.frontend().fail.set(false);
        analyzer.analyze("Foo", "").unwrap();
        assert!(!analyzer.is_first_run());
        assert_eq!(analyzer.raw_diagnostics().len(), 1);
    }

    #[test]
    fn test_accumulate_then_reset() {
        let tmp = tempfile::tempdir().unwrap();
        let note = Diagnostic::warning("compiler.warn.scripted", "scripted");
        let mut analyzer = analyzer(scripted(vec![note]), tmp.path());

        analyzer.analyze("A", "").unwrap();
        analyzer.analyze("B", "").unwrap();
        assert_eq!(analyzer.diagnostics().len(), 2);

        analyzer.reset();
        assert!(analyzer.diagnostics().is_empty());
        assert!(!analyzer.is_first_run());
    }

    #[test]
    fn test_session_reset_keeps_first_run() {
        let session = AnalysisSession::new();
        assert!(session.is_first_run());
        assert!(session.clone().reset().is_first_run());

        let mut session = session;
        session.complete(0, AnalysisMode::Tree);
        let session = session.reset();
        assert!(!session.is_first_run());
        assert_eq!(session.last_mode(), None);
        assert!(session.raw_diagnostics().is_empty());
    }

    #[test]
    fn test_session_filters_by_origin() {
        let mut session = AnalysisSession::new();
        let tree_error = unresolved().with_source("Main.java");
        let unit_error = unresolved().with_source("Foo");

        session.diagnostics.report(tree_error.clone());
        session.complete(0, AnalysisMode::Tree);
        session.diagnostics.report(unit_error);
        session.complete(1, AnalysisMode::SingleUnit);
        session.complete(2, AnalysisMode::Tree);

        assert_eq!(session.diagnostics(), vec![tree_error]);
        assert_eq!(session.raw_diagnostics().len(), 2);
        assert_eq!(session.last_mode(), Some(AnalysisMode::Tree));
    }
}
