use std::path::PathBuf;
use std::process::ExitCode;

use clap::{
    Args,
    Parser,
    Subcommand,
};
use code_analyzer::paths::read_file;
use code_analyzer::{
    AnalyzerError,
    Diagnostic,
    Directories,
    JavacAnalyzer,
    Settings,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Reports Java compiler diagnostics for a single file or a source tree.
#[derive(Parser)]
#[command(name = "code-analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    config: ConfigArgs,

    /// Print diagnostics as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one file in isolation. Unresolved symbols are not reported.
    Check { file: PathBuf },
    /// Analyze every source file under the source root.
    Tree,
}

#[derive(Args)]
struct ConfigArgs {
    /// JSON settings file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Java language level, overrides the settings file
    #[arg(long = "version", global = true)]
    language_version: Option<String>,

    /// Colon separated classpath, overrides the settings file
    #[arg(long, global = true)]
    classpath: Option<String>,

    #[arg(long, global = true, default_value = "bin")]
    bin_dir: PathBuf,

    /// Directory holding the platform stub archives
    #[arg(long, global = true, default_value = "classpath")]
    classpath_dir: PathBuf,

    #[arg(long, global = true, default_value = "src")]
    source_root: PathBuf,
}

impl ConfigArgs {
    fn settings(&self) -> Result<Settings, AnalyzerError> {
        let mut settings = match &self.settings {
            Some(path) => Settings::load_from_file(path)?,
            None => Settings::default(),
        };
        if let Some(version) = &self.language_version {
            settings = settings.with_version(version);
        }
        if let Some(classpath) = &self.classpath {
            settings = settings.with_classpath(classpath);
        }

        Ok(settings)
    }

    fn directories(&self) -> Directories {
        Directories::new(&self.bin_dir, &self.classpath_dir, &self.source_root)
    }
}

fn init_logging(cli: &Cli) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "warn" })
    });
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &cli.log_file {
        Some(path) => {
            let directory = path.parent().map(PathBuf::from).unwrap_or_default();
            let file_name = path.file_name().map(PathBuf::from).unwrap_or_default();
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            builder.with_ansi(false).with_writer(writer).init();
            Some(guard)
        }
        None => {
            builder.with_writer(std::io::stderr).init();
            None
        }
    }
}

fn run(cli: &Cli) -> Result<Vec<Diagnostic>, AnalyzerError> {
    let mut analyzer = JavacAnalyzer::new(cli.config.settings()?, cli.config.directories());

    match &cli.command {
        Command::Check { file } => {
            let text = read_file(file).map_err(|source| AnalyzerError::Io {
                path: file.clone(),
                source,
            })?;
            let name = file
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            analyzer.analyze(&name, &text)?;
        }
        Command::Tree => analyzer.analyze_tree()?,
    }

    Ok(analyzer.diagnostics())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_logging(&cli);

    let diagnostics = match run(&cli) {
        Ok(diagnostics) => diagnostics,
        Err(err) => {
            eprintln!("code-analyzer: error: {err}");
            return ExitCode::from(2);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&diagnostics) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("code-analyzer: error: {err}");
                return ExitCode::from(2);
            }
        }
    } else {
        for diagnostic in &diagnostics {
            println!("{diagnostic}");
        }
    }

    if diagnostics.iter().any(Diagnostic::is_error) {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
