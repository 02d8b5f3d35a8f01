use std::path::Path;

use code_analyzer::{
    Directories,
    JavacAnalyzer,
    Settings,
};

mod single_unit;
mod tree;

/// An analyzer laid out under `root` with the `bin/`, `classpath/` and `src/`
/// directories.
fn analyzer(root: &Path, settings: Settings) -> JavacAnalyzer {
    JavacAnalyzer::new(settings, Directories::under(root))
}

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, text).unwrap();
}

fn reported_codes(analyzer: &JavacAnalyzer) -> Vec<String> {
    analyzer
        .diagnostics()
        .into_iter()
        .map(|diagnostic| diagnostic.code)
        .collect()
}
