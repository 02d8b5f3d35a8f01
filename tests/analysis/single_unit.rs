use code_analyzer::diagnostic::codes;
use code_analyzer::{
    AnalyzerError,
    FrontendError,
    Settings,
};
use insta::assert_snapshot;

use crate::{
    analyzer,
    reported_codes,
};

const HELLO: &str = r#"public class Foo {
    public static void main(String[] args) {
        StringBuilder greeting = new StringBuilder("hello");
        System.out.println(greeting.toString());
    }
}
"#;

#[test]
fn test_clean_source() {
    let tmp = tempfile::tempdir().unwrap();
    let mut analyzer = analyzer(tmp.path(), Settings::default());

    analyzer.analyze("Foo", HELLO).unwrap();

    assert!(analyzer.diagnostics().is_empty());
    assert!(tmp.path().join("bin/classes").is_dir());
}

#[test]
fn test_unresolved_types_are_filtered() {
    let tmp = tempfile::tempdir().unwrap();
    let mut analyzer = analyzer(tmp.path(), Settings::default());

    analyzer
        .analyze("Foo", "class Foo {\n    Helper helper;\n}\n")
        .unwrap();

    assert!(analyzer.diagnostics().is_empty());
    assert_eq!(analyzer.raw_diagnostics().len(), 1);
    assert_snapshot!(analyzer.raw_diagnostics()[0].to_string(), @r"
    Foo:2:5: error: cannot find symbol
      symbol:   class Helper
      location: class Foo [compiler.err.cant.resolve.location]
    ");
}

#[test]
fn test_missing_closing_brace() {
    let tmp = tempfile::tempdir().unwrap();
    let mut analyzer = analyzer(tmp.path(), Settings::default().with_version("8"));

    analyzer
        .analyze("Foo", "public class Foo {\n    public void bar() {\n    }\n")
        .unwrap();

    let diagnostics = analyzer.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert!(codes::is_syntax(&diagnostics[0].code));
    assert_eq!(diagnostics[0].source.as_deref(), Some("Foo"));
}

#[test]
fn test_first_run_lifecycle() {
    let tmp = tempfile::tempdir().unwrap();
    let mut analyzer = analyzer(tmp.path(), Settings::default());
    assert!(analyzer.is_first_run());

    analyzer.analyze("Foo", HELLO).unwrap();
    assert!(!analyzer.is_first_run());

    analyzer.analyze("Foo", HELLO).unwrap();
    analyzer.reset();
    assert!(!analyzer.is_first_run());
}

#[test]
fn test_invalid_version_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let mut analyzer = analyzer(tmp.path(), Settings::default().with_version("eleventy"));

    let result = analyzer.analyze("Foo", HELLO);

    assert!(matches!(
        result,
        Err(AnalyzerError::Frontend(FrontendError::InvalidRelease(_)))
    ));
    assert!(analyzer.is_first_run());
    assert!(analyzer.raw_diagnostics().is_empty());
}

#[test]
fn test_lambda_depends_on_version() {
    let tmp = tempfile::tempdir().unwrap();
    let text = "class Foo {\n    Runnable task = () -> {};\n}\n";

    let mut analyzer = analyzer(tmp.path(), Settings::default().with_version("7"));
    analyzer.analyze("Foo", text).unwrap();
    assert_snapshot!(reported_codes(&analyzer).join(", "), @"compiler.err.lambda.not.supported.in.source");

    analyzer.reset();
    analyzer.set_settings(Settings::default().with_version("8"));
    analyzer.analyze("Foo", text).unwrap();
    assert!(analyzer.diagnostics().is_empty());
}

#[test]
fn test_diagnostics_accumulate_until_reset() {
    let tmp = tempfile::tempdir().unwrap();
    let mut analyzer = analyzer(tmp.path(), Settings::default().with_version("7"));
    let text = "class Foo {\n    Runnable task = () -> {};\n}\n";

    analyzer.analyze("Foo", text).unwrap();
    analyzer.analyze("Foo", text).unwrap();
    assert_eq!(analyzer.diagnostics().len(), 2);

    analyzer.reset();
    assert!(analyzer.diagnostics().is_empty());
}
