use code_analyzer::sources::collect_sources;
use code_analyzer::{
    AnalyzerError,
    Settings,
};
use insta::assert_snapshot;

use crate::{
    analyzer,
    reported_codes,
    write,
};

#[test]
fn test_cross_package_tree_is_clean() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "src/com/acme/App.java",
        "package com.acme;\n\nimport com.acme.util.Strings;\n\npublic class App {\n    private Strings strings = new Strings();\n}\n",
    );
    write(
        tmp.path(),
        "src/com/acme/util/Strings.java",
        "package com.acme.util;\n\npublic class Strings {\n    public String trim(String value) {\n        return value.trim();\n    }\n}\n",
    );

    let mut analyzer = analyzer(tmp.path(), Settings::default());
    analyzer.analyze_tree().unwrap();

    assert!(analyzer.diagnostics().is_empty(), "{:?}", analyzer.diagnostics());
    assert!(!analyzer.is_first_run());
}

#[test]
fn test_unresolved_types_are_kept() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "src/Main.java", "public class Main {\n    Missing field;\n}\n");

    let mut analyzer = analyzer(tmp.path(), Settings::default());
    analyzer.analyze_tree().unwrap();

    assert_snapshot!(reported_codes(&analyzer).join(", "), @"compiler.err.cant.resolve.location");
}

#[test]
fn test_classpath_directory_resolves() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "lib/com/vendor/Widget.class", "");
    write(
        tmp.path(),
        "src/Main.java",
        "import com.vendor.Widget;\n\nclass Main {\n    Widget widget;\n}\n",
    );

    let mut without = analyzer(tmp.path(), Settings::default());
    without.analyze_tree().unwrap();
    assert_snapshot!(reported_codes(&without).join(", "), @"compiler.err.doesnt.exist");

    let classpath = tmp.path().join("lib").to_string_lossy().into_owned();
    let mut with = analyzer(tmp.path(), Settings::default().with_classpath(classpath));
    with.analyze_tree().unwrap();
    assert!(with.diagnostics().is_empty(), "{:?}", with.diagnostics());
}

#[test]
fn test_source_collection() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "src/b/Beta.java", "class Beta {}\n");
    write(tmp.path(), "src/a/z/Deep.java", "class Deep {}\n");
    write(tmp.path(), "src/a/Alpha.java", "class Alpha {}\n");
    write(tmp.path(), "src/Main.java", "class Main {}\n");
    write(tmp.path(), "src/README.md", "# notes\n");
    write(tmp.path(), "src/a/Alpha.class", "");

    let root = tmp.path().join("src");
    let files: Vec<String> = collect_sources(&root)
        .unwrap()
        .iter()
        .map(|path| path.strip_prefix(&root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(
        files,
        vec!["Main.java", "a/Alpha.java", "a/z/Deep.java", "b/Beta.java"]
    );
}

#[test]
fn test_missing_source_root() {
    let tmp = tempfile::tempdir().unwrap();
    let mut analyzer = analyzer(tmp.path(), Settings::default());

    assert!(matches!(analyzer.analyze_tree(), Err(AnalyzerError::Walk(_))));
    assert!(analyzer.is_first_run());
}

#[test]
fn test_local_and_inherited_member_types() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "src/Base.java",
        "public class Base {\n    public static class Node {}\n}\n",
    );
    write(
        tmp.path(),
        "src/Child.java",
        "public class Child extends Base {\n    Node node;\n}\n",
    );
    write(
        tmp.path(),
        "src/Main.java",
        "public class Main {\n    void run() {\n        class Local {}\n        Local local = new Local();\n    }\n}\n",
    );

    let mut analyzer = analyzer(tmp.path(), Settings::default());
    analyzer.analyze_tree().unwrap();

    assert!(analyzer.diagnostics().is_empty(), "{:?}", analyzer.diagnostics());
}

#[test]
fn test_tree_errors_survive_single_unit_call() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "src/Main.java", "public class Main {\n    Missing field;\n}\n");

    let mut analyzer = analyzer(tmp.path(), Settings::default());
    analyzer.analyze_tree().unwrap();
    analyzer.analyze("Foo", "class Foo {}\n").unwrap();

    assert_snapshot!(reported_codes(&analyzer).join(", "), @"compiler.err.cant.resolve.location");
}

#[test]
fn test_single_unit_noise_stays_hidden_after_tree() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "src/Main.java", "public class Main {}\n");

    let mut analyzer = analyzer(tmp.path(), Settings::default());
    analyzer
        .analyze("Foo", "class Foo {\n    Helper helper;\n}\n")
        .unwrap();
    analyzer.analyze_tree().unwrap();

    assert!(analyzer.diagnostics().is_empty(), "{:?}", analyzer.diagnostics());
    assert_eq!(analyzer.raw_diagnostics().len(), 1);
}
