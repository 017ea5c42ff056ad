//! Edit plans applied to files on disk.

use std::fs;
use tempfile::TempDir;
use ts_splice::config::{apply_plan, load_from_path, ApplicationError, EditResult};

const SOURCE: &str = r#"interface Options {
    verbose: boolean;
}

var defaults = { verbose: false };
let handlers = [onStart];

function run(options: Options) {
    if (options.verbose) {
        console.log("running");
    }
}
"#;

fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/app.ts"), SOURCE).unwrap();
    dir
}

fn write_plan(dir: &TempDir, plan: &str) -> std::path::PathBuf {
    let path = dir.path().join("plan.toml");
    fs::write(&path, plan).unwrap();
    path
}

#[test]
fn full_plan_applies_every_operation() {
    let dir = setup();
    let plan_path = write_plan(
        &dir,
        r#"
[meta]
name = "app cleanup"

[[edits]]
id = "defaults-const"
file = "src/app.ts"
target = { type = "variable_statement", name = "defaults" }
operation = { type = "set_declaration_type", declaration_type = "const" }

[[edits]]
id = "more-handlers"
file = "src/app.ts"
target = { type = "array", variable = "handlers" }
operation = { type = "insert_array_elements", elements = ["onStop"] }

[[edits]]
id = "default-retries"
file = "src/app.ts"
target = { type = "object", variable = "defaults" }

[edits.operation]
type = "insert_property_assignments"
properties = [{ name = "retries", initializer = "3" }]

[[edits]]
id = "run-retries"
file = "src/app.ts"
target = { type = "function", name = "run" }

[edits.operation]
type = "insert_parameters"
parameters = [{ name = "retries", type = "number" }]

[[edits]]
id = "rename-verbose"
file = "src/app.ts"
target = { type = "property_signature", interface = "Options", name = "verbose" }
operation = { type = "rename", new_name = "debug" }

[[edits]]
id = "version"
file = "src/app.ts"

[edits.operation]
type = "add_variable_statements"

[[edits.operation.statements]]
is_exported = true
declaration_type = "const"
declarations = [{ name = "VERSION", type = "string", initializer = "'1.0'" }]
"#,
    );

    let plan = load_from_path(&plan_path).unwrap();
    let report = apply_plan(&plan, dir.path(), false);

    for (id, result) in &report.results {
        assert!(
            matches!(result, Ok(EditResult::Applied { .. })),
            "{id}: {result:?}"
        );
    }

    let expected = r#"interface Options {
    debug: boolean;
}

const defaults = { verbose: false, retries: 3 };
let handlers = [onStart, onStop];

function run(options: Options, retries: number) {
    if (options.debug) {
        console.log("running");
    }
}
export const VERSION: string = '1.0';
"#;
    assert_eq!(fs::read_to_string(dir.path().join("src/app.ts")).unwrap(), expected);
}

#[test]
fn second_run_reports_already_applied() {
    let dir = setup();
    let plan_path = write_plan(
        &dir,
        r#"
[[edits]]
id = "defaults-const"
file = "src/app.ts"
target = { type = "variable_statement", name = "defaults" }
operation = { type = "set_declaration_type", declaration_type = "const" }
"#,
    );
    let plan = load_from_path(&plan_path).unwrap();

    let first = apply_plan(&plan, dir.path(), false);
    assert!(matches!(first.results[0].1, Ok(EditResult::Applied { .. })));

    let second = apply_plan(&plan, dir.path(), false);
    assert!(matches!(
        second.results[0].1,
        Ok(EditResult::AlreadyApplied { .. })
    ));
    assert!(second.changes.is_empty());
}

#[test]
fn unknown_target_fails_without_touching_the_file() {
    let dir = setup();
    let plan_path = write_plan(
        &dir,
        r#"
[[edits]]
id = "missing"
file = "src/app.ts"
target = { type = "function", name = "doesNotExist" }
operation = { type = "remove_parameter", name = "x" }
"#,
    );
    let plan = load_from_path(&plan_path).unwrap();
    let report = apply_plan(&plan, dir.path(), false);

    assert!(matches!(
        report.results[0].1,
        Err(ApplicationError::Manipulation { .. })
    ));
    assert_eq!(fs::read_to_string(dir.path().join("src/app.ts")).unwrap(), SOURCE);
}

#[test]
fn settings_shape_inserted_text() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.ts"), "const o = {\r\n\ta: 1\r\n};\r\n").unwrap();
    let plan_path = write_plan(
        &dir,
        r#"
[settings]
indentation = "tab"
new_line = "crlf"

[[edits]]
id = "props"
file = "a.ts"
target = { type = "object", variable = "o" }

[edits.operation]
type = "insert_property_assignments"
properties = [{ name = "b", initializer = "2" }, { name = "c", initializer = "3" }]
"#,
    );
    let plan = load_from_path(&plan_path).unwrap();
    let report = apply_plan(&plan, dir.path(), false);
    assert_eq!(report.failure_count(), 0);

    let text = fs::read_to_string(dir.path().join("a.ts")).unwrap();
    assert!(text.starts_with("const o = {\r\n\ta: 1,\r\n\tb: 2"), "{text:?}");
    assert!(text.contains("\tc: 3"), "{text:?}");
    assert!(text.ends_with("\r\n};\r\n"), "{text:?}");
    assert!(!text.replace("\r\n", "").contains('\n'), "{text:?}");
}
