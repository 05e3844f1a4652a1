//! Test harness for the Column pipeline against fixture files.
//!
//! Every `.col` file in test/col/ is loaded and compared with the JSON
//! document of the same name in test/json/. Files in test/err/ are expected
//! to fail, with the error code and position recorded in a `.error` file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use libcolumn::{encode, load, Value};

/// Root test directory.
fn test_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
}

/// Get all files with a given extension from a subdirectory of test/.
fn get_files_in_subdir(subdir: &str, ext: &str) -> Vec<PathBuf> {
    let pattern = test_root().join(subdir).join(format!("*.{}", ext));
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .expect("valid glob pattern")
        .flatten()
        .collect();
    files.sort();
    files
}

/// The environment every fixture is loaded with.
fn fixture_env() -> HashMap<String, String> {
    [
        ("COLUMN_FIXTURE_HOST", "db.internal"),
        ("COLUMN_FIXTURE_PORT", "5432"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Integer(n) => serde_json::Value::from(*n),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(arr) => serde_json::Value::Array(arr.iter().map(to_json).collect()),
        Value::Object(obj) => serde_json::Value::Object(
            obj.iter().map(|(k, v)| (k.clone(), to_json(v))).collect(),
        ),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

/// Read the expected JSON for a .col fixture.
fn read_expected_json(col_path: &Path) -> Option<serde_json::Value> {
    let basename = col_path.file_stem().unwrap().to_string_lossy();
    let json_path = test_root().join("json").join(format!("{}.json", basename));
    let text = fs::read_to_string(json_path).ok()?;
    serde_json::from_str(&text).ok()
}

/// Read the expected error for a failing fixture.
fn read_expected_error(col_path: &Path) -> Option<String> {
    fs::read_to_string(col_path.with_extension("error")).ok()
}

/// Run a single .col fixture (expected to succeed).
fn run_col_test(path: &Path) -> Result<(), String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {:?}: {}", path, e))?;
    let filename = file_name(path);

    let value = load(&content, &fixture_env())
        .map_err(|e| format!("{}: Unexpected error: {}", filename, e))?
        .into_value();

    let expected = read_expected_json(path)
        .ok_or_else(|| format!("{}: Missing or invalid expected JSON", filename))?;
    let actual = to_json(&value);
    if actual != expected {
        return Err(format!(
            "{}: Output mismatch\n    expected: {}\n    actual:   {}",
            filename, expected, actual
        ));
    }

    // The encoder must reproduce the same value.
    let reencoded = encode(&value);
    let reloaded = load(&reencoded, &fixture_env())
        .map_err(|e| format!("{}: Re-encoded output failed: {}\n{}", filename, e, reencoded))?
        .into_value();
    if reloaded != value {
        return Err(format!(
            "{}: Re-encoded value mismatch\n    original: {:?}\n    reloaded: {:?}",
            filename, value, reloaded
        ));
    }

    println!("  {} => {}", filename, actual);
    Ok(())
}

/// Run a single failing fixture (expected to fail with a specific error).
fn run_err_test(path: &Path) -> Result<(), String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {:?}: {}", path, e))?;
    let filename = file_name(path);

    match load(&content, &fixture_env()) {
        Ok(result) => Err(format!(
            "{}: Expected an error, but got success: {:?}",
            filename,
            result.into_value()
        )),
        Err(e) => {
            let actual = format!("{} at {}", e.code(), e.position());
            match read_expected_error(path) {
                Some(expected) if expected.trim() == actual => {
                    println!("  {} => error (as expected)", filename);
                    Ok(())
                }
                Some(expected) => Err(format!(
                    "{}: Error mismatch\n    expected: {}\n    actual:   {}",
                    filename,
                    expected.trim(),
                    actual
                )),
                None => {
                    println!("  {} => error: {} (no .error file to compare)", filename, e);
                    Ok(())
                }
            }
        }
    }
}

fn run_all(files: &[PathBuf], run: fn(&Path) -> Result<(), String>) -> usize {
    let mut passed = 0;
    let mut errors: Vec<String> = Vec::new();

    for file in files {
        match run(file) {
            Ok(()) => passed += 1,
            Err(e) => errors.push(e),
        }
    }

    println!("\nResults: {} passed, {} failed", passed, errors.len());

    if !errors.is_empty() {
        println!("\nErrors:");
        for error in &errors {
            println!("  - {}", error);
        }
    }
    errors.len()
}

#[test]
fn test_all_col_fixtures() {
    let files = get_files_in_subdir("col", "col");
    assert!(!files.is_empty(), "no .col fixtures found");

    println!("\nRunning {} .col test files:", files.len());
    let failed = run_all(&files, run_col_test);
    assert!(failed == 0, "{} .col tests failed", failed);
}

#[test]
fn test_all_err_fixtures() {
    let files = get_files_in_subdir("err", "col");
    assert!(!files.is_empty(), "no failing fixtures found");

    println!("\nRunning {} failing test files:", files.len());
    let failed = run_all(&files, run_err_test);
    assert!(failed == 0, "{} failing-fixture tests failed", failed);
}

#[test]
fn test_every_fixture_has_expected_output() {
    for file in get_files_in_subdir("col", "col") {
        assert!(
            read_expected_json(&file).is_some(),
            "{} has no expected JSON",
            file_name(&file)
        );
    }
    for file in get_files_in_subdir("err", "col") {
        assert!(
            read_expected_error(&file).is_some(),
            "{} has no .error file",
            file_name(&file)
        );
    }
}
