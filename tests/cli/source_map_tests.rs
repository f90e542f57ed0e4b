use super::common::TestContext;
use code_insight::sourcemap::SourceMapV3;
use predicates::prelude::*;
use std::fs;

const MAP: &str = r#"{"version":3,"file":"app.js","sourceRoot":"../src","sources":["app.ts"],"names":[],"mappings":"AAAA,KAAK,OAAO;;AAEE"}"#;

const INSERT_AT_5: &str = r#"[{"range":{"start":{"line_idx":0,"char_idx":5},"end_exclusive":{"line_idx":0,"char_idx":5}},"text":"abc"}]"#;

#[test]
fn test_apply_edit_writes_updated_map() {
    let ctx = TestContext::default();
    let map = ctx.create_file("dist/app.js.map", MAP).unwrap();
    let edit = ctx.create_file("edit.json", INSERT_AT_5).unwrap();
    let output = ctx.temp_path().join("dist/app.instrumented.js.map");

    ctx.cmd()
        .arg("apply-edit")
        .arg("-m")
        .arg(&map)
        .arg("-e")
        .arg(&edit)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 1 edits"));

    let updated = SourceMapV3::from_json(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(updated.mappings, "AAAA,K,GAAK,OAAO;;AAEE");
    assert_eq!(updated.file.as_deref(), Some("app.js"));
    assert_eq!(updated.source_root.as_deref(), Some("../src"));
}

#[test]
fn test_apply_edit_to_stdout_and_generated_file() {
    let ctx = TestContext::default();
    let map = ctx.create_file("app.js.map", MAP).unwrap();
    let edit = ctx.create_file("edit.json", INSERT_AT_5).unwrap();
    let generated = ctx
        .create_file("app.js", "const value = 1;\n\n  return value;\n")
        .unwrap();
    let generated_output = ctx.temp_path().join("app.out.js");

    let output = ctx
        .cmd()
        .arg("apply-edit")
        .arg("--source-map")
        .arg(&map)
        .arg("--edit")
        .arg(&edit)
        .arg("--generated")
        .arg(&generated)
        .arg("--generated-output")
        .arg(&generated_output)
        .output()
        .unwrap();
    assert!(output.status.success());

    let updated = SourceMapV3::from_json(&String::from_utf8(output.stdout).unwrap()).unwrap();
    assert_eq!(updated.mappings, "AAAA,K,GAAK,OAAO;;AAEE");
    assert_eq!(
        fs::read_to_string(&generated_output).unwrap(),
        "constabc value = 1;\n\n  return value;\n"
    );
}

#[test]
fn test_apply_edit_generated_requires_output() {
    let ctx = TestContext::default();
    ctx.cmd()
        .args(["apply-edit", "-m", "a.map", "-e", "e.json", "--generated", "a.js"])
        .assert()
        .failure();
}

#[test]
fn test_apply_edit_rejects_overlapping_edits() {
    let ctx = TestContext::default();
    let map = ctx.create_file("app.js.map", MAP).unwrap();
    let edit = ctx
        .create_file(
            "edit.json",
            r#"[
                {"range":{"start":{"line_idx":0,"char_idx":0},"end_exclusive":{"line_idx":0,"char_idx":4}},"text":""},
                {"range":{"start":{"line_idx":0,"char_idx":2},"end_exclusive":{"line_idx":0,"char_idx":6}},"text":""}
            ]"#,
        )
        .unwrap();

    ctx.cmd()
        .arg("apply-edit")
        .arg("-m")
        .arg(&map)
        .arg("-e")
        .arg(&edit)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid edit file"));
}

#[test]
fn test_lookup_text() {
    let ctx = TestContext::default();
    let map = ctx.create_file("dist/app.js.map", MAP).unwrap();

    ctx.cmd()
        .arg("lookup")
        .arg(&map)
        .args(["-l", "0", "-c", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1:8 -> app.ts:1:6"));

    ctx.cmd()
        .arg("lookup")
        .arg(&map)
        .args(["-l", "1", "-c", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2:1 -> unmapped"));
}

#[test]
fn test_lookup_json_resolves_full_source_path() {
    let ctx = TestContext::default();
    let map = ctx.create_file("dist/app.js.map", MAP).unwrap();

    let output = ctx
        .cmd()
        .arg("lookup")
        .arg(&map)
        .args(["--line", "2", "--column", "4", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let expected = ctx.temp_path().join("dist").join("../src").join("app.ts");
    assert_eq!(json["result"]["source"], expected.to_string_lossy().as_ref());
    assert_eq!(json["result"]["source_line"], 2);
    assert_eq!(json["result"]["source_column"], 14);
}

#[test]
fn test_lookup_invalid_map_fails() {
    let ctx = TestContext::default();
    let map = ctx
        .create_file("bad.map", r#"{"version":3,"sources":[],"names":[],"mappings":"!!"}"#)
        .unwrap();

    ctx.cmd()
        .arg("lookup")
        .arg(&map)
        .args(["-l", "0", "-c", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid VLQ"));
}
