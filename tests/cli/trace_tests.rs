use super::common::{sample_trace, TestContext};
use predicates::prelude::*;

fn parse_json(stdout: &[u8]) -> serde_json::Value {
    serde_json::from_slice(stdout).expect("stdout should be JSON")
}

#[test]
fn test_decode_lists_instructions() {
    let ctx = TestContext::default();
    let trace = ctx.create_file("trace.bin", sample_trace()).unwrap();

    ctx.cmd()
        .arg("decode")
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("8 instructions"))
        .stdout(predicate::str::contains("0: SetModuleId(0)"))
        .stdout(predicate::str::contains("SetModuleInfo ("))
        .stdout(predicate::str::contains("4: CallFunction(1)"))
        .stdout(predicate::str::contains("7: ReturnFunction"));
}

#[test]
fn test_decode_json() {
    let ctx = TestContext::default();
    let trace = ctx.create_file("trace.bin", sample_trace()).unwrap();

    let output = ctx.cmd().arg("decode").arg(&trace).arg("--json").output().unwrap();
    assert!(output.status.success());

    let json = parse_json(&output.stdout);
    assert_eq!(json["status"], "ok");
    let instructions = json["result"].as_array().unwrap();
    assert_eq!(instructions.len(), 8);
    assert_eq!(instructions[0]["type"], "SetModuleId");
    assert_eq!(instructions[0]["module_id"], 0);
    assert_eq!(instructions[4]["type"], "CallFunction");
    assert_eq!(instructions[4]["function_id"], 1);
    assert_eq!(instructions[7]["type"], "ReturnFunction");
}

#[test]
fn test_stack_innermost_frame_first() {
    let ctx = TestContext::default();
    let trace = ctx.create_file("trace.bin", sample_trace()).unwrap();

    ctx.cmd()
        .args(["stack", "-i", "5"])
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("Call Stack (2 frames)"))
        .stdout(predicate::str::contains("#0   dist/main.js:5:3 {1#0}"))
        .stdout(predicate::str::contains("#1   dist/main.js:2:3 {0#0}"));
}

#[test]
fn test_stack_after_all_returns_is_empty() {
    let ctx = TestContext::default();
    let trace = ctx.create_file("trace.bin", sample_trace()).unwrap();

    ctx.cmd()
        .args(["stack", "--index", "7"])
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("Call stack is empty"));
}

#[test]
fn test_stack_index_past_end_is_clamped() {
    let ctx = TestContext::default();
    let trace = ctx.create_file("trace.bin", sample_trace()).unwrap();

    let output = ctx
        .cmd()
        .args(["stack", "--index", "100", "--json"])
        .arg(&trace)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = parse_json(&output.stdout);
    assert_eq!(json["result"]["index"], 7);
    assert_eq!(json["result"]["instruction_count"], 8);
    assert_eq!(json["result"]["stack"]["frames"].as_array().unwrap().len(), 0);
}

#[test]
fn test_stack_with_context() {
    let ctx = TestContext::default();
    let trace = ctx.create_file("trace.bin", sample_trace()).unwrap();

    ctx.cmd()
        .args(["stack", "-i", "3", "-c", "1"])
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("Instruction Context"))
        .stdout(predicate::str::contains("►      3: ReachedBlock(0)"))
        .stdout(predicate::str::contains("Call Stack (1 frames)"));
}

#[test]
fn test_json_output_from_config() {
    let ctx = TestContext::default();
    let trace = ctx.create_file("trace.bin", sample_trace()).unwrap();
    ctx.create_file(".code-insight.toml", "[output]\nformat = \"json\"\n")
        .unwrap();

    let output = ctx.cmd().args(["stack", "-i", "3"]).arg(&trace).output().unwrap();
    assert!(output.status.success());
    let json = parse_json(&output.stdout);
    assert_eq!(json["result"]["stack"]["frames"].as_array().unwrap().len(), 1);
}

#[test]
fn test_modules_summary() {
    let ctx = TestContext::default();
    let trace = ctx.create_file("trace.bin", sample_trace()).unwrap();

    ctx.cmd()
        .arg("modules")
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Module 0: 2 functions, 2 blocks, sources: dist/main.js",
        ));

    let output = ctx.cmd().arg("modules").arg(&trace).arg("--json").output().unwrap();
    let json = parse_json(&output.stdout);
    assert_eq!(json["result"][0]["module_id"], 0);
    assert_eq!(json["result"][0]["source_paths"][0], "dist/main.js");
}

#[test]
fn test_truncated_trace_fails() {
    let ctx = TestContext::default();
    // CallFunction with a 3-byte operand escape but no operand bytes
    let trace = ctx.create_file("broken.bin", [0b01_111111u8]).unwrap();

    ctx.cmd()
        .arg("decode")
        .arg(&trace)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed trace"));
}

#[test]
fn test_unbalanced_return_fails() {
    let ctx = TestContext::default();
    let trace = ctx.create_file("broken.bin", [0b11_000000u8]).unwrap();

    ctx.cmd()
        .args(["stack", "-i", "0"])
        .arg(&trace)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no matching call"));
}

#[test]
fn test_missing_trace_file_fails() {
    let ctx = TestContext::default();

    ctx.cmd()
        .args(["decode", "does-not-exist.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read trace"));
}
