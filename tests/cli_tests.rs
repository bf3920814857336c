//! CLI integration tests for vp9mv
//!
//! Runs the vp9mv binary and verifies its output.

use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;
use vp9mv_lib::codec::vp9::{MotionVector, NmvContext, NmvContextCounts, DEFAULT_NMV_CONTEXT};

// ============================================================================
// Helper Functions
// ============================================================================

/// Run vp9mv and return its output
fn run_vp9mv(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vp9mv"))
        .args(args)
        .output()
        .expect("Failed to execute vp9mv")
}

fn stdout_string(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn write_temp_json<T: serde::Serialize>(value: &T) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".json").expect("Failed to create temp file");
    let json = serde_json::to_string(value).expect("Failed to serialize");
    file.write_all(json.as_bytes()).expect("Failed to write temp file");
    file
}

// ============================================================================
// Commands
// ============================================================================

#[test]
fn test_defaults_prints_default_context() {
    let output = run_vp9mv(&["defaults"]);
    assert!(output.status.success());

    let ctx: NmvContext = serde_json::from_str(&stdout_string(&output)).unwrap();
    assert_eq!(ctx, DEFAULT_NMV_CONTEXT);
}

#[test]
fn test_classify() {
    let output = run_vp9mv(&["classify", "0", "-11", "101"]);
    assert!(output.status.success());

    let stdout = stdout_string(&output);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("not coded"));
    assert!(lines[1].contains("sign - class  0"));
    assert!(lines[2].contains("class  3 int    4 fp 2 hp 0"));
}

#[test]
fn test_adapt_writes_output_file() {
    let mut counts = NmvContextCounts::default();
    for i in 1..50i16 {
        counts.accumulate(&MotionVector::new(i, 0));
    }
    let counts_file = write_temp_json(&counts);
    let out = NamedTempFile::with_suffix(".json").unwrap();

    let output = run_vp9mv(&[
        "adapt",
        "--counts",
        counts_file.path().to_str().unwrap(),
        "--allow-hp",
        "--output",
        out.path().to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let json = std::fs::read_to_string(out.path()).unwrap();
    let adapted: NmvContext = serde_json::from_str(&json).unwrap();
    assert_ne!(adapted, DEFAULT_NMV_CONTEXT);
    // Only vertical components were observed
    assert_eq!(adapted.comps[1], DEFAULT_NMV_CONTEXT.comps[1]);
}

#[test]
fn test_classify_flags_values_beyond_ceiling() {
    let output = run_vp9mv(&["classify", "16384", "-20000"]);
    assert!(output.status.success());

    let stdout = stdout_string(&output);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("class 10"));
    assert!(!lines[0].contains("ceiling"));
    assert!(lines[1].contains("class 10 ceiling"));
}

#[test]
fn test_adapt_rejects_zero_probability_prior() {
    let mut prior = DEFAULT_NMV_CONTEXT;
    prior.comps[0].bits[3] = 0;
    let prior_file = write_temp_json(&prior);
    let counts_file = write_temp_json(&NmvContextCounts::default());

    let output = run_vp9mv(&[
        "adapt",
        "--prior",
        prior_file.path().to_str().unwrap(),
        "--counts",
        counts_file.path().to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Probability of 0"));
}

#[test]
fn test_adapt_rejects_missing_counts() {
    let output = run_vp9mv(&["adapt", "--counts", "/nonexistent/counts.json"]);
    assert!(!output.status.success());
}

#[test]
fn test_global_mv_translation() {
    let output = run_vp9mv(&["global-mv", "--col", "64", "--row", "32", "--mv-row", "-12", "--mv-col", "40"]);
    assert!(output.status.success());
    assert!(stdout_string(&output).contains("row -12 col 40"));
}

#[test]
fn test_global_mv_rejects_bad_block_size() {
    let output = run_vp9mv(&["global-mv", "--width", "12", "--height", "8"]);
    assert!(!output.status.success());
}
