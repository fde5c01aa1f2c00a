use std::process::Command;

fn run_smsvc(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_smsvc"))
        .args(args)
        .output()
        .expect("smsvc command should run")
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn help_lists_both_subcommands() {
    let output = run_smsvc(&["--help"]);
    assert!(output.status.success(), "--help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("convert"), "help should mention convert");
    assert!(stdout.contains("inspect"), "help should mention inspect");
}

#[test]
fn version_is_reported() {
    let output = run_smsvc(&["--version"]);
    assert!(output.status.success(), "--version should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn bitrate_below_the_range_is_rejected_at_parse_time() {
    let output = run_smsvc(&["convert", "in", "--output-dir", "out", "--bitrate", "999"]);
    assert!(!output.status.success(), "bitrate 999 should be rejected");
    let stderr = stderr_of(&output);
    assert!(
        stderr.contains("1000") && stderr.contains("9000"),
        "rejection should name the valid range, got: {stderr}"
    );
}

#[test]
fn bitrate_above_the_range_is_rejected_at_parse_time() {
    let output = run_smsvc(&["convert", "in", "--output-dir", "out", "--bitrate", "9001"]);
    assert!(!output.status.success(), "bitrate 9001 should be rejected");
}

#[test]
fn in_range_bitrate_reaches_the_scan_stage() {
    let output = run_smsvc(&[
        "convert",
        "/no/such/source",
        "--output-dir",
        "out",
        "--bitrate",
        "1000",
    ]);
    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(
        stderr.contains("does not exist"),
        "failure should come from the missing path, got: {stderr}"
    );
}

#[test]
fn unknown_subtitle_mode_is_rejected_with_an_explanation() {
    let output = run_smsvc(&[
        "convert",
        "in",
        "--output-dir",
        "out",
        "--subtitles",
        "bogus",
    ]);
    assert!(!output.status.success(), "subtitle mode should be rejected");
    let stderr = stderr_of(&output);
    assert!(
        stderr.contains("invalid subtitle mode"),
        "rejection should explain the mode, got: {stderr}"
    );
}

#[test]
fn numeric_subtitle_mode_parses_as_a_track_index() {
    let output = run_smsvc(&[
        "convert",
        "/no/such/source",
        "--output-dir",
        "out",
        "--subtitles",
        "3",
    ]);
    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(
        stderr.contains("does not exist"),
        "track index should parse and fail later at the path, got: {stderr}"
    );
}

#[test]
fn convert_requires_an_output_dir() {
    let output = run_smsvc(&["convert", "in"]);
    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("--output-dir"));
}

#[test]
fn inspect_of_a_missing_path_fails() {
    let output = run_smsvc(&["inspect", "/no/such/source"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("does not exist"));
}
