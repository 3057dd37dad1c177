use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures/boards")
        .join(name)
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pcbsolid"))
        .args(args)
        .env_remove("KISYS3DMOD")
        .env_remove("RUST_LOG")
        .output()
        .expect("run pcbsolid")
}

#[test]
fn exit_code_usage_is_1_for_missing_args() {
    let out = run(&[]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn exit_code_usage_is_1_for_unknown_format() {
    let board = fixture("rect.json");
    let out = run(&[board.to_str().unwrap(), "--format", "dxf"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn exit_code_input_is_2_for_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope.json");
    let out = run(&[missing.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Could not read board"));
}

#[test]
fn exit_code_input_is_2_for_invalid_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{ \"layers\": [").expect("write bad json");
    let out = run(&[bad.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn exit_code_input_is_2_for_invalid_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config.yaml");
    std::fs::write(&config, "offset_algorithm: Bogus\n").expect("write config");
    let board = fixture("rect.json");
    let out = run(&[board.to_str().unwrap(), "--config", config.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn exit_code_input_is_2_for_unknown_layer() {
    let board = fixture("three_layer.json");
    let out = run(&[board.to_str().unwrap(), "--what", "tracks", "--layer", "In7.Cu"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn exit_code_input_is_2_for_bad_kind() {
    let board = fixture("rect.json");
    let out = run(&[board.to_str().unwrap(), "--what", "board", "--kind", "mesh"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid shape kind: mesh"));
}

#[test]
fn exit_code_usage_is_1_for_jscad_of_faces() {
    let board = fixture("rect.json");
    let out = run(&[
        board.to_str().unwrap(),
        "--what",
        "board",
        "--kind",
        "face",
        "--format",
        "jscad",
    ]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn exit_code_processing_is_3_for_empty_export() {
    let board = fixture("rect.json");
    let out = run(&[board.to_str().unwrap(), "--what", "tracks", "--format", "svg"]);
    assert_eq!(out.status.code(), Some(3));
}
