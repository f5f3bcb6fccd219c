#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::{Command, Output};

const GOOD_FRAME: &str = "0f010203fe01020304fe0e030107fe";
const BAD_FRAME: &str = "0f010203fe01020304fe0e030108fe";

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "serframe-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn serframe(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_serframe"))
        .args(["--log-level", "off", "--format", "json"])
        .args(args)
        .env_remove("SERFRAME_CATALOG")
        .env_remove("SERFRAME_IDLE_TIMEOUT")
        .env_remove("SERFRAME_POLL_INTERVAL")
        .output()
        .expect("serframe should run")
}

fn capture(frames: &[&str]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for frame in frames {
        bytes.extend_from_slice(&[0xFF; 5]);
        bytes.extend(hex::decode(frame).expect("fixture hex"));
    }
    bytes
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line should be JSON"))
        .collect()
}

#[test]
fn decode_capture_prints_frames_and_summary() {
    let dir = unique_temp_dir("decode");
    let path = dir.join("line.bin");
    std::fs::write(&path, capture(&[GOOD_FRAME, BAD_FRAME, GOOD_FRAME])).expect("write capture");

    let output = serframe(&["decode", path.to_str().expect("utf-8 path"), "--summary"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 3);
    for frame in &lines[..2] {
        assert_eq!(frame["id"], 15);
        assert_eq!(frame["len"], 15);
        assert_eq!(frame["wire_size"], 20);
        assert_eq!(frame["data"], "0f01020301020304");
        assert_eq!(frame["checksum"], "0e030107");
    }

    let summary = &lines[2];
    assert_eq!(summary["stop"], "exhausted");
    assert_eq!(summary["dispatched"], 2);
    assert_eq!(summary["bad_checksum"], 1);
    assert_eq!(summary["bytes_consumed"], 60);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn decode_count_stops_early() {
    let dir = unique_temp_dir("count");
    let path = dir.join("line.bin");
    std::fs::write(&path, capture(&[GOOD_FRAME, GOOD_FRAME, GOOD_FRAME])).expect("write capture");

    let output = serframe(&["decode", path.to_str().expect("utf-8 path"), "--count", "1"]);
    assert!(output.status.success());
    assert_eq!(json_lines(&output).len(), 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn decode_with_catalog_rejects_unknown_ids() {
    let dir = unique_temp_dir("catalog");
    let path = dir.join("line.bin");
    let catalog = dir.join("catalog.json");
    std::fs::write(&path, capture(&[GOOD_FRAME])).expect("write capture");
    std::fs::write(&catalog, r#"{"0x0A": 10}"#).expect("write catalog");

    let output = serframe(&[
        "decode",
        path.to_str().expect("utf-8 path"),
        "--catalog",
        catalog.to_str().expect("utf-8 path"),
        "--summary",
    ]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["dispatched"], 0);
    assert!(lines[0]["unknown"].as_u64().unwrap_or(0) >= 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn check_exit_codes() {
    let ok = serframe(&["check", GOOD_FRAME]);
    assert_eq!(ok.status.code(), Some(0));
    assert_eq!(json_lines(&ok)[0]["verdict"], "ok");

    let bad = serframe(&["check", BAD_FRAME]);
    assert_eq!(bad.status.code(), Some(60));
    assert_eq!(json_lines(&bad)[0]["verdict"], "bad-checksum");
}

#[test]
fn encode_matches_wire_format() {
    let output = serframe(&["encode", "0f010203 01020304"]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines[0]["wire"], format!("ffffffffff{GOOD_FRAME}"));
    assert_eq!(lines[0]["len"], 15);
}

#[test]
fn encode_rejects_catalog_mismatch() {
    let output = serframe(&["encode", "10010203 01020304"]);
    assert_eq!(output.status.code(), Some(64));

    let forced = serframe(&["encode", "--force", "10010203 01020304"]);
    assert!(forced.status.success());
}
