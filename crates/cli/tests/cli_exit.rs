//! Exit behavior of the binary for runs that must stop before any job starts.

use std::process::{Command, Output};
use tempfile::TempDir;

fn tunemirror(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tunemirror"))
        .args(args)
        .current_dir(dir.path())
        .env_remove("TUNEMIRROR_CONFIG")
        .env("RUST_LOG", "info")
        .output()
        .expect("failed to run tunemirror")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_missing_codec_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("music")).unwrap();

    let output = tunemirror(&dir, &["-i", "music", "-o", "out"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("codec is required"));
}

#[test]
fn test_missing_input_directory_fails() {
    let dir = TempDir::new().unwrap();

    let output = tunemirror(&dir, &["-i", "nowhere", "-o", "out", "-c", "flac"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("does not exist"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_missing_engine_fails_before_any_job() {
    let dir = TempDir::new().unwrap();
    let music = dir.path().join("music");
    std::fs::create_dir(&music).unwrap();
    std::fs::write(music.join("a.flac"), b"fLaC").unwrap();

    let output = tunemirror(
        &dir,
        &["-i", "music", "-o", "out", "-c", "mp3", "--ffmpeg", "/nonexistent/ffmpeg"],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Encoding engine check failed"));
    assert!(stderr(&output).contains("install ffmpeg"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_config_file_supplies_directories() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("custom.toml"),
        "input_dir = \"missing-library\"\noutput_dir = \"out\"\ncodec = \"opus\"\n",
    )
    .unwrap();

    let output = tunemirror(&dir, &["--config", "custom.toml"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("missing-library"));
}

#[test]
fn test_explicit_config_must_exist() {
    let dir = TempDir::new().unwrap();

    let output = tunemirror(&dir, &["--config", "absent.toml"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("not found"));
}
