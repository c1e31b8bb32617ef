//! Profile persistence driven through the binary (non-interactive paths only)
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

// Serializes tests that point the binary at a temporary config dir.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn run_droidmon(config_home: &Path, args: &[&str]) -> (bool, String) {
    let exe = env!("CARGO_BIN_EXE_droidmon");
    let output = Command::new(exe)
        .env("XDG_CONFIG_HOME", config_home)
        .args(args)
        .output()
        .expect("run droidmon");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    (output.status.success(), text)
}

fn profiles_path(config_home: &Path) -> PathBuf {
    config_home.join("droidmon").join("profiles.json")
}

#[test]
fn test_profile_created_on_first_use() {
    let _guard = ENV_LOCK.lock().unwrap();
    let td = tempfile::tempdir().unwrap();
    let (ok, out) = run_droidmon(
        td.path(),
        &["--profile", "lab", "-w", "10.0.0.7", "http://10.0.0.2:5000", "--dry-run"],
    );
    assert!(ok, "{out}");

    let data = fs::read_to_string(profiles_path(td.path())).expect("profiles.json created");
    let v: serde_json::Value = serde_json::from_str(&data).unwrap();
    assert_eq!(v["profiles"]["lab"]["url"], "http://10.0.0.2:5000");
    assert_eq!(v["profiles"]["lab"]["wireless_ip"], "10.0.0.7");
}

#[test]
fn test_profile_overwrite_only_with_save() {
    let _guard = ENV_LOCK.lock().unwrap();
    let td = tempfile::tempdir().unwrap();
    run_droidmon(td.path(), &["--profile", "lab", "http://a:5000", "--dry-run"]);

    // changed url without --save: prompt gets EOF on stdin, profile untouched
    let exe = env!("CARGO_BIN_EXE_droidmon");
    let status = Command::new(exe)
        .env("XDG_CONFIG_HOME", td.path())
        .args(["--profile", "lab", "http://b:5000", "--dry-run"])
        .stdin(std::process::Stdio::null())
        .output()
        .expect("run droidmon");
    assert!(status.status.success());
    let data = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert!(data.contains("http://a:5000"), "{data}");

    run_droidmon(td.path(), &["--profile", "lab", "http://b:5000", "--save", "--dry-run"]);
    let data = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert!(data.contains("http://b:5000"), "{data}");
}

#[test]
fn test_saved_profile_is_loaded_with_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    let td = tempfile::tempdir().unwrap();
    run_droidmon(
        td.path(),
        &["--profile", "lab", "-i", "2", "http://a:5000", "--dry-run"],
    );

    let (ok, out) = run_droidmon(td.path(), &["--profile", "lab", "--dry-run"]);
    assert!(ok, "{out}");
    assert!(out.contains("http://a:5000"), "{out}");
    assert!(out.contains("interval: 2.0"), "{out}");

    let (_, out) = run_droidmon(td.path(), &["--profile", "lab", "-i", "0.5", "--dry-run"]);
    assert!(out.contains("interval: 0.5"), "{out}");
}
