//! End-to-end CLI tests for the datamirror binary.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

mod support;
use support::write_file;

/// Binary isolated from the caller's config file and `DATA_DIR`.
fn datamirror(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("datamirror").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("NO_COLOR", "1")
        .env_remove("DATA_DIR")
        .env_remove("RUST_LOG");
    cmd
}

const SCRIPT_BODY: &str = "\
#!/usr/bin/env bash
wget -c \"https://h/p/a/x\" -O \"$DATA_DIR/a/x\"
wget -c \"https://h/p/a/y\" -O \"${DATA_DIR}/a/y\"
";

#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().unwrap();
    datamirror(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().unwrap();
    datamirror(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("datamirror"));
}

#[test]
fn test_binary_requires_subcommand() {
    let home = TempDir::new().unwrap();
    datamirror(home.path()).assert().failure();
}

#[test]
fn test_check_missing_script_exits_2() {
    let home = TempDir::new().unwrap();
    datamirror(home.path())
        .args(["check", "-s"])
        .arg(home.path().join("nope.sh"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("script not found"));
}

#[test]
fn test_check_without_data_root_exits_3() {
    let home = TempDir::new().unwrap();
    let script = write_file(home.path(), "get.sh", SCRIPT_BODY.as_bytes());
    datamirror(home.path())
        .args(["check", "-s"])
        .arg(&script)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("DATA_DIR"));
}

#[test]
fn test_check_without_targets_exits_4() {
    let home = TempDir::new().unwrap();
    let script = write_file(home.path(), "get.sh", b"DATA_DIR=/tmp/x\necho nothing\n");
    datamirror(home.path())
        .args(["check", "-s"])
        .arg(&script)
        .assert()
        .code(4);
}

#[test]
fn test_check_filter_removing_everything_exits_5() {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    let script = write_file(home.path(), "get.sh", SCRIPT_BODY.as_bytes());
    datamirror(home.path())
        .args(["check", "-i", "zzz/", "-d"])
        .arg(data.path())
        .arg("-s")
        .arg(&script)
        .assert()
        .code(5);
}

#[test]
fn test_check_missing_targets_exits_6() {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    write_file(data.path(), "a/x", b"1");
    let script = write_file(home.path(), "get.sh", SCRIPT_BODY.as_bytes());
    datamirror(home.path())
        .env("DATA_DIR", data.path())
        .args(["check", "-s"])
        .arg(&script)
        .assert()
        .code(6)
        .stdout(predicate::str::contains("Existing: 1  |  Missing: 1"))
        .stdout(predicate::str::contains("a/y -> "));
}

#[test]
fn test_check_complete_json_exits_0() {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    write_file(data.path(), "a/x", b"1");
    write_file(data.path(), "a/y", b"2");
    let script = write_file(home.path(), "get.sh", SCRIPT_BODY.as_bytes());

    let output = datamirror(home.path())
        .args(["check", "--json", "-d"])
        .arg(data.path())
        .arg("-s")
        .arg(&script)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total"], 2);
    assert_eq!(json["missing_count"], 0);
    assert_eq!(json["last_existing"]["relative"], "a/y");
}

#[test]
fn test_script_writes_executable_wget_script() {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    let manifest = write_file(
        home.path(),
        "m.yaml",
        b"data:\n  paths:\n    - https://h/p/a/x\n    - https://h/p/a/y\n",
    );
    let out = home.path().join("get.sh");

    datamirror(home.path())
        .args(["script", "-t", "/p/", "-m"])
        .arg(&manifest)
        .arg("-d")
        .arg(data.path())
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote wget script with 2 items"));

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains(r#""https://h/p/a/x" -O "$DATA_DIR/a/x""#));
    assert!(text.contains(r#""https://h/p/a/y" -O "$DATA_DIR/a/y""#));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&out).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}

#[test]
fn test_script_then_check_reports_all_missing() {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    let manifest = write_file(home.path(), "m.yaml", b"data:\n  paths:\n    - https://h/p/a/x\n");
    let out = home.path().join("get.sh");

    datamirror(home.path())
        .args(["script", "-t", "/p/", "-m"])
        .arg(&manifest)
        .arg("-d")
        .arg(data.path())
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    // Data root comes from the DATA_DIR= line of the generated script.
    datamirror(home.path())
        .args(["check", "-s"])
        .arg(&out)
        .assert()
        .code(6)
        .stdout(predicate::str::contains("No existing targets found."));
}

#[test]
fn test_script_without_data_dir_exits_3() {
    let home = TempDir::new().unwrap();
    let manifest = write_file(home.path(), "m.yaml", b"data:\n  paths:\n    - https://h/x\n");
    datamirror(home.path())
        .args(["script", "-m"])
        .arg(&manifest)
        .assert()
        .code(3);
}

#[test]
fn test_script_uses_data_dir_from_config_file() {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    write_file(
        home.path(),
        "datamirror/config.toml",
        format!("data_dir = {:?}\ntrim_prefix = \"/p/\"\n", data.path().display().to_string())
            .as_bytes(),
    );
    let manifest = write_file(home.path(), "m.yaml", b"data:\n  paths:\n    - https://h/p/a/x\n");
    let out = home.path().join("get.sh");

    datamirror(home.path())
        .args(["script", "-m"])
        .arg(&manifest)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains(r#"-O "$DATA_DIR/a/x""#));
}

#[test]
fn test_invalid_config_file_fails() {
    let home = TempDir::new().unwrap();
    write_file(home.path(), "datamirror/config.toml", b"unknown_key = 1\n");
    datamirror(home.path())
        .args(["check", "-s", "x.sh"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config"));
}

#[test]
fn test_script_missing_manifest_exits_2() {
    let home = TempDir::new().unwrap();
    datamirror(home.path())
        .args(["script", "-d", "/tmp", "-m"])
        .arg(home.path().join("missing.yaml"))
        .assert()
        .code(2);
}

#[test]
fn test_script_manifest_without_urls_exits_4() {
    let home = TempDir::new().unwrap();
    let manifest = write_file(home.path(), "m.yaml", b"name: nothing here\n");
    datamirror(home.path())
        .args(["script", "-d", "/tmp", "-m"])
        .arg(&manifest)
        .assert()
        .code(4);
}

#[test]
fn test_fetch_filter_removing_everything_exits_5() {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    let manifest = write_file(home.path(), "m.yaml", b"data:\n  paths:\n    - https://h/p/a/x\n");
    datamirror(home.path())
        .args(["fetch", "-t", "/p/", "-i", "b/", "-m"])
        .arg(&manifest)
        .arg("-d")
        .arg(data.path())
        .assert()
        .code(5);
}

#[test]
fn test_fetch_unreachable_host_exits_6() {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    let manifest = write_file(
        home.path(),
        "m.yaml",
        b"data:\n  paths:\n    - http://127.0.0.1:9/p/a/x\n",
    );
    datamirror(home.path())
        .args(["-q", "fetch", "-t", "/p/", "-a", "1", "-m"])
        .arg(&manifest)
        .arg("-d")
        .arg(data.path())
        .assert()
        .code(6)
        .stdout(predicate::str::contains("a/x"));
}
