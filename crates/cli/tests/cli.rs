use std::path::Path;
use std::process::{Command, Output};

fn run_artsync(cwd: &Path, home: &Path, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_artsync"));
    cmd.args(args)
        .current_dir(cwd)
        .env("HOME", home)
        .env("RUST_LOG", "warn")
        .env_remove("MINIO_API_URI")
        .env_remove("MINIO_ACCESS_KEY")
        .env_remove("MINIO_SECRET_KEY")
        .env_remove("GITHUB_WORKSPACE")
        .env_remove("GITHUB_REPOSITORY")
        .env_remove("GITHUB_HEAD_REF")
        .env_remove("GITHUB_REF_NAME")
        .env_remove("GITHUB_OUTPUT");
    cmd.output().expect("run artsync")
}

fn credential_args() -> Vec<&'static str> {
    vec![
        "--minio_secret_key",
        "secret",
        "--minio_access_key",
        "access",
        "--minio_api_uri",
        "http://127.0.0.1:9",
    ]
}

#[test]
fn help_lists_transfer_flags() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let output = run_artsync(tmp.path(), tmp.path(), &["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--minio_secret_key",
        "--minio_access_key",
        "--minio_api_uri",
        "--src_path",
        "--tgt_path",
        "--bucket",
        "--mode",
        "--use_git",
    ] {
        assert!(stdout.contains(flag), "help should mention {flag}:\n{stdout}");
    }
}

#[test]
fn upload_with_missing_source_fails() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut args = credential_args();
    args.extend(["--src_path", "does/not/exist", "--mode", "upload", "--use_git", "false"]);

    let output = run_artsync(tmp.path(), tmp.path(), &args);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("source path does not exist"),
        "unexpected stderr:\n{stderr}"
    );
}

#[test]
fn missing_credentials_is_a_usage_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let output = run_artsync(
        tmp.path(),
        tmp.path(),
        &["--src_path", "dist", "--mode", "upload", "--minio_api_uri", "http://127.0.0.1:9"],
    );
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--minio_access_key"), "unexpected stderr:\n{stderr}");
}

#[test]
fn credentials_can_come_from_config_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        tmp.path().join("artsync.toml"),
        "[store]\nendpoint = \"http://127.0.0.1:9\"\naccess_key = \"a\"\nsecret_key = \"s\"\n",
    )
    .expect("write config");

    let output = run_artsync(
        tmp.path(),
        tmp.path(),
        &["--src_path", "missing", "--mode", "upload", "--use_git", "no"],
    );
    // Gets past credential validation and stops at the missing source.
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("source path does not exist"),
        "unexpected stderr:\n{stderr}"
    );
}

#[test]
fn rejects_unknown_mode_and_bad_bool() {
    let tmp = tempfile::tempdir().expect("tempdir");

    let mut args = credential_args();
    args.extend(["--src_path", "dist", "--mode", "sync"]);
    let output = run_artsync(tmp.path(), tmp.path(), &args);
    assert_eq!(output.status.code(), Some(2));

    let mut args = credential_args();
    args.extend(["--src_path", "dist", "--mode", "upload", "--use_git", "maybe"]);
    let output = run_artsync(tmp.path(), tmp.path(), &args);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("boolean value expected"), "unexpected stderr:\n{stderr}");
}

#[test]
fn broken_config_file_is_reported() {
    let tmp = tempfile::tempdir().expect("tempdir");
    std::fs::write(tmp.path().join("artsync.toml"), "[store\n").expect("write config");

    let mut args = credential_args();
    args.extend(["--src_path", "dist", "--mode", "upload"]);
    let output = run_artsync(tmp.path(), tmp.path(), &args);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to parse config"), "unexpected stderr:\n{stderr}");
}
