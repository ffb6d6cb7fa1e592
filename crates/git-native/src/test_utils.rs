use std::path::Path;
use std::process::Command;

fn git(dir: &Path, args: &[&str]) -> std::process::Output {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap_or_else(|e| panic!("git {args:?} failed to start: {e}"));
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

/// Initialize a minimal git repository for testing.
///
/// Creates a repo on `main` with an initial commit so that HEAD exists.
pub fn init_test_repo(dir: &Path) {
    git(dir, &["init", "--initial-branch=main"]);
    git(dir, &["config", "user.email", "test@test.com"]);
    git(dir, &["config", "user.name", "Test"]);
    git(dir, &["config", "commit.gpgsign", "false"]);

    std::fs::write(dir.join("README"), "test repo").unwrap();
    git(dir, &["add", "."]);
    git(dir, &["commit", "-m", "init"]);
}

pub fn add_remote(dir: &Path, name: &str, url: &str) {
    git(dir, &["remote", "add", name, url]);
}

pub fn detach_head(dir: &Path) {
    git(dir, &["checkout", "--detach"]);
}

pub fn checkout_new_branch(dir: &Path, branch: &str) {
    git(dir, &["checkout", "-b", branch]);
}

pub fn commit_file(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).unwrap();
    git(dir, &["add", name]);
    git(dir, &["commit", "-m", name]);
}

/// Full hex id of HEAD.
pub fn head_commit(dir: &Path) -> String {
    let output = git(dir, &["rev-parse", "HEAD"]);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
