use std::path::{Path, PathBuf};
use std::process::Command;

#[allow(dead_code)]
pub fn run(repo: &Path, args: &[&str]) {
  let status = Command::new("git").args(args).current_dir(repo).status().unwrap();
  assert!(status.success(), "git {:?} failed", args);
}

#[allow(dead_code)]
fn commit(repo: &Path, message: &str, author: &str, date: &str) {
  let env = [
    ("GIT_AUTHOR_NAME", "Fixture Bot"),
    ("GIT_AUTHOR_EMAIL", author),
    ("GIT_COMMITTER_NAME", "Fixture Bot"),
    ("GIT_COMMITTER_EMAIL", author),
    ("GIT_AUTHOR_DATE", date),
    ("GIT_COMMITTER_DATE", date),
  ];
  let status = Command::new("git")
    .args(["commit", "-q", "--allow-empty", "-m", message])
    .current_dir(repo)
    .envs(env.iter().cloned())
    .status()
    .unwrap();
  assert!(status.success());
}

/// A repo with two March 2024 commits by alice and one by bob.
#[allow(dead_code)]
pub fn fixture_repo() -> tempfile::TempDir {
  let dir = tempfile::TempDir::new().unwrap();

  run(dir.path(), &["init", "-q", "-b", "main"]);
  run(dir.path(), &["config", "user.name", "Fixture Bot"]);
  run(dir.path(), &["config", "user.email", "fixture@example.com"]);
  run(dir.path(), &["config", "commit.gpgsign", "false"]);

  commit(dir.path(), "feat: add user model", "alice@example.com", "2024-03-10T12:00:00");
  commit(dir.path(), "fix: handle empty report", "alice@example.com", "2024-03-12T09:30:00");
  commit(dir.path(), "chore: bump deps", "bob@example.com", "2024-03-12T10:00:00");

  dir
}

/// Write a config file into `dir` and return its path.
#[allow(dead_code)]
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
  let path = dir.join("config.toml");
  std::fs::write(&path, contents).unwrap();
  path
}
