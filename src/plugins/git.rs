use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;

use anyhow::Result;
use tracing::debug;

use crate::config::{self, Config};
use crate::error::Error;
use crate::options::Options;
use crate::stats::{StatDef, StatsPlugin, StatsReport};
use crate::user::User;

/// Commits authored by the user in the repositories listed under
/// `[git] repos` in the config file.
pub struct GitStats;

impl StatsPlugin for GitStats {
  fn name(&self) -> &'static str {
    "git"
  }

  fn summary(&self) -> &'static str {
    "All git stats"
  }

  fn stats(&self) -> Vec<StatDef> {
    vec![StatDef {
      flag: "git-commits",
      title: "Commits",
      help: "Commits authored in configured git repositories",
    }]
  }

  fn collect(&self, stat: &StatDef, user: &User, opts: &Options, config: &Config) -> Result<StatsReport> {
    let repos = &config.git.repos;
    if repos.is_empty() {
      if opts.all {
        debug!("no git repositories configured, skipping");
        return Ok(StatsReport::new(stat));
      }
      return Err(
        Error::Config("No git repositories configured (set [git] repos in the config file)".into())
          .into(),
      );
    }

    let mut report = StatsReport::new(stat);
    let mut directories: BTreeSet<String> = BTreeSet::new();
    for repo in repos {
      let path = config::expand_tilde(repo);
      let prefix = repo_prefix(&path, repos.len());

      let mut args = log_args(user, opts);
      args.push("--format=%h - %s".into());
      let log = run_git(&path, &args)?;
      for line in log.lines().filter(|line| !line.trim().is_empty()) {
        report.items.push(format!("{}{}", prefix, line.trim()));
      }

      if opts.verbose {
        let mut args = log_args(user, opts);
        args.push("--format=".into());
        args.push("--name-only".into());
        let names = run_git(&path, &args)?;
        for dir in touched_directories(&names) {
          directories.insert(format!("{}{}", prefix, dir));
        }
      }
    }

    if opts.verbose && !directories.is_empty() {
      let dirs: Vec<String> = directories.into_iter().collect();
      report.items.push(format!("Modified directories: {}", dirs.join(", ")));
    }
    Ok(report)
  }
}

fn repo_prefix(path: &Path, repo_count: usize) -> String {
  if repo_count < 2 {
    return String::new();
  }
  match path.file_name() {
    Some(name) => format!("{}: ", name.to_string_lossy()),
    None => String::new(),
  }
}

fn log_args(user: &User, opts: &Options) -> Vec<String> {
  vec![
    "-c".into(),
    "log.showSignature=false".into(),
    "log".into(),
    "--all".into(),
    "--no-merges".into(),
    "--date-order".into(),
    "--reverse".into(),
    format!("--since={}T00:00:00", opts.since),
    format!("--until={}T00:00:00", opts.until),
    format!("--author={}", user.email),
  ]
}

fn run_git(repo: &Path, args: &[String]) -> Result<String, Error> {
  let out = Command::new("git")
    .args(args)
    .current_dir(repo)
    .output()
    .map_err(|err| Error::Report(format!("Spawning git in {}: {}", repo.display(), err)))?;
  if out.status.success() {
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
  } else {
    Err(Error::Report(format!(
      "git log failed in {}: {}",
      repo.display(),
      String::from_utf8_lossy(&out.stderr).trim()
    )))
  }
}

/// Top-level directories of the paths in `git log --name-only` output.
fn touched_directories(names: &str) -> BTreeSet<String> {
  names
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .filter_map(|line| line.split_once('/').map(|(dir, _)| dir.to_string()))
    .collect()
}
