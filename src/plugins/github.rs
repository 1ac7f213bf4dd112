use std::process::Command;

use anyhow::Result;
use chrono::Duration;
use clap::Arg;
use tracing::debug;

use crate::config::Config;
use crate::error::Error;
use crate::options::Options;
use crate::stats::{StatDef, StatsPlugin, StatsReport};
use crate::user::User;

const SEARCH_URL: &str = "https://api.github.com/search/issues";

/// Issues and pull requests created by the user, via the GitHub search
/// API. Needs a login (`[github] login` or `--gh-login`; GitHub cannot
/// search by email) and a token (`GITHUB_TOKEN`, `GH_TOKEN`, or the
/// `gh` CLI).
pub struct GithubStats;

impl StatsPlugin for GithubStats {
  fn name(&self) -> &'static str {
    "github"
  }

  fn summary(&self) -> &'static str {
    "All GitHub stats"
  }

  fn stats(&self) -> Vec<StatDef> {
    vec![
      StatDef {
        flag: "gh-issues",
        title: "Issues created",
        help: "Issues created on GitHub",
      },
      StatDef {
        flag: "gh-prs",
        title: "Pull requests created",
        help: "Pull requests created on GitHub",
      },
    ]
  }

  fn params(&self) -> Vec<Arg> {
    vec![
      Arg::new("gh-login")
        .long("gh-login")
        .value_name("LOGIN")
        .help("GitHub login to search for (default: [github] login from the config file)"),
    ]
  }

  fn collect(&self, stat: &StatDef, _user: &User, opts: &Options, config: &Config) -> Result<StatsReport> {
    let login = opts
      .matches
      .get_one::<String>("gh-login")
      .cloned()
      .or_else(|| config.github.login.clone());
    let Some(login) = login else {
      if opts.all {
        debug!("no GitHub login configured, skipping");
        return Ok(StatsReport::new(stat));
      }
      return Err(
        Error::Config(
          "No GitHub login configured (set [github] login or pass --gh-login)".into(),
        )
        .into(),
      );
    };
    let Some(token) = github_token() else {
      if opts.all {
        debug!("no GitHub token found, skipping");
        return Ok(StatsReport::new(stat));
      }
      return Err(Error::Auth("No GitHub token found".into()).into());
    };

    let kind = if stat.flag == "gh-prs" { "pr" } else { "issue" };
    let query = format!(
      "type:{} author:{} created:{}..{}",
      kind,
      login,
      opts.since,
      opts.until - Duration::days(1)
    );
    let found = search(&query, &token)?;

    let mut report = StatsReport::new(stat);
    if let Some(items) = found.get("items").and_then(|items| items.as_array()) {
      for item in items {
        report.items.push(describe(item));
      }
    }
    if let Some(total) = found.get("total_count").and_then(|count| count.as_u64()) {
      if total as usize > report.items.len() {
        debug!("{} of {} results fetched for '{}'", report.items.len(), total, query);
      }
    }
    Ok(report)
  }
}

/// Token discovery: environment first, then the gh CLI.
fn github_token() -> Option<String> {
  for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
    if let Ok(token) = std::env::var(var) {
      if !token.trim().is_empty() {
        return Some(token);
      }
    }
  }
  if let Ok(out) = Command::new("gh").args(["auth", "token"]).output() {
    if out.status.success() {
      let token = String::from_utf8_lossy(&out.stdout).trim().to_string();
      if !token.is_empty() {
        return Some(token);
      }
    }
  }
  None
}

fn search(query: &str, token: &str) -> Result<serde_json::Value> {
  debug!("GitHub search: {}", query);
  let response = ureq::get(SEARCH_URL)
    .query("q", query)
    .query("per_page", "100")
    .set("Accept", "application/vnd.github+json")
    .set("User-Agent", "standup")
    .set("Authorization", &format!("Bearer {}", token))
    .call();
  match response {
    Ok(response) => response
      .into_json::<serde_json::Value>()
      .map_err(|err| Error::Report(format!("Invalid GitHub search response: {}", err)).into()),
    Err(ureq::Error::Status(401, _)) => {
      Err(Error::Auth("GitHub authentication failed (HTTP 401)".into()).into())
    }
    Err(ureq::Error::Status(code, _)) => {
      Err(Error::Report(format!("GitHub search failed (HTTP {})", code)).into())
    }
    Err(err) => Err(Error::Report(format!("GitHub search failed: {}", err)).into()),
  }
}

/// `owner/repo#number - title` for one search result.
fn describe(item: &serde_json::Value) -> String {
  let number = item.get("number").and_then(|n| n.as_i64()).unwrap_or(0);
  let title = item.get("title").and_then(|t| t.as_str()).unwrap_or("");
  let repo = item
    .get("repository_url")
    .and_then(|url| url.as_str())
    .and_then(|url| url.split("/repos/").nth(1))
    .unwrap_or("");
  format!("{}#{} - {}", repo, number, title)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn describe_formats_search_results() {
    let item = serde_json::json!({
      "number": 42,
      "title": "Fix the flux capacitor",
      "repository_url": "https://api.github.com/repos/acme/time-machine",
    });
    assert_eq!(describe(&item), "acme/time-machine#42 - Fix the flux capacitor");
  }

  #[test]
  fn describe_tolerates_missing_fields() {
    let item = serde_json::json!({ "title": "No number" });
    assert_eq!(describe(&item), "#0 - No number");
  }
}
