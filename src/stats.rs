use anyhow::Result;
use clap::{Arg, ArgMatches};

use crate::config::Config;
use crate::options::Options;
use crate::output;
use crate::user::User;

/// One selectable stat inside a plugin group: its enable flag plus the
/// title used when rendering its report.
#[derive(Clone, Copy, Debug)]
pub struct StatDef {
  pub flag: &'static str,
  pub title: &'static str,
  pub help: &'static str,
}

/// Capability interface every stats provider implements.
///
/// Providers contribute option descriptors to the shared schema, report
/// whether any of their flags were selected, and gather one report per
/// enabled stat. They never render themselves; reports are plain values
/// owned by the sessions.
pub trait StatsPlugin {
  /// Group enable flag, e.g. `git`.
  fn name(&self) -> &'static str;

  /// Help text for the group enable flag.
  fn summary(&self) -> &'static str;

  /// The stats this group offers, each with its own enable flag.
  fn stats(&self) -> Vec<StatDef>;

  /// Extra non-flag parameters beyond the enable flags.
  fn params(&self) -> Vec<Arg> {
    Vec::new()
  }

  /// True when the group flag or any of its stat flags was given.
  fn enabled(&self, matches: &ArgMatches) -> bool {
    matches.get_flag(self.name()) || self.stats().iter().any(|stat| matches.get_flag(stat.flag))
  }

  fn collect(&self, stat: &StatDef, user: &User, opts: &Options, config: &Config) -> Result<StatsReport>;
}

/// Gathered results for one stat: a flat list of display items.
#[derive(Clone, Debug)]
pub struct StatsReport {
  pub name: String,
  pub title: String,
  pub items: Vec<String>,
}

impl StatsReport {
  pub fn new(stat: &StatDef) -> StatsReport {
    StatsReport {
      name: stat.flag.to_string(),
      title: stat.title.to_string(),
      items: Vec::new(),
    }
  }

  pub fn merge(&mut self, other: &StatsReport) {
    self.items.extend(other.items.iter().cloned());
  }

  pub fn show(&self, opts: &Options) {
    // Empty reports stay silent so short periods do not drown in noise.
    if self.items.is_empty() {
      return;
    }
    output::item(&format!("{} [{}]", self.title, self.items.len()), 0, opts);
    if !opts.brief {
      for item in &self.items {
        output::item(item, 1, opts);
      }
    }
  }
}

/// Per-user accumulator: one report per enabled stat, gathered in
/// registry order and owned exclusively by the orchestrator.
#[derive(Debug)]
pub struct UserStats {
  pub user: User,
  pub reports: Vec<StatsReport>,
}

impl UserStats {
  pub fn new(user: User) -> UserStats {
    UserStats { user, reports: Vec::new() }
  }

  pub fn check(
    &mut self,
    registry: &[Box<dyn StatsPlugin>],
    opts: &Options,
    config: &Config,
  ) -> Result<()> {
    for plugin in registry {
      for stat in plugin.stats() {
        let enabled = opts.all
          || opts.selected.contains(plugin.name())
          || opts.selected.contains(stat.flag);
        if !enabled {
          continue;
        }
        let report = plugin.collect(&stat, &self.user, opts, config)?;
        self.reports.push(report);
      }
    }
    Ok(())
  }

  pub fn show(&self, opts: &Options) {
    for report in &self.reports {
      report.show(opts);
    }
  }
}

/// Team-wide aggregate built by value-merging every user session.
#[derive(Debug, Default)]
pub struct TeamStats {
  pub reports: Vec<StatsReport>,
}

impl TeamStats {
  pub fn new() -> TeamStats {
    TeamStats::default()
  }

  pub fn merge(&mut self, user_stats: &UserStats) {
    for report in &user_stats.reports {
      match self.reports.iter_mut().find(|mine| mine.name == report.name) {
        Some(mine) => mine.merge(report),
        None => self.reports.push(report.clone()),
      }
    }
  }

  pub fn show(&self, opts: &Options) {
    for report in &self.reports {
      report.show(opts);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn stat() -> StatDef {
    StatDef { flag: "demo", title: "Demo", help: "" }
  }

  fn report_with(items: &[&str]) -> StatsReport {
    let mut report = StatsReport::new(&stat());
    report.items = items.iter().map(|i| i.to_string()).collect();
    report
  }

  #[test]
  fn report_merge_concatenates_in_order() {
    let mut left = report_with(&["a", "b"]);
    left.merge(&report_with(&["b", "c"]));
    assert_eq!(left.items, vec!["a", "b", "b", "c"]);
  }

  #[test]
  fn team_merge_groups_by_report_name() {
    let user = User::new("alice@example.com").unwrap();
    let mut session = UserStats::new(user.clone());
    session.reports.push(report_with(&["a"]));

    let mut other = UserStats::new(user);
    other.reports.push(report_with(&["b"]));

    let mut team = TeamStats::new();
    team.merge(&session);
    team.merge(&other);

    assert_eq!(team.reports.len(), 1);
    assert_eq!(team.reports[0].items, vec!["a", "b"]);
  }
}
