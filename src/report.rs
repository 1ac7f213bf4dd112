use anyhow::Result;
use tracing::debug;

use crate::config::Config;
use crate::error::Error;
use crate::options::Options;
use crate::output;
use crate::stats::{StatsPlugin, TeamStats, UserStats};
use crate::user::User;

/// Gather and render reports for every resolved user.
///
/// Users are processed strictly in input order and plugins in registry
/// order, so output is reproducible. The gathered sessions are returned
/// whatever the display mode, so callers can inspect results that were
/// never printed.
pub fn run(
  opts: &Options,
  config: &Config,
  registry: &[Box<dyn StatsPlugin>],
) -> Result<(Vec<UserStats>, TeamStats)> {
  let users: Vec<User> = opts
    .emails
    .iter()
    .map(|email| User::new(email))
    .collect::<Result<_, _>>()?;
  if users.is_empty() {
    return Err(Error::Config("No user email provided".into()).into());
  }

  let mut team = TeamStats::new();
  // The merge-mode banner comes before any per-user detail.
  if opts.merge {
    output::header("Total Report", opts);
    output::item(&format!("Users: {}", users.len()), 0, opts);
  }

  let mut gathered: Vec<UserStats> = Vec::new();
  for user in users {
    if opts.merge {
      output::item(&user.to_string(), 1, opts);
    } else {
      output::header(&user.to_string(), opts);
    }
    debug!("gathering stats for {}", user);
    let mut stats = UserStats::new(user);
    stats.check(registry, opts, config)?;
    if !opts.merge {
      stats.show(opts);
    }
    team.merge(&stats);
    gathered.push(stats);
  }

  if opts.merge || opts.total {
    if opts.total {
      output::header("Total Report", opts);
    }
    team.show(opts);
  }

  Ok((gathered, team))
}
