mod git;
mod github;

pub use git::GitStats;
pub use github::GithubStats;

use crate::stats::StatsPlugin;

/// Every known stats provider, in the order their options appear in the
/// schema and their reports appear in the output.
pub fn registry() -> Vec<Box<dyn StatsPlugin>> {
  vec![Box::new(GitStats), Box::new(GithubStats)]
}
