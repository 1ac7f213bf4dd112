use std::collections::BTreeSet;

use anyhow::Result;
use chrono::{Duration, Local, NaiveDate};
use clap::{Arg, ArgAction, ArgMatches, Command};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::Config;
use crate::date;
use crate::error::Error;
use crate::stats::StatsPlugin;

/// Sentinel lower bound used when only `--until` was given.
const EPOCH: &str = "1993-01-01";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
  Text,
  Wiki,
}

/// Fully parsed, defaulted and validated options for one invocation.
/// Read-only after `parse`; `until` is an exclusive upper bound.
#[derive(Debug)]
pub struct Options {
  pub emails: Vec<String>,
  pub since: NaiveDate,
  pub until: NaiveDate,
  pub label: String,
  /// True iff no stat or group flag was selected: every plugin runs.
  pub all: bool,
  /// Enable flags that were explicitly given.
  pub selected: BTreeSet<String>,
  pub format: Format,
  pub width: usize,
  pub brief: bool,
  pub verbose: bool,
  pub total: bool,
  pub merge: bool,
  pub debug: bool,
  /// Raw matches, the slot store for plugin-contributed parameters.
  pub matches: ArgMatches,
}

/// Assemble the full option schema: built-in selection and display
/// options plus every descriptor contributed by the plugin registry.
/// Contributions are aggregated, not interpreted; a duplicate
/// destination key is a configuration bug and fails the build.
pub fn build_schema(registry: &[Box<dyn StatsPlugin>], default_width: usize) -> Result<Command, Error> {
  let mut seen: BTreeSet<String> = BTreeSet::new();
  let mut cmd = Command::new("standup")
    .version(env!("CARGO_PKG_VERSION"))
    .about("Gather team activity from git and GitHub into status reports")
    .override_usage("standup [last] [today|week|month|quarter|year] [options]")
    .arg(
      Arg::new("period")
        .value_name("PERIOD")
        .num_args(0..)
        .help("Report period: today, week, month, quarter or year, optionally preceded by 'last'"),
    )
    .next_help_heading("Selection")
    .arg(
      Arg::new("email")
        .long("email")
        .value_name("ADDR")
        .action(ArgAction::Append)
        .help("User email address(es)"),
    )
    .arg(
      Arg::new("since")
        .long("since")
        .value_name("DATE")
        .help("Start date in the YYYY-MM-DD format"),
    )
    .arg(
      Arg::new("until")
        .long("until")
        .value_name("DATE")
        .help("End date in the YYYY-MM-DD format"),
    )
    .next_help_heading("Display mode")
    .arg(
      Arg::new("format")
        .long("format")
        .value_name("STYLE")
        .value_parser(["text", "wiki"])
        .default_value("text")
        .help("Output style"),
    )
    .arg(
      Arg::new("width")
        .long("width")
        .value_name("N")
        .value_parser(clap::value_parser!(usize))
        .default_value(Box::leak(default_width.to_string().into_boxed_str()) as &str)
        .help("Maximum width of the report output"),
    )
    .arg(
      Arg::new("brief")
        .long("brief")
        .action(ArgAction::SetTrue)
        .help("Show brief summary only, do not list individual items"),
    )
    .arg(
      Arg::new("verbose")
        .long("verbose")
        .action(ArgAction::SetTrue)
        .help("Include more details (like modified git directories)"),
    )
    .arg(
      Arg::new("total")
        .long("total")
        .action(ArgAction::SetTrue)
        .help("Append total stats after listing individual users"),
    )
    .arg(
      Arg::new("merge")
        .long("merge")
        .action(ArgAction::SetTrue)
        .help("Merge stats of all users into a single report"),
    )
    .arg(
      Arg::new("debug")
        .long("debug")
        .action(ArgAction::SetTrue)
        .help("Turn on debugging output"),
    )
    .arg(
      Arg::new("now-override")
        .long("now-override")
        .value_name("DATE")
        .hide(true)
        .help("Override today's date (testing only)"),
    )
    .arg(
      Arg::new("gen-man")
        .long("gen-man")
        .action(ArgAction::SetTrue)
        .hide(true)
        .help("Emit a troff man page to stdout"),
    );

  for arg in cmd.get_arguments() {
    seen.insert(arg.get_id().to_string());
  }

  cmd = cmd.next_help_heading("Stats");
  for plugin in registry {
    let mut contributed: Vec<Arg> = vec![
      Arg::new(plugin.name())
        .long(plugin.name())
        .action(ArgAction::SetTrue)
        .help(plugin.summary()),
    ];
    for stat in plugin.stats() {
      contributed.push(
        Arg::new(stat.flag)
          .long(stat.flag)
          .action(ArgAction::SetTrue)
          .help(stat.help),
      );
    }
    contributed.extend(plugin.params());

    for arg in contributed {
      let id = arg.get_id().to_string();
      if !seen.insert(id.clone()) {
        return Err(Error::Config(format!(
          "Duplicate option '--{}' contributed by the '{}' plugin",
          id,
          plugin.name()
        )));
      }
      cmd = cmd.arg(arg);
    }
  }
  Ok(cmd)
}

/// Parse and validate command-line arguments into `Options`.
///
/// Fails without side effects: nothing is printed and no state changes
/// until the resolved range has passed validation, at which point the
/// one-line status banner goes to stdout.
pub fn parse(
  args: &[String],
  config: &Config,
  registry: &[Box<dyn StatsPlugin>],
) -> Result<Options> {
  let cmd = build_schema(registry, config.width())?;
  let argv = std::iter::once("standup".to_string()).chain(args.iter().cloned());
  let matches = match cmd.try_get_matches_from(argv) {
    Ok(matches) => matches,
    Err(err) => err.exit(),
  };

  let debug = matches.get_flag("debug");

  // Enable everything when no particular stat or group was selected.
  let mut selected: BTreeSet<String> = BTreeSet::new();
  for plugin in registry {
    if matches.get_flag(plugin.name()) {
      selected.insert(plugin.name().to_string());
    }
    for stat in plugin.stats() {
      if matches.get_flag(stat.flag) {
        selected.insert(stat.flag.to_string());
      }
    }
  }
  let all = !registry.iter().any(|plugin| plugin.enabled(&matches));

  // Detect email addresses, falling back to the config file.
  let raw_emails: Vec<String> = match matches.get_many::<String>("email") {
    Some(values) => values.cloned().collect(),
    None => vec![config.emails()?.to_string()],
  };
  let emails = split_emails(&raw_emails);

  let today = match matches.get_one::<String>("now-override") {
    Some(text) => date::parse_date(text)?,
    None => Local::now().date_naive(),
  };

  // Time period handling.
  let since_arg = matches.get_one::<String>("since");
  let until_arg = matches.get_one::<String>("until");
  let (since, until, label) = if since_arg.is_none() && until_arg.is_none() {
    let tokens: Vec<String> = matches
      .get_many::<String>("period")
      .map(|values| values.cloned().collect())
      .unwrap_or_default();
    let period = date::resolve_period(&tokens, today);
    (period.since, period.until, period.label.to_string())
  } else {
    let since = match since_arg {
      Some(text) => date::parse_date(text)?,
      None => date::parse_date(EPOCH)?,
    };
    let until = match until_arg {
      Some(text) => date::parse_date(text)?,
      None => today,
    };
    // Make the 'until' limit inclusive.
    (since, until + Duration::days(1), "given date range".to_string())
  };

  if since >= until {
    return Err(
      Error::Config(format!(
        "Invalid date range ({} to {})",
        since,
        until - Duration::days(1)
      ))
      .into(),
    );
  }

  println!(
    "Status report for {} ({} to {}).",
    label,
    since,
    until - Duration::days(1)
  );

  let format = match matches.get_one::<String>("format").map(String::as_str) {
    Some("wiki") => Format::Wiki,
    _ => Format::Text,
  };
  let width = matches
    .get_one::<usize>("width")
    .copied()
    .unwrap_or_else(|| config.width());

  let opts = Options {
    emails,
    since,
    until,
    label,
    all,
    selected,
    format,
    width,
    brief: matches.get_flag("brief"),
    verbose: matches.get_flag("verbose"),
    total: matches.get_flag("total"),
    merge: matches.get_flag("merge"),
    debug,
    matches,
  };
  debug!("gathered options: {:?}", opts);
  Ok(opts)
}

/// Tokenize a raw command line by whitespace and parse it.
pub fn parse_line(line: &str, config: &Config, registry: &[Box<dyn StatsPlugin>]) -> Result<Options> {
  let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
  parse(&tokens, config, registry)
}

static RE_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*,\s*").unwrap());

/// Split comma-delimited address lists, preserving order. Duplicates
/// are kept; empty fragments are not.
fn split_emails(raw: &[String]) -> Vec<String> {
  raw
    .iter()
    .flat_map(|value| RE_COMMA.split(value))
    .map(str::trim)
    .filter(|fragment| !fragment.is_empty())
    .map(str::to_string)
    .collect()
}

/// Render the troff man page for the assembled schema.
pub fn render_man(registry: &[Box<dyn StatsPlugin>], config: &Config) -> Result<String> {
  let cmd = build_schema(registry, config.width())?;
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();
  man.render(&mut buf)?;
  Ok(String::from_utf8_lossy(&buf).to_string())
}
