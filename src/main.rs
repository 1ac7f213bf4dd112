use anyhow::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod config;
mod date;
mod error;
mod options;
mod output;
mod plugins;
mod report;
mod stats;
mod user;

use crate::config::Config;
use crate::error::Error;
use crate::stats::{TeamStats, UserStats};

fn main() -> Result<()> {
  let args: Vec<String> = std::env::args().skip(1).collect();

  // Verbosity is decided by the caller, not mutated inside parsing;
  // a pre-scan keeps parse failures visible at the requested level.
  init_logging(args.iter().any(|arg| arg == "--debug"));

  if args.iter().any(|arg| arg == "--gen-man") {
    let config = Config::load().unwrap_or_default();
    let page = options::render_man(&plugins::registry(), &config)?;
    print!("{}", page);
    return Ok(());
  }

  match run(&args) {
    Ok(_) => Ok(()),
    Err(err) => {
      // Only the classified families get friendly handling; anything
      // else propagates with its full context chain.
      let Some(classified) = err.downcast_ref::<Error>() else {
        return Err(err);
      };
      error!("{}", classified);
      match classified {
        Error::Auth(_) => {
          error!("GitHub authentication failed. Set GITHUB_TOKEN or run 'gh auth login'.");
        }
        Error::MissingConfig(_) => {
          error!("No email provided on the command line or in the config file");
          println!("Create at least a minimal config file {}:", Config::path().display());
          println!("[general]");
          println!("email = \"{}@example.com\"", whoami::username());
        }
        Error::Config(_) | Error::Report(_) => {}
      }
      std::process::exit(classified.exit_code());
    }
  }
}

/// Parse options, gather stats for every user, return all sessions.
fn run(args: &[String]) -> Result<(Vec<UserStats>, TeamStats)> {
  let config = Config::load()?;
  let registry = plugins::registry();
  let opts = options::parse(args, &config, &registry)?;
  report::run(&opts, &config, &registry)
}

fn init_logging(debug: bool) {
  let default = if debug { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
    .with_writer(std::io::stderr)
    .init();
}
