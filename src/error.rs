use thiserror::Error;

/// Failures that get a friendly message and a dedicated exit code.
///
/// Anything not covered here is left to propagate as a plain
/// `anyhow::Error` and surfaces with its full context chain.
#[derive(Debug, Error)]
pub enum Error {
  /// Invalid or missing configuration, including bad dates and ranges.
  #[error("{0}")]
  Config(String),

  /// A stats plugin could not complete its data collection.
  #[error("{0}")]
  Report(String),

  /// Credential failure while talking to an external service.
  #[error("{0}")]
  Auth(String),

  /// No email configured anywhere; the user needs a config file.
  #[error("{0}")]
  MissingConfig(String),
}

impl Error {
  pub fn exit_code(&self) -> i32 {
    match self {
      Error::Config(_) | Error::Report(_) => 1,
      Error::Auth(_) => 2,
      Error::MissingConfig(_) => 3,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn exit_codes_match_failure_families() {
    assert_eq!(Error::Config("x".into()).exit_code(), 1);
    assert_eq!(Error::Report("x".into()).exit_code(), 1);
    assert_eq!(Error::Auth("x".into()).exit_code(), 2);
    assert_eq!(Error::MissingConfig("x".into()).exit_code(), 3);
  }
}
