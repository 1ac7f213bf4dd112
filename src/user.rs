use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Error;

/// One report target, parsed from `addr@domain` or `Name <addr@domain>`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
  pub name: Option<String>,
  pub email: String,
}

static RE_FULL: Lazy<Regex> =
  Lazy::new(|| Regex::new(r#"^"?([^"<]*?)"?\s*<([^>]+)>$"#).unwrap());

impl User {
  pub fn new(raw: &str) -> Result<User, Error> {
    let raw = raw.trim();
    if raw.is_empty() {
      return Err(Error::Config("Invalid email address ''".into()));
    }
    if let Some(caps) = RE_FULL.captures(raw) {
      let name = caps.get(1).map(|m| m.as_str().trim()).filter(|n| !n.is_empty());
      let email = caps.get(2).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
      if email.is_empty() {
        return Err(Error::Config(format!("Invalid email address '{}'", raw)));
      }
      return Ok(User {
        name: name.map(str::to_string),
        email,
      });
    }
    Ok(User {
      name: None,
      email: raw.to_string(),
    })
  }
}

impl fmt::Display for User {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.name {
      Some(name) => write!(f, "{} <{}>", name, self.email),
      None => write!(f, "{}", self.email),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bare_address() {
    let user = User::new("alice@example.com").unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.name, None);
    assert_eq!(user.to_string(), "alice@example.com");
  }

  #[test]
  fn named_address() {
    let user = User::new("Alice Liddell <alice@example.com>").unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.name.as_deref(), Some("Alice Liddell"));
    assert_eq!(user.to_string(), "Alice Liddell <alice@example.com>");
  }

  #[test]
  fn quoted_name_is_unquoted() {
    let user = User::new(r#""Alice Liddell" <alice@example.com>"#).unwrap();
    assert_eq!(user.name.as_deref(), Some("Alice Liddell"));
  }

  #[test]
  fn empty_input_is_a_config_error() {
    assert!(User::new("").is_err());
    assert!(User::new("   ").is_err());
  }
}
