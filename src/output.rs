use crate::options::{Format, Options};

// Rendering helpers shared by the orchestrator and the stats sessions.
// Text mode wraps items to the configured width; wiki mode emits
// MoinMoin-style bullets and leaves wrapping to the wiki.

pub fn header(text: &str, opts: &Options) {
  match opts.format {
    Format::Wiki => println!("\n= {} =", text),
    Format::Text => println!("\n{}\n {}", "~".repeat(opts.width), text),
  }
}

pub fn item(text: &str, level: usize, opts: &Options) {
  match opts.format {
    Format::Wiki => println!("{} {}", "*".repeat(level + 1), text),
    Format::Text => {
      let indent = " ".repeat(level * 4);
      let body_width = opts.width.saturating_sub(indent.len() + 2).max(1);
      for (i, line) in wrap(text, body_width).iter().enumerate() {
        if i == 0 {
          println!("{}* {}", indent, line);
        } else {
          println!("{}  {}", indent, line);
        }
      }
    }
  }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();
  let mut current = String::new();
  for word in text.split_whitespace() {
    if current.is_empty() {
      current = word.to_string();
    } else if current.len() + 1 + word.len() <= width {
      current.push(' ');
      current.push_str(word);
    } else {
      lines.push(std::mem::take(&mut current));
      current = word.to_string();
    }
  }
  if !current.is_empty() {
    lines.push(current);
  }
  if lines.is_empty() {
    lines.push(String::new());
  }
  lines
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wrap_keeps_short_text_on_one_line() {
    assert_eq!(wrap("just one line", 40), vec!["just one line"]);
  }

  #[test]
  fn wrap_splits_on_word_boundaries() {
    let lines = wrap("alpha beta gamma delta", 11);
    assert_eq!(lines, vec!["alpha beta", "gamma delta"]);
  }

  #[test]
  fn wrap_never_drops_words() {
    let text = "one two three four five six seven eight nine ten";
    let joined = wrap(text, 7).join(" ");
    assert_eq!(joined, text);
  }

  #[test]
  fn wrap_handles_empty_text() {
    assert_eq!(wrap("", 10), vec![String::new()]);
  }
}
