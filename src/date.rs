use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::error::Error;

// Period math lives here so the option parser stays focused. All
// functions take `today` explicitly; the caller decides what "now"
// means (see the hidden --now-override flag).
//
// Calendar rules: weeks start Monday, quarters begin in March, June,
// September and December, and the fiscal year begins March 1.

/// A resolved report window. `until` is exclusive: one day past the
/// nominal last day, so the displayed end date is `until - 1 day`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Period {
  pub since: NaiveDate,
  pub until: NaiveDate,
  pub label: &'static str,
}

pub fn parse_date(text: &str) -> Result<NaiveDate, Error> {
  NaiveDate::parse_from_str(text, "%Y-%m-%d")
    .map_err(|err| Error::Config(format!("Invalid date '{}' (expected YYYY-MM-DD): {}", text, err)))
}

fn week_start(today: NaiveDate) -> NaiveDate {
  today - Duration::days(today.weekday().num_days_from_monday() as i64)
}

fn month_start(today: NaiveDate) -> NaiveDate {
  today.with_day(1).unwrap()
}

fn quarter_start(today: NaiveDate) -> NaiveDate {
  let mut start = month_start(today);
  while start.month() % 3 != 0 {
    start = start.checked_sub_months(Months::new(1)).unwrap();
  }
  start
}

fn fiscal_year_start(today: NaiveDate) -> NaiveDate {
  let mut start = month_start(today);
  while start.month() != 3 {
    start = start.checked_sub_months(Months::new(1)).unwrap();
  }
  start
}

pub fn this_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
  let since = week_start(today);
  (since, since + Duration::days(7))
}

pub fn last_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
  let since = week_start(today) - Duration::days(7);
  (since, since + Duration::days(7))
}

pub fn this_month(today: NaiveDate) -> (NaiveDate, NaiveDate) {
  let since = month_start(today);
  (since, since.checked_add_months(Months::new(1)).unwrap())
}

pub fn last_month(today: NaiveDate) -> (NaiveDate, NaiveDate) {
  let until = month_start(today);
  (until.checked_sub_months(Months::new(1)).unwrap(), until)
}

pub fn this_quarter(today: NaiveDate) -> (NaiveDate, NaiveDate) {
  let since = quarter_start(today);
  (since, since.checked_add_months(Months::new(3)).unwrap())
}

pub fn last_quarter(today: NaiveDate) -> (NaiveDate, NaiveDate) {
  let until = quarter_start(today);
  (until.checked_sub_months(Months::new(3)).unwrap(), until)
}

pub fn this_year(today: NaiveDate) -> (NaiveDate, NaiveDate) {
  let since = fiscal_year_start(today);
  (since, since.checked_add_months(Months::new(12)).unwrap())
}

pub fn last_year(today: NaiveDate) -> (NaiveDate, NaiveDate) {
  let until = fiscal_year_start(today);
  (until.checked_sub_months(Months::new(12)).unwrap(), until)
}

/// Resolve positional period tokens into a concrete window.
///
/// Recognized in priority order: `today`, `year`, `quarter`, `month`,
/// falling back to `week`. Every unit except `today` honors a `last`
/// modifier selecting the previous instance. `today` always yields a
/// one-day window, `last` or not.
pub fn resolve_period(tokens: &[String], today: NaiveDate) -> Period {
  let has = |token: &str| tokens.iter().any(|t| t == token);
  let pick = |current: (NaiveDate, NaiveDate),
              previous: (NaiveDate, NaiveDate),
              current_label: &'static str,
              previous_label: &'static str| {
    let ((since, until), label) = if has("last") {
      (previous, previous_label)
    } else {
      (current, current_label)
    };
    Period { since, until, label }
  };

  if has("today") {
    Period {
      since: today,
      until: today + Duration::days(1),
      label: "today",
    }
  } else if has("year") {
    pick(this_year(today), last_year(today), "this fiscal year", "the last fiscal year")
  } else if has("quarter") {
    pick(this_quarter(today), last_quarter(today), "this quarter", "the last quarter")
  } else if has("month") {
    pick(this_month(today), last_month(today), "this month", "the last month")
  } else {
    pick(this_week(today), last_week(today), "this week", "the last week")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn tokens(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
  }

  // 2024-03-15 is a Friday.
  const Y: i32 = 2024;

  #[test]
  fn today_is_a_one_day_window() {
    let p = resolve_period(&tokens(&["today"]), day(Y, 3, 15));
    assert_eq!(p.since, day(Y, 3, 15));
    assert_eq!(p.until, day(Y, 3, 16));
    assert_eq!(p.label, "today");
  }

  #[test]
  fn today_wins_over_last() {
    let p = resolve_period(&tokens(&["last", "today"]), day(Y, 3, 15));
    assert_eq!(p.since, day(Y, 3, 15));
    assert_eq!(p.until, day(Y, 3, 16));
  }

  #[test]
  fn empty_tokens_default_to_this_week() {
    let p = resolve_period(&[], day(Y, 3, 15));
    assert_eq!(p.since, day(Y, 3, 11));
    assert_eq!(p.until, day(Y, 3, 18));
    assert_eq!(p.label, "this week");
  }

  #[test]
  fn last_week_is_the_previous_calendar_week() {
    let p = resolve_period(&tokens(&["last", "week"]), day(Y, 3, 15));
    assert_eq!(p.since, day(Y, 3, 4));
    assert_eq!(p.until, day(Y, 3, 11));
    assert_eq!(p.label, "the last week");
  }

  #[test]
  fn month_windows() {
    assert_eq!(this_month(day(Y, 3, 15)), (day(Y, 3, 1), day(Y, 4, 1)));
    assert_eq!(last_month(day(Y, 3, 15)), (day(Y, 2, 1), day(Y, 3, 1)));
    assert_eq!(last_month(day(Y, 1, 10)), (day(2023, 12, 1), day(Y, 1, 1)));
  }

  #[test]
  fn quarters_begin_in_march_june_september_december() {
    assert_eq!(this_quarter(day(Y, 3, 15)), (day(Y, 3, 1), day(Y, 6, 1)));
    assert_eq!(this_quarter(day(Y, 2, 10)), (day(2023, 12, 1), day(Y, 3, 1)));
    assert_eq!(last_quarter(day(Y, 3, 15)), (day(2023, 12, 1), day(Y, 3, 1)));
  }

  #[test]
  fn fiscal_year_begins_in_march() {
    assert_eq!(this_year(day(Y, 3, 15)), (day(Y, 3, 1), day(2025, 3, 1)));
    assert_eq!(this_year(day(Y, 1, 15)), (day(2023, 3, 1), day(Y, 3, 1)));
    assert_eq!(last_year(day(Y, 3, 15)), (day(2023, 3, 1), day(Y, 3, 1)));
  }

  #[test]
  fn until_is_always_one_past_the_inclusive_end() {
    // Every branch, with and without `last`: the stored upper bound is
    // the first day after the window, never the last day inside it.
    let today = day(Y, 3, 15);
    for toks in [
      vec!["today"],
      vec!["week"],
      vec!["last", "week"],
      vec!["month"],
      vec!["last", "month"],
      vec!["quarter"],
      vec!["last", "quarter"],
      vec!["year"],
      vec!["last", "year"],
    ] {
      let p = resolve_period(&tokens(&toks), today);
      assert!(p.since < p.until, "{:?}", toks);
      let inclusive_end = p.until - Duration::days(1);
      assert!(inclusive_end >= p.since, "{:?}", toks);
      // The day after the inclusive end is outside the window.
      assert_eq!(inclusive_end + Duration::days(1), p.until, "{:?}", toks);
    }
  }

  #[test]
  fn parse_date_accepts_iso_and_rejects_garbage() {
    assert_eq!(parse_date("2024-01-05").unwrap(), day(Y, 1, 5));
    assert!(parse_date("2024-13-01").is_err());
    assert!(parse_date("yesterday").is_err());
  }
}
