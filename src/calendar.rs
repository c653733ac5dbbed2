//! UTC calendar days.
//!
//! Daily puzzles and streaks only ever need whole days and ISO date strings,
//! so a day is stored as a count from 1970-01-01.

use std::{
  fmt,
  str::FromStr,
  time::{SystemTime, UNIX_EPOCH},
};

use nom::{
  bytes::complete::take_while_m_n,
  character::complete::char,
  combinator::{all_consuming, map_res},
  error::Error as NomError,
  sequence::tuple,
  Finish, IResult,
};

const SECONDS_PER_DAY: u64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay {
  /// Days since 1970-01-01.
  index: i64,
}

impl CalendarDay {
  pub fn from_index(index: i64) -> Self {
    Self { index }
  }

  /// `None` if the month or day doesn't exist, or the year doesn't fit in
  /// four digits.
  pub fn from_ymd(year: i64, month: u32, day: u32) -> Option<Self> {
    if !(0..=9999).contains(&year)
      || !(1..=12).contains(&month)
      || day == 0
      || day > 31
    {
      return None;
    }
    let out = Self {
      index: days_from_civil(year, month, day),
    };
    // Feb 30 and friends roll over into the next month.
    (out.ymd() == (year, month, day)).then_some(out)
  }

  /// The current UTC day.
  pub fn today() -> Self {
    let secs = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map(|d| d.as_secs())
      .unwrap_or(0);
    Self::from_index((secs / SECONDS_PER_DAY) as i64)
  }

  pub fn index(&self) -> i64 {
    self.index
  }

  /// The day before.
  pub fn pred(&self) -> Self {
    Self::from_index(self.index - 1)
  }

  pub fn succ(&self) -> Self {
    Self::from_index(self.index + 1)
  }

  pub fn ymd(&self) -> (i64, u32, u32) {
    civil_from_days(self.index)
  }
}

impl fmt::Display for CalendarDay {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let (y, m, d) = self.ymd();
    write!(f, "{:04}-{:02}-{:02}", y, m, d)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDayError(String);

impl fmt::Display for ParseDayError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "`{}` is not a YYYY-MM-DD date", self.0)
  }
}

impl std::error::Error for ParseDayError {}

impl FromStr for CalendarDay {
  type Err = ParseDayError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let err = || ParseDayError(s.to_string());
    let (_, (y, m, d)) = all_consuming(ymd)(s.trim()).finish().map_err(
      |_: NomError<&str>| err(),
    )?;
    Self::from_ymd(y, m, d).ok_or_else(err)
  }
}

fn ymd(s: &str) -> IResult<&str, (i64, u32, u32)> {
  let (s, (y, _, m, _, d)) = tuple((
    digits::<i64>(4),
    char('-'),
    digits::<u32>(2),
    char('-'),
    digits::<u32>(2),
  ))(s)?;
  Ok((s, (y, m, d)))
}

/// Exactly `n` ASCII digits.
fn digits<'a, T: FromStr>(
  n: usize,
) -> impl FnMut(&'a str) -> IResult<&'a str, T> {
  map_res(
    take_while_m_n(n, n, |c: char| c.is_ascii_digit()),
    str::parse::<T>,
  )
}

// Howard Hinnant's civil calendar algorithms, proleptic Gregorian.
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
  let (month, day) = (month as i64, day as i64);
  let y = if month <= 2 { year - 1 } else { year };
  let era = y.div_euclid(400);
  let yoe = y - era * 400;
  let mp = (month + 9) % 12;
  let doy = (153 * mp + 2) / 5 + day - 1;
  let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
  era * 146_097 + doe - 719_468
}

fn civil_from_days(index: i64) -> (i64, u32, u32) {
  let z = index + 719_468;
  let era = z.div_euclid(146_097);
  let doe = z - era * 146_097;
  let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
  let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
  let mp = (5 * doy + 2) / 153;
  let day = doy - (153 * mp + 2) / 5 + 1;
  let month = if mp < 10 { mp + 3 } else { mp - 9 };
  let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
  (year, month as u32, day as u32)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(s: &str) -> CalendarDay {
    s.parse().unwrap()
  }

  #[test]
  fn epoch_and_known_days() {
    assert_eq!(day("1970-01-01").index(), 0);
    assert_eq!(day("2000-03-01").index(), 11_017);
    assert_eq!(day("1969-12-31").index(), -1);
    assert_eq!(CalendarDay::from_index(0).to_string(), "1970-01-01");
  }

  #[test]
  fn yesterday_crosses_months_and_leap_days() {
    assert_eq!(day("2024-03-01").pred().to_string(), "2024-02-29");
    assert_eq!(day("2023-03-01").pred().to_string(), "2023-02-28");
    assert_eq!(day("2025-01-01").pred().to_string(), "2024-12-31");
    assert_eq!(day("2024-02-29").succ().to_string(), "2024-03-01");
  }

  #[test]
  fn display_round_trips() {
    for s in ["1999-12-31", "2024-02-29", "2026-10-18"] {
      assert_eq!(day(s).to_string(), s);
    }
  }

  #[test]
  fn rejects_impossible_dates() {
    assert!("2023-02-29".parse::<CalendarDay>().is_err());
    assert!("2024-13-01".parse::<CalendarDay>().is_err());
    assert!("2024-04-31".parse::<CalendarDay>().is_err());
    assert!("2024-4".parse::<CalendarDay>().is_err());
    assert!("yesterday".parse::<CalendarDay>().is_err());
  }

  #[test]
  fn huge_years_are_rejected_not_overflowed() {
    assert!("100000000000000000-01-01".parse::<CalendarDay>().is_err());
    assert!("10000-01-01".parse::<CalendarDay>().is_err());
    assert_eq!(CalendarDay::from_ymd(i64::MAX, 1, 1), None);
    assert_eq!(CalendarDay::from_ymd(-1, 1, 1), None);
    assert_eq!(day("9999-12-31").to_string(), "9999-12-31");
  }

  #[test]
  fn dates_must_be_zero_padded() {
    assert!("2024-3-1".parse::<CalendarDay>().is_err());
    assert!("2024-03-1".parse::<CalendarDay>().is_err());
    assert!("24-03-01".parse::<CalendarDay>().is_err());
    assert_eq!(day("0999-03-01").to_string(), "0999-03-01");
  }
}
