//! Encoding helpers between Rust values and the plain representations
//! stored in, or sent to, SQLite.

use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamps are stored as fixed-width RFC 3339 strings.
pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

/// Build a `LIKE` pattern matching `needle` anywhere, with `\` as the escape
/// character so `%` and `_` in user input match literally.
pub fn like_pattern(needle: &str) -> String {
  let mut out = String::with_capacity(needle.len() + 2);
  out.push('%');
  for c in needle.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

/// `?{first}, ?{first+1}, ...`: `count` numbered placeholders for an `IN`
/// list.
pub fn placeholders(first: usize, count: usize) -> String {
  (first..first + count)
    .map(|i| format!("?{i}"))
    .collect::<Vec<_>>()
    .join(", ")
}

/// SQLite integers are signed; page bounds beyond `i64::MAX` saturate.
pub fn encode_u64(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }
