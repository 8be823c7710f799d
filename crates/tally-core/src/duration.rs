//! Credit amounts are signed durations of time.

use chrono::TimeDelta;

/// Render a credit amount compactly: `2h`, `1h30m`, `-45m`, `0s`.
pub fn format_credits(amount: TimeDelta) -> String {
  let total = amount.num_seconds();
  if total == 0 {
    return "0s".to_owned();
  }

  let sign = if total < 0 { "-" } else { "" };
  let abs = total.unsigned_abs();
  let (hours, minutes, seconds) = (abs / 3600, abs % 3600 / 60, abs % 60);

  let mut out = String::from(sign);
  if hours > 0 {
    out.push_str(&format!("{hours}h"));
  }
  if minutes > 0 {
    out.push_str(&format!("{minutes}m"));
  }
  if seconds > 0 {
    out.push_str(&format!("{seconds}s"));
  }
  out
}

/// Serde adapter storing a [`TimeDelta`] as whole signed seconds.
///
/// ```rust,ignore
/// #[serde(with = "tally_core::duration::seconds")]
/// pub amount: TimeDelta,
/// ```
pub mod seconds {
  use chrono::TimeDelta;
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_i64(value.num_seconds())
  }

  pub fn deserialize<'de, D>(deserializer: D) -> Result<TimeDelta, D::Error>
  where
    D: Deserializer<'de>,
  {
    let secs = i64::deserialize(deserializer)?;
    TimeDelta::try_seconds(secs)
      .ok_or_else(|| D::Error::custom(format!("duration out of range: {secs}s")))
  }
}
