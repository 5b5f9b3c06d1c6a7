use std::time::Duration;

/// Time unit accepted in configured durations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub fn to_duration(&self, value: u64) -> Duration {
        match self {
            TimeUnit::Milliseconds => Duration::from_millis(value),
            TimeUnit::Seconds => Duration::from_secs(value),
            TimeUnit::Minutes => Duration::from_secs(value.saturating_mul(60)),
            TimeUnit::Hours => Duration::from_secs(value.saturating_mul(3_600)),
            TimeUnit::Days => Duration::from_secs(value.saturating_mul(86_400)),
        }
    }

    /// Parse a duration string like "5s", "10m", "2h", "500ms".
    ///
    /// Only lowercase suffixes are accepted and the number must directly
    /// precede the suffix ("100ms", not "100 MS").
    pub fn parse_duration(s: &str) -> Option<Duration> {
        let s = s.trim();

        let split_pos = s.find(|c: char| !c.is_ascii_digit())?;
        if split_pos == 0 {
            return None;
        }

        let (num_str, unit_str) = s.split_at(split_pos);
        let value = num_str.parse::<u64>().ok()?;

        let time_unit = match unit_str {
            "ms" => TimeUnit::Milliseconds,
            "s" => TimeUnit::Seconds,
            "m" => TimeUnit::Minutes,
            "h" => TimeUnit::Hours,
            "d" => TimeUnit::Days,
            _ => return None,
        };

        Some(time_unit.to_duration(value))
    }
}

/// Converts a script-style millisecond delay into a `Duration`.
///
/// Negative delays are clamped to zero, matching how hosts treat
/// `setTimeout(fn, -5)`.
pub fn delay_from_millis(ms: i64) -> Duration {
    Duration::from_millis(ms.max(0) as u64)
}
