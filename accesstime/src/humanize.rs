//! Human-readable durations for subscription times.
//!
//! Durations are rescaled into the largest calendar-ish units (a year is 365
//! days, a month 30 days) with zero units dropped, then joined as an English
//! list: `"1 day, 2 hours, and 3 minutes"`.

const UNITS: [(&str, u64); 7] = [
    ("year", 365 * 86_400),
    ("month", 30 * 86_400),
    ("week", 7 * 86_400),
    ("day", 86_400),
    ("hour", 3600),
    ("minute", 60),
    ("second", 1),
];

/// Formats `seconds` as a human-readable duration.
#[must_use]
pub fn humanize_duration(seconds: u64) -> String {
    if seconds == 0 {
        return "0 seconds".to_owned();
    }
    let mut remaining = seconds;
    let mut parts = Vec::new();
    for (unit, size) in UNITS {
        let count = remaining / size;
        remaining %= size;
        if count > 0 {
            let plural = if count == 1 { "" } else { "s" };
            parts.push(format!("{count} {unit}{plural}"));
        }
    }
    join_long(&parts)
}

/// Like [`humanize_duration`], but `"-"` for an absent duration.
#[must_use]
pub fn humanize_optional(seconds: Option<u64>) -> String {
    seconds.map_or_else(|| "-".to_owned(), humanize_duration)
}

fn join_long(parts: &[String]) -> String {
    match parts {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_units() {
        assert_eq!(humanize_duration(1), "1 second");
        assert_eq!(humanize_duration(3600), "1 hour");
        assert_eq!(humanize_duration(86_400), "1 day");
        assert_eq!(humanize_duration(7 * 86_400), "1 week");
        assert_eq!(humanize_duration(30 * 86_400), "1 month");
        assert_eq!(humanize_duration(365 * 86_400), "1 year");
    }

    #[test]
    fn test_lists() {
        assert_eq!(humanize_duration(5400), "1 hour and 30 minutes");
        assert_eq!(
            humanize_duration(86_400 + 2 * 3600 + 3 * 60),
            "1 day, 2 hours, and 3 minutes"
        );
        assert_eq!(humanize_duration(2 * 86_400 + 1), "2 days and 1 second");
    }

    #[test]
    fn test_zero_and_absent() {
        assert_eq!(humanize_duration(0), "0 seconds");
        assert_eq!(humanize_optional(None), "-");
        assert_eq!(humanize_optional(Some(120)), "2 minutes");
    }
}
