//! Countdown formatting for token deadlines.

use chrono::{DateTime, Utc};

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Format a countdown to a future time.
#[must_use]
pub fn format_countdown(target: DateTime<Utc>) -> String {
    format_countdown_from(target, Utc::now())
}

/// [`format_countdown`] with an explicit clock.
#[must_use]
pub fn format_countdown_from(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = target.signed_duration_since(now);

    if duration.num_seconds() <= 0 {
        return "expired".to_string();
    }

    let hours = duration.num_hours();
    let minutes = duration.num_minutes() % 60;

    if hours >= 48 {
        let days = hours / 24;
        format!("in {days} day{}", plural(days))
    } else if hours > 0 {
        format!("in {hours}h {minutes}m")
    } else if minutes > 0 {
        format!("in {minutes}m")
    } else {
        format!("in {}s", duration.num_seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-18T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn countdown_for_token_expiry() {
        assert_eq!(
            format_countdown_from(now() + Duration::hours(12), now()),
            "in 12h 0m"
        );
        assert_eq!(
            format_countdown_from(now() + Duration::minutes(5), now()),
            "in 5m"
        );
        assert_eq!(format_countdown_from(now() + Duration::days(3), now()), "in 3 days");
        assert_eq!(format_countdown_from(now() - Duration::hours(1), now()), "expired");
    }
}
