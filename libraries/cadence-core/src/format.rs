/// Duration display helpers
use std::time::Duration;

/// Rendered in place of a duration that could not be determined
pub const UNKNOWN_DURATION: &str = "--:--";

/// Format a track duration as `m:ss`
///
/// Minutes are not wrapped into hours, so a 75 minute mix renders as `75:00`.
/// `None` renders as [`UNKNOWN_DURATION`].
pub fn format_duration(duration: Option<Duration>) -> String {
    match duration {
        Some(duration) => {
            let total = duration.as_secs();
            format!("{}:{:02}", total / 60, total % 60)
        }
        None => UNKNOWN_DURATION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_padded_seconds() {
        assert_eq!(format_duration(Some(Duration::from_secs(0))), "0:00");
        assert_eq!(format_duration(Some(Duration::from_secs(9))), "0:09");
        assert_eq!(format_duration(Some(Duration::from_secs(168))), "2:48");
        assert_eq!(format_duration(Some(Duration::from_secs(302))), "5:02");
    }

    #[test]
    fn truncates_fractional_seconds() {
        assert_eq!(format_duration(Some(Duration::from_secs_f64(59.99))), "0:59");
    }

    #[test]
    fn long_durations_keep_counting_minutes() {
        assert_eq!(format_duration(Some(Duration::from_secs(75 * 60))), "75:00");
    }

    #[test]
    fn unknown_renders_placeholder() {
        assert_eq!(format_duration(None), "--:--");
    }
}
