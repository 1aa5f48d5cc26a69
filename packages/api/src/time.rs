//! Clock, timers and timestamp formatting for backend nanosecond timestamps.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::models::Timestamp;

pub fn now_nanos() -> Timestamp {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

pub fn to_datetime(ts: Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp_nanos(ts)
}

/// `"Mar 4, 2025"`
pub fn format_date(ts: Timestamp) -> String {
    to_datetime(ts).format("%b %-d, %Y").to_string()
}

/// `"Mar 4, 2025 14:05"`
pub fn format_date_time(ts: Timestamp) -> String {
    to_datetime(ts).format("%b %-d, %Y %H:%M").to_string()
}

/// `"14:05"`
pub fn format_time(ts: Timestamp) -> String {
    to_datetime(ts).format("%H:%M").to_string()
}

pub async fn sleep(duration: Duration) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(duration).await;
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(duration).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_nanosecond_timestamps() {
        // 2025-03-04T14:05:00Z
        let ts = 1_741_097_100 * 1_000_000_000;
        assert_eq!(format_date(ts), "Mar 4, 2025");
        assert_eq!(format_date_time(ts), "Mar 4, 2025 14:05");
        assert_eq!(format_time(ts), "14:05");
    }

    #[test]
    fn test_now_is_after_2024() {
        assert!(now_nanos() > 1_704_067_200 * 1_000_000_000);
    }
}
