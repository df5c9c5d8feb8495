// Utility functions
use chrono::{DateTime, Local};
use rand::Rng;
use std::time::Duration;

/// Sleeps for the rate-limit interval plus 0–1s of random jitter so request
/// timing does not look machine-regular to the scraped site.
pub async fn rate_limit_sleep(seconds: u64) {
    let jitter_ms = rand::rng().random_range(0..=1000);
    tokio::time::sleep(Duration::from_millis(seconds * 1000 + jitter_ms)).await;
}

/// Timestamp slug used in result file names, e.g. `07-08-2026_14-03-59`.
pub fn timestamp_slug(now: DateTime<Local>) -> String {
    now.format("%d-%m-%Y_%H-%M-%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn slug_matches_the_results_file_format() {
        let date = Local.with_ymd_and_hms(2026, 8, 7, 14, 3, 59).unwrap();
        assert_eq!(timestamp_slug(date), "07-08-2026_14-03-59");
    }
}
