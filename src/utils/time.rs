//! Time helpers
//!
//! Instance timestamps are stored as epoch milliseconds, matching what the
//! fabric agents report back.

use chrono::Utc;

/// Current time as epoch milliseconds.
pub fn unix_millis_now() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_millis_is_monotonic_enough() {
        let first = unix_millis_now();
        let second = unix_millis_now();
        assert!(first > 1_500_000_000_000);
        assert!(second >= first);
    }
}
