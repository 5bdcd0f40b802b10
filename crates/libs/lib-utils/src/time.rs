//! # Time Utilities
//!
//! Clock access for everything that stamps rows or requests.

use chrono::{DateTime, Utc};

/// Get current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_utc_is_monotonic_enough() {
        let earlier = now_utc();
        let later = now_utc();
        assert!(later >= earlier);
    }
}
