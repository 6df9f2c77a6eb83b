//! Wall-clock time
//!
//! Only used for record keeping (profile ids, leaderboard dates). Session
//! simulation never reads the clock; it is driven purely by tick deltas.

use std::cell::Cell;

use ::time::OffsetDateTime;

/// Source of wall-clock time in Unix milliseconds
pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// Real clock: `Date.now()` in the browser, `SystemTime` natively
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_millis(&self) -> i64 {
        js_sys::Date::now() as i64
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_millis(&self) -> i64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Manually advanced clock for tests and replays
#[derive(Debug, Default)]
pub struct FixedClock {
    millis: Cell<i64>,
}

impl FixedClock {
    pub fn new(millis: i64) -> Self {
        Self {
            millis: Cell::new(millis),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.millis.set(self.millis.get() + millis);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.millis.get()
    }
}

/// UTC calendar date (`YYYY-MM-DD`) of a Unix millisecond timestamp
pub fn iso_date(millis: i64) -> String {
    let nanos = i128::from(millis) * 1_000_000;
    match OffsetDateTime::from_unix_timestamp_nanos(nanos) {
        Ok(dt) => {
            let date = dt.date();
            format!(
                "{:04}-{:02}-{:02}",
                date.year(),
                u8::from(date.month()),
                date.day()
            )
        }
        Err(_) => "1970-01-01".to_string(),
    }
}
