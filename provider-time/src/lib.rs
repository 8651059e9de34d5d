//! # Provider Time
//!
//! [`TimeSource`] implementations for **Totem**.

#![deny(rust_2018_idioms, clippy::all, clippy::pedantic)]

use std::time::UNIX_EPOCH;

use totem_core::provider::{TimeError, TimeSource};

/// The wall clock of the local machine.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn unix_time(&self) -> Result<u64, TimeError> {
        UNIX_EPOCH
            .elapsed()
            .map(|elapsed| elapsed.as_secs())
            .map_err(TimeError::new)
    }
}

/// Always reports the same point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl TimeSource for FixedClock {
    fn unix_time(&self) -> Result<u64, TimeError> {
        Ok(self.0)
    }
}

/// Shifts the time of another source by a fixed amount of seconds, to simulate clock drift.
#[derive(Clone, Copy, Debug)]
pub struct Skewed<T> {
    inner: T,
    offset: i64,
}

impl<T: TimeSource> Skewed<T> {
    #[must_use]
    pub fn new(inner: T, offset: i64) -> Self {
        Self { inner, offset }
    }
}

impl<T: TimeSource> TimeSource for Skewed<T> {
    fn unix_time(&self) -> Result<u64, TimeError> {
        let time = self.inner.unix_time()?;
        time.checked_add_signed(self.offset).ok_or_else(|| {
            TimeError::new(format!(
                "shifting {time} by {} seconds is out of range",
                self.offset
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.unix_time().unwrap() > 1_577_836_800);
    }

    #[test]
    fn skewed() {
        assert_eq!(95, Skewed::new(FixedClock(100), -5).unix_time().unwrap());
        assert_eq!(105, Skewed::new(FixedClock(100), 5).unix_time().unwrap());
        assert!(Skewed::new(FixedClock(3), -5).unix_time().is_err());
    }
}
