use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
///
/// Existing Galaxy rows were keyed against this origin, so it stays the
/// default.
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Unix epoch: Thursday, January 1, 1970 00:00:00 UTC
pub const UNIX_ORIGIN: Duration = Duration::from_millis(0);

/// A trait for time sources that return a wall-clock timestamp.
///
/// This abstraction allows you to plug in the real system clock or a mocked
/// time source in tests.
///
/// The unit is **milliseconds** relative to the source's epoch.
///
/// # Example
///
/// ```
/// use galaxy_id::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;

    /// The epoch this source counts from, as a duration since 1970-01-01 UTC.
    fn epoch(&self) -> Duration {
        TWITTER_EPOCH
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }

    fn epoch(&self) -> Duration {
        (**self).epoch()
    }
}

/// A wall-clock time source backed by [`SystemTime`].
///
/// Unlike a monotonic ticker, this clock follows NTP steps and manual
/// adjustments, which is exactly what lets the generator notice a backward
/// jump and refuse to mint an ID.
///
/// Readings earlier than the epoch saturate to zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallClock {
    epoch: Duration,
}

impl Default for WallClock {
    /// Constructs a wall clock aligned to [`TWITTER_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(TWITTER_EPOCH)
    }
}

impl WallClock {
    /// Constructs a wall clock using `epoch` (a [`Duration`] since
    /// 1970-01-01 UTC) as t = 0.
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self { epoch }
    }
}

impl TimeSource for WallClock {
    fn current_millis(&self) -> u64 {
        let since_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        since_unix.saturating_sub(self.epoch).as_millis() as u64
    }

    fn epoch(&self) -> Duration {
        self.epoch
    }
}

/// Nanoseconds since the Unix epoch, read from the wall clock.
///
/// Used as the last-resort string ID when generation fails.
pub(crate) fn unix_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
}
