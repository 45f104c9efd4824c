use core::time::Duration;

/// What a blocking caller does while the generator reports
/// [`Poll::Pending`].
///
/// Sequence exhaustion only lasts until the next millisecond, so every
/// strategy terminates; they differ in how much CPU they burn getting there.
///
/// [`Poll::Pending`]: crate::Poll::Pending
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backoff {
    /// Busy-poll the clock with a CPU spin hint.
    #[default]
    Spin,
    /// Yield the thread back to the OS scheduler between polls.
    Yield,
    /// Sleep for a fixed interval between polls.
    Sleep(Duration),
}

impl Backoff {
    /// Waits once according to the strategy. `yield_for` is the generator's
    /// hint (in milliseconds) and is ignored by the fixed strategies.
    pub fn wait(&self, _yield_for: u64) {
        match self {
            Self::Spin => core::hint::spin_loop(),
            Self::Yield => std::thread::yield_now(),
            Self::Sleep(interval) => std::thread::sleep(*interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn sleep_backoff_waits_at_least_the_interval() {
        let start = Instant::now();
        Backoff::Sleep(Duration::from_millis(2)).wait(1);
        assert!(start.elapsed() >= Duration::from_millis(2));
    }

    #[test]
    fn default_is_spin() {
        assert_eq!(Backoff::default(), Backoff::Spin);
    }
}
