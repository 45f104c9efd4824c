use thiserror::Error;

/// A result type defaulting to the generator [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants the generator can emit.
#[derive(Clone, Debug, Error, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// The wall clock reads earlier than the last millisecond an ID was minted
    /// for.
    ///
    /// No ID is produced: correcting for the regression could hand out a
    /// duplicate. The caller decides whether to retry, alert or give up.
    #[error("clock moved backwards: last timestamp {last_timestamp}, now {now}")]
    ClockMovedBackward { last_timestamp: u64, now: u64 },

    /// The clock has run past what the timestamp field can hold.
    #[error("timestamp {timestamp} exceeds the {max} ms the layout can encode")]
    TimestampOverflow { timestamp: u64, max: u64 },

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is not available.
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
