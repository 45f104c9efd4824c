use crate::id::SnowflakeId;

/// Represents the result of a single attempt to generate a new ID.
///
/// - [`Poll::Ready`] indicates a new ID was successfully generated.
/// - [`Poll::Pending`] means the sequence for the current millisecond is
///   exhausted and the caller should back off for `yield_for` milliseconds
///   before trying again.
///
/// This allows non-blocking generation loops and explicit backoff strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll<ID: SnowflakeId> {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: ID,
    },
    /// No ID could be generated because the sequence has been exhausted for
    /// the current millisecond.
    Pending {
        /// How long (in milliseconds) until the clock is expected to tick.
        yield_for: u64,
    },
}
