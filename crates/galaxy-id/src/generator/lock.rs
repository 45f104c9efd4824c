use core::cmp::Ordering;
use std::sync::Arc;

use tracing::instrument;

use crate::{
    generator::{Backoff, Error, Mutex, Poll, Result, SnowflakeGenerator},
    id::SnowflakeId,
    node::NodeIdentity,
    time::TimeSource,
};

/// A lock-based Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// The last issued ID (its timestamp and sequence double as the generator
/// state) lives in an [`Arc<Mutex<_>>`]; every attempt takes the lock once,
/// so callers within one process are fully serialized. Clones share state,
/// which is how one generator is handed to many request handlers.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Detects a regressing wall clock instead of minting a lower ID
/// - ✅ Pluggable [`TimeSource`] and [`Backoff`] for deterministic tests
pub struct LockSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    pub(crate) state: Arc<Mutex<ID>>,
    pub(crate) identity: NodeIdentity,
    pub(crate) time: T,
    pub(crate) backoff: Backoff,
}

impl<ID, T> Clone for LockSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            identity: self.identity,
            time: self.time.clone(),
            backoff: self.backoff,
        }
    }
}

impl<ID, T> LockSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    /// Creates a new [`LockSnowflakeGenerator`] for the given node.
    ///
    /// The initial timestamp and sequence are zero, so the first call rolls
    /// over to the current millisecond with sequence `0`.
    ///
    /// # Example
    /// ```
    /// use galaxy_id::{GalaxyId, LockSnowflakeGenerator, NodeIdentity, WallClock};
    ///
    /// let generator = LockSnowflakeGenerator::new(NodeIdentity::new(2, 5), WallClock::default());
    /// let id: GalaxyId = generator.try_next_id().unwrap();
    /// assert_eq!(id.worker_id(), 5);
    /// ```
    pub fn new(identity: NodeIdentity, time: T) -> Self {
        Self::with_backoff(identity, time, Backoff::default())
    }

    /// Same as [`Self::new`] with an explicit [`Backoff`] for sequence
    /// exhaustion.
    pub fn with_backoff(identity: NodeIdentity, time: T, backoff: Backoff) -> Self {
        Self::from_components(0, identity, 0, time, backoff)
    }

    /// Creates a new ID generator from explicit component values.
    ///
    /// Primarily useful to restore state or to start a test at a precise
    /// point (e.g. with the sequence already exhausted).
    ///
    /// # ⚠️ Note
    /// In typical use cases, you should prefer [`Self::new`].
    pub fn from_components(
        timestamp: u64,
        identity: NodeIdentity,
        sequence: u64,
        time: T,
        backoff: Backoff,
    ) -> Self {
        let id = ID::from_components(
            timestamp,
            identity.datacenter_id(),
            identity.worker_id(),
            sequence,
        );
        Self {
            state: Arc::new(Mutex::new(id)),
            identity,
            time,
            backoff,
        }
    }

    /// Generates the next ID, applying the configured [`Backoff`] while the
    /// sequence is exhausted.
    ///
    /// # Errors
    /// See [`Self::try_poll_id`].
    pub fn try_next_id(&self) -> Result<ID> {
        <Self as SnowflakeGenerator<ID>>::try_next_id(self)
    }

    /// Generates the next ID as a decimal string, falling back to a
    /// nanosecond timestamp on failure. See
    /// [`SnowflakeGenerator::next_id_string`].
    pub fn next_id_string(&self) -> String {
        <Self as SnowflakeGenerator<ID>>::next_id_string(self)
    }

    /// The node this generator stamps into every ID.
    pub fn identity(&self) -> NodeIdentity {
        self.identity
    }

    /// The time source backing this generator.
    pub fn time_source(&self) -> &T {
        &self.time
    }

    /// Attempts to generate the next available ID.
    ///
    /// Returns a new, time-ordered, unique ID if generation succeeds. If the
    /// sequence is exhausted for the current millisecond, returns
    /// [`Poll::Pending`].
    ///
    /// # Errors
    /// - [`Error::ClockMovedBackward`] if the clock reads earlier than the last
    ///   issued ID.
    /// - [`Error::TimestampOverflow`] if the clock no longer fits the layout.
    /// - `Error::LockPoisoned` if the lock has been poisoned (std mutex only).
    #[instrument(level = "trace", skip(self))]
    pub fn try_poll_id(&self) -> Result<Poll<ID>> {
        let mut id = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        // Read under the lock: a reading taken before it can be overtaken by
        // another caller's later tick and look like a regression.
        let now = self.time.current_millis();
        let current_ts = id.timestamp();
        match now.cmp(&current_ts) {
            Ordering::Equal => {
                if id.has_sequence_room() {
                    *id = id.increment_sequence();
                    Ok(Poll::Ready { id: *id })
                } else {
                    Ok(Poll::Pending { yield_for: 1 })
                }
            }
            Ordering::Greater => {
                if now > ID::max_timestamp() {
                    return Err(Error::TimestampOverflow {
                        timestamp: now,
                        max: ID::max_timestamp(),
                    });
                }
                *id = id.rollover_to_timestamp(now);
                Ok(Poll::Ready { id: *id })
            }
            Ordering::Less => Err(Self::cold_clock_behind(now, current_ts)),
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, last_timestamp: u64) -> Error {
        tracing::error!(now, last_timestamp, "clock moved backwards, refusing to generate id");
        Error::ClockMovedBackward {
            last_timestamp,
            now,
        }
    }
}

impl<ID, T> SnowflakeGenerator<ID> for LockSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    fn try_poll_id(&self) -> Result<Poll<ID>> {
        self.try_poll_id()
    }

    fn backoff(&self) -> Backoff {
        self.backoff
    }
}
