use crate::{
    generator::{Backoff, Poll, Result},
    id::SnowflakeId,
    time::unix_nanos,
};

/// A minimal interface for generating Snowflake IDs.
pub trait SnowflakeGenerator<ID>
where
    ID: SnowflakeId,
{
    /// Attempts to generate the next ID without blocking.
    ///
    /// The returned [`Poll`] contains either:
    /// - the newly generated ID, or
    /// - how long to yield if the sequence for this millisecond is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockMovedBackward`] if the clock regressed since the
    /// last ID, or a lock error when built without `parking-lot`.
    ///
    /// [`Error::ClockMovedBackward`]: crate::Error::ClockMovedBackward
    fn try_poll_id(&self) -> Result<Poll<ID>>;

    /// The strategy [`SnowflakeGenerator::try_next_id`] applies while
    /// pending.
    fn backoff(&self) -> Backoff {
        Backoff::default()
    }

    /// Generates the next ID, waiting out sequence exhaustion with
    /// [`SnowflakeGenerator::backoff`].
    ///
    /// # Errors
    ///
    /// Propagates any error from [`SnowflakeGenerator::try_poll_id`]. A
    /// backward clock jump is never papered over.
    fn try_next_id(&self) -> Result<ID> {
        let backoff = self.backoff();
        loop {
            match self.try_poll_id()? {
                Poll::Ready { id } => break Ok(id),
                Poll::Pending { yield_for } => backoff.wait(yield_for),
            }
        }
    }

    /// Generates the next ID in its decimal string form.
    ///
    /// This never fails: if generation errors, the current Unix time in
    /// nanoseconds is returned instead. Such fallback IDs are neither
    /// monotonic with respect to real IDs nor guaranteed unique across nodes
    /// that fall back concurrently, so every fallback is logged.
    fn next_id_string(&self) -> String {
        match self.try_next_id() {
            Ok(id) => id.to_string(),
            Err(e) => {
                let fallback = unix_nanos().to_string();
                tracing::warn!(error = %e, %fallback, "id generation failed, using timestamp fallback");
                fallback
            }
        }
    }
}
