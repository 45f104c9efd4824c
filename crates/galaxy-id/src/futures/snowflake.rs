use core::{future::Future, time::Duration};

use super::SleepProvider;
use crate::{
    generator::{Poll, Result, SnowflakeGenerator},
    id::SnowflakeId,
};

/// Extension trait for generating IDs without blocking an async executor.
///
/// Instead of applying the generator's [`Backoff`], the future sleeps through
/// the given [`SleepProvider`] whenever the sequence is exhausted.
///
/// [`Backoff`]: crate::Backoff
pub trait SnowflakeGeneratorAsyncExt<ID>
where
    ID: SnowflakeId,
{
    /// Returns a future that resolves to the next available ID.
    ///
    /// # Errors
    ///
    /// Resolves to the generator's error as soon as one is reported; a
    /// backward clock is not retried.
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<ID>> + Send
    where
        S: SleepProvider;
}

impl<G, ID> SnowflakeGeneratorAsyncExt<ID> for G
where
    G: SnowflakeGenerator<ID> + Sync,
    ID: SnowflakeId + Send,
{
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<ID>> + Send
    where
        S: SleepProvider,
    {
        async move {
            loop {
                let dur = match self.try_poll_id()? {
                    Poll::Ready { id } => return Ok(id),
                    Poll::Pending { yield_for } => Duration::from_millis(yield_for),
                };
                S::sleep_for(dur).await;
            }
        }
    }
}
