use core::{future::Future, pin::Pin, time::Duration};

use super::{SleepProvider, SnowflakeGeneratorAsyncExt};
use crate::{
    generator::{Result, SnowflakeGenerator},
    id::SnowflakeId,
};

/// [`SleepProvider`] backed by Tokio's timer.
pub struct TokioSleep;

impl SleepProvider for TokioSleep {
    type Sleep = tokio::time::Sleep;

    fn sleep_for(dur: Duration) -> Self::Sleep {
        tokio::time::sleep(dur)
    }
}

/// [`SleepProvider`] that yields to the Tokio scheduler instead of arming a
/// timer.
///
/// Lower latency when few tasks compete for a generator, more scheduler churn
/// when many do.
pub struct TokioYield;

impl SleepProvider for TokioYield {
    // `yield_now()` returns a private future type.
    type Sleep = Pin<Box<dyn Future<Output = ()> + Send>>;

    fn sleep_for(_dur: Duration) -> Self::Sleep {
        Box::pin(tokio::task::yield_now())
    }
}

/// Shorthand for [`SnowflakeGeneratorAsyncExt::try_next_id_async`] with
/// [`TokioSleep`].
pub trait SnowflakeGeneratorAsyncTokioExt<ID>
where
    ID: SnowflakeId,
{
    /// Returns a future that resolves to the next available ID.
    ///
    /// # Errors
    ///
    /// Resolves to the generator's error as soon as one is reported.
    fn try_next_id_tokio(&self) -> impl Future<Output = Result<ID>> + Send;
}

impl<G, ID> SnowflakeGeneratorAsyncTokioExt<ID> for G
where
    G: SnowflakeGenerator<ID> + Sync,
    ID: SnowflakeId + Send,
{
    fn try_next_id_tokio(&self) -> impl Future<Output = Result<ID>> + Send {
        <Self as SnowflakeGeneratorAsyncExt<ID>>::try_next_id_async::<TokioSleep>(self)
    }
}
