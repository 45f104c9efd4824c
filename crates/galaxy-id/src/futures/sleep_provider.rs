use core::{future::Future, time::Duration};

/// Abstracts over how an async caller waits out sequence exhaustion.
pub trait SleepProvider {
    /// `Send` so the resulting future can hop executor threads.
    type Sleep: Future<Output = ()> + Send;

    fn sleep_for(dur: Duration) -> Self::Sleep;
}
