mod backoff;
mod error;
mod interface;
mod lock;
mod status;
#[cfg(test)]
mod tests;

pub use backoff::*;
pub use error::*;
pub use interface::*;
pub use lock::*;
pub use status::*;

// Generator state lock. The std fallback surfaces poisoning as an error.
#[cfg(feature = "parking-lot")]
pub(crate) use parking_lot::Mutex;
#[cfg(not(feature = "parking-lot"))]
pub(crate) use std::sync::{Mutex, MutexGuard, PoisonError};
