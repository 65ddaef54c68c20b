//! Trace observers: the [`Subscribe`] trait and its fan-out machinery.

mod set;
mod subscribe;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
mod log;
#[cfg(feature = "logging")]
pub use log::LogWriter;
