//! Ready-made observers.

pub mod channel;
pub mod logging;

pub use channel::ChannelObserver;
pub use logging::LogObserver;
