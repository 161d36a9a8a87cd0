//! In-process publish/subscribe dispatch.
//!
//! The crate's centre is [`DispatchTable`]: a concurrent map from notification
//! names (plus a wildcard) to ordered lists of observer registrations. Observers
//! are held strongly or weakly, may filter on the sender of an event, and are
//! invoked synchronously on the posting thread.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use rusty_notify::{Event, Notifier, Observer, WeakNotifier};
//!
//! # fn main() -> rusty_notify::Result<()> {
//! let table = rusty_notify::global();
//! let logger: Arc<dyn Observer> = Arc::new(|e: &Event| println!("{}", e.name()));
//!
//! table.observe_weak_named(Arc::downgrade(&logger), "Saved")?;
//! table.post_pairs("Saved", None, [("path", rusty_notify::value("/tmp/a"))])?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod event;
pub mod handle;
pub mod notifier;
pub mod observer;
pub mod observers;
pub mod table;

pub use error::{Error, Result};
pub use event::{Event, Payload, Sender, Value, value};
pub use handle::WeakHandle;
pub use notifier::{Notifier, WeakNotifier};
pub use observer::Observer;
pub use table::{Config, DispatchTable, global};
