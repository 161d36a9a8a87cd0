//! Public trait seams of the dispatch table.
//!
//! [`Notifier`] covers strong registration, removal and posting; [`WeakNotifier`]
//! adds weak registration. The required methods are the canonical full-argument
//! forms; every provided method funnels into them.

use std::sync::{Arc, Weak};

use crate::error::Result;
use crate::event::{Event, Payload, Sender, Value};
use crate::observer::Observer;

pub trait Notifier: Send + Sync {
    /// Files a strong registration: the table keeps `observer` alive until it is
    /// removed.
    ///
    /// `name` restricts delivery to events of that name (`None` matches every
    /// event). `sender` restricts delivery to events posted by that sender; the
    /// filter is held weakly. Identical registrations are not merged.
    ///
    /// Fails with [`Error::MissingRequired`](crate::Error::MissingRequired) for an
    /// empty name.
    fn add_observer(
        &self,
        observer: Arc<dyn Observer>,
        name: Option<&str>,
        sender: Option<Sender>,
    ) -> Result<()>;

    /// Removes the registrations of `observer` that match `name` and `sender`.
    ///
    /// With a name only that bucket is scanned, otherwise every bucket is. An
    /// absent `sender` removes regardless of filters. A given `sender` removes
    /// unfiltered registrations and those filtering on that same sender.
    /// Removing an observer that was never registered is a no-op.
    fn remove_observer(
        &self,
        observer: &dyn Observer,
        name: Option<&str>,
        sender: Option<&Sender>,
    ) -> Result<()>;

    /// Delivers `event` synchronously to the registrations filed under its name,
    /// then to the wildcard registrations.
    fn post_notification(&self, event: &Event);

    fn observe(&self, observer: Arc<dyn Observer>) -> Result<()> {
        self.add_observer(observer, None, None)
    }

    fn observe_named(&self, observer: Arc<dyn Observer>, name: &str) -> Result<()> {
        self.add_observer(observer, Some(name), None)
    }

    /// Removes every registration of `observer` in every bucket.
    fn remove_all(&self, observer: &dyn Observer) -> Result<()> {
        self.remove_observer(observer, None, None)
    }

    fn remove_named(&self, observer: &dyn Observer, name: &str) -> Result<()> {
        self.remove_observer(observer, Some(name), None)
    }

    /// Posts an event with no sender and an empty payload.
    fn post(&self, name: &str) -> Result<()> {
        self.post_from(name, None)
    }

    fn post_from(&self, name: &str, sender: Option<Sender>) -> Result<()> {
        self.post_with(name, sender, Payload::empty())
    }

    fn post_with(&self, name: &str, sender: Option<Sender>, payload: Payload) -> Result<()> {
        let event = Event::new(name)?
            .with_sender(sender)
            .with_payload(payload);
        self.post_notification(&event);
        Ok(())
    }

    /// Builds the payload from key/value pairs, then posts. A repeated key fails
    /// with [`Error::DuplicateKey`](crate::Error::DuplicateKey) and nothing is
    /// posted.
    fn post_pairs<K, I>(&self, name: &str, sender: Option<Sender>, pairs: I) -> Result<()>
    where
        Self: Sized,
        K: ToString,
        I: IntoIterator<Item = (K, Value)>,
    {
        let payload = Payload::from_pairs(pairs)?;
        self.post_with(name, sender, payload)
    }
}

pub trait WeakNotifier: Notifier {
    /// Files a weak registration. The table never keeps `observer` alive: once its
    /// last owner drops it, it stops receiving events and the registration is
    /// pruned lazily.
    fn add_weak_observer(
        &self,
        observer: Weak<dyn Observer>,
        name: Option<&str>,
        sender: Option<Sender>,
    ) -> Result<()>;

    fn observe_weak(&self, observer: Weak<dyn Observer>) -> Result<()> {
        self.add_weak_observer(observer, None, None)
    }

    fn observe_weak_named(&self, observer: Weak<dyn Observer>, name: &str) -> Result<()> {
        self.add_weak_observer(observer, Some(name), None)
    }
}
