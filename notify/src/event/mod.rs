//! The notification value broadcast to observers.
//!
//! An [`Event`] is an immutable record of a name, an optional [`Sender`] and a
//! frozen [`Payload`]. Observers receive it by shared reference and may clone it
//! cheaply if they need to keep it.

pub mod payload;

use std::{any::Any, fmt, sync::Arc};

use crate::error::{Error, Result};
use crate::handle::WeakHandle;

pub use payload::{Payload, Value, value};

/// Non-owning identity of the object that posted an event.
///
/// The same type serves as the sender filter of a registration. Holding a `Sender`
/// never keeps the sender alive; two senders are equal when they refer to the same
/// allocation.
#[derive(Clone)]
pub struct Sender {
    handle: WeakHandle<dyn Any + Send + Sync>,
}

impl Sender {
    /// Identifies the value owned by `owner`.
    pub fn of<T: Any + Send + Sync>(owner: &Arc<T>) -> Self {
        let weak = Arc::downgrade(owner) as std::sync::Weak<dyn Any + Send + Sync>;
        Self {
            handle: WeakHandle::from_weak(weak),
        }
    }

    /// Returns the sender if it is still alive.
    #[inline]
    pub fn resolve(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.handle.resolve()
    }

    /// Returns the sender as a `T` if it is alive and of that type.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.resolve()?.downcast::<T>().ok()
    }

    /// Returns `true` once the sender has been dropped.
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.handle.is_dead()
    }

    /// Returns `true` if this sender is the value owned by `owner`.
    pub fn is<T: Any + Send + Sync>(&self, owner: &Arc<T>) -> bool {
        self.handle.points_to(&**owner as &(dyn Any + Send + Sync))
    }
}

impl PartialEq for Sender {
    fn eq(&self, other: &Self) -> bool {
        self.handle.ptr_eq(&other.handle)
    }
}

impl Eq for Sender {}

impl<T: Any + Send + Sync> From<&Arc<T>> for Sender {
    fn from(owner: &Arc<T>) -> Self {
        Self::of(owner)
    }
}

impl fmt::Debug for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Sender").field(&self.handle).finish()
    }
}

/// A named notification with an optional sender and a frozen payload.
#[derive(Clone)]
pub struct Event {
    name: Arc<str>,
    sender: Option<Sender>,
    payload: Payload,
}

impl Event {
    /// Creates an event with no sender and an empty payload.
    ///
    /// Fails with [`Error::MissingRequired`] when `name` is empty.
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(Error::MissingRequired("event name"));
        }
        Ok(Self {
            name: Arc::from(name),
            sender: None,
            payload: Payload::empty(),
        })
    }

    /// Sets (or clears) the sender.
    pub fn with_sender(mut self, sender: Option<Sender>) -> Self {
        self.sender = sender;
        self
    }

    /// Attaches a payload.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    #[inline]
    pub fn sender(&self) -> Option<&Sender> {
        self.sender.as_ref()
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("sender", &self.sender)
            .field("payload", &self.payload)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user_info;

    struct Button;

    // ==================== Construction ====================

    #[test]
    fn new_event_has_no_sender_and_empty_payload() {
        // When
        let event = Event::new("Test").unwrap();

        // Then
        assert_eq!(event.name(), "Test");
        assert!(event.sender().is_none());
        assert!(event.payload().is_empty());
    }

    #[test]
    fn empty_name_is_missing_required() {
        // When
        let result = Event::new("");

        // Then
        assert_eq!(result.unwrap_err(), Error::MissingRequired("event name"));
    }

    #[test]
    fn builder_attaches_sender_and_payload() {
        // Given
        let button = Arc::new(Button);
        let info = user_info!("clicks", 2u32).unwrap();

        // When
        let event = Event::new("Clicked")
            .unwrap()
            .with_sender(Some(Sender::of(&button)))
            .with_payload(info);

        // Then
        assert!(event.sender().unwrap().is(&button));
        assert_eq!(event.payload().get_as::<u32>("clicks"), Some(&2));
    }

    // ==================== Sender ====================

    #[test]
    fn sender_does_not_retain_its_owner() {
        // Given
        let button = Arc::new(Button);
        let sender = Sender::of(&button);

        // Then
        assert_eq!(Arc::strong_count(&button), 1);

        // When
        drop(button);

        // Then
        assert!(sender.is_dead());
        assert!(sender.resolve().is_none());
    }

    #[test]
    fn senders_compare_by_identity() {
        // Given
        let a = Arc::new(Button);
        let b = Arc::new(Button);

        // Then
        assert_eq!(Sender::of(&a), Sender::from(&a));
        assert_ne!(Sender::of(&a), Sender::of(&b));
        assert!(Sender::of(&a).is(&a));
        assert!(!Sender::of(&a).is(&b));
    }

    #[test]
    fn sender_downcasts_to_its_type() {
        // Given
        let owner = Arc::new(String::from("window"));
        let sender = Sender::of(&owner);

        // Then
        let resolved = sender.downcast::<String>();
        assert_eq!(resolved.as_deref().map(String::as_str), Some("window"));
        assert!(sender.downcast::<u32>().is_none());
    }
}
