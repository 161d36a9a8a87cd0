use crate::event::Event;

/// A receiver of notifications.
///
/// `receive` runs synchronously on the posting thread and must finish before the
/// table moves on to the next registration. Work that should not stall the poster
/// belongs on another thread (see [`ChannelObserver`](crate::observers::ChannelObserver)).
///
/// Observers are identified by address, so registering the same `Arc` twice yields
/// two independent registrations of one observer.
pub trait Observer: Send + Sync + 'static {
    fn receive(&self, event: &Event);
}

impl<F> Observer for F
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    #[inline]
    fn receive(&self, event: &Event) {
        self(event)
    }
}
