use crossbeam::channel::{Receiver, Sender, TrySendError, bounded, unbounded};

use crate::event::Event;
use crate::observer::Observer;

/// Forwards every received event into a `crossbeam` channel.
///
/// Use this to move work off the posting thread: `receive` only clones the event
/// and never blocks. A full bounded channel or a dropped receiver discards the
/// event.
pub struct ChannelObserver {
    sender: Sender<Event>,
}

impl Observer for ChannelObserver {
    fn receive(&self, event: &Event) {
        match self.sender.try_send(event.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                log::warn!("channel observer is full, dropping `{}`", event.name());
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

impl ChannelObserver {
    pub fn new(sender: Sender<Event>) -> Self {
        Self { sender }
    }

    pub fn unbounded() -> (Self, Receiver<Event>) {
        let (sender, receiver) = unbounded();
        (Self::new(sender), receiver)
    }

    pub fn bounded(capacity: usize) -> (Self, Receiver<Event>) {
        let (sender, receiver) = bounded(capacity);
        (Self::new(sender), receiver)
    }
}
