//! The inbound queue shared by every producer of one broker or relay.

use crate::envelope::{Category, Envelope, Payload};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tracing::trace;

/// Cloneable producer handle onto a [`Channel`].
///
/// Publishers can be moved to other threads; `put` never blocks. Messages from
/// one publisher keep their order, messages from racing publishers interleave.
pub struct Publisher<C, P> {
    tx: UnboundedSender<Envelope<C, P>>,
}

impl<C: Category, P: Payload> Publisher<C, P> {
    /// Queues `payload` under `category`.
    ///
    /// If the owning channel has been dropped the message is discarded: nobody
    /// could ever drain it.
    pub fn put(&self, category: C, payload: P) {
        self.put_envelope(Envelope::new(category, payload));
    }

    /// Queues an already shared payload without re-wrapping it.
    pub fn put_arc(&self, category: C, payload: Arc<P>) {
        self.put_envelope(Envelope::from_arc(category, payload));
    }

    pub fn put_envelope(&self, envelope: Envelope<C, P>) {
        if let Err(mpsc::error::SendError(envelope)) = self.tx.send(envelope) {
            trace!(category = ?envelope.category(), "Message discarded: channel closed");
        }
    }

    /// Whether the owning channel is gone.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<C, P> Clone for Publisher<C, P> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<C, P> fmt::Debug for Publisher<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher").field("closed", &self.tx.is_closed()).finish()
    }
}

/// Unbounded multi-producer, single-consumer FIFO of [`Envelope`]s.
///
/// The channel is built once and handed to a [`Broker`](crate::Broker) or
/// [`Relay`](crate::Relay), which becomes its only consumer. Producers keep
/// [`Publisher`] clones. There is no capacity limit and therefore no
/// backpressure: memory is the only bound.
pub struct Channel<C, P> {
    publisher: Publisher<C, P>,
    rx: UnboundedReceiver<Envelope<C, P>>,
}

impl<C: Category, P: Payload> Channel<C, P> {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { publisher: Publisher { tx }, rx }
    }

    /// A new producer handle.
    #[must_use]
    pub fn publisher(&self) -> Publisher<C, P> {
        self.publisher.clone()
    }

    pub fn put(&self, category: C, payload: P) {
        self.publisher.put(category, payload);
    }

    /// Removes the head of the queue without waiting.
    ///
    /// `None` means "nothing queued right now"; it is never confused with a
    /// payload, since even `()` payloads arrive wrapped in an envelope.
    pub fn try_take(&mut self) -> Option<Envelope<C, P>> {
        match self.rx.try_recv() {
            Ok(envelope) => Some(envelope),
            // The channel owns a sender, so it cannot disconnect while alive.
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Number of queued envelopes.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Takes at most the envelopes queued when this is called.
    ///
    /// Envelopes published while the iterator is consumed stay queued. Items
    /// are removed one at a time, so dropping the iterator early leaves the
    /// rest of the snapshot in place.
    pub fn snapshot(&mut self) -> Snapshot<'_, C, P> {
        let remaining = self.pending();
        Snapshot { channel: self, remaining }
    }
}

impl<C: Category, P: Payload> Default for Channel<C, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, P> fmt::Debug for Channel<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel").field("pending", &self.rx.len()).finish()
    }
}

/// Iterator returned by [`Channel::snapshot`].
#[derive(Debug)]
pub struct Snapshot<'a, C, P> {
    channel: &'a mut Channel<C, P>,
    remaining: usize,
}

impl<C: Category, P: Payload> Iterator for Snapshot<'_, C, P> {
    type Item = Envelope<C, P>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let next = self.channel.try_take();
        if next.is_none() {
            self.remaining = 0;
        }
        next
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_within_one_producer() {
        let mut channel = Channel::new();
        for i in 0..5 {
            channel.put("tick", i);
        }

        let taken: Vec<_> = std::iter::from_fn(|| channel.try_take())
            .map(|envelope| *envelope.payload())
            .collect();
        assert_eq!(taken, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn empty_poll_signals_none() {
        let mut channel: Channel<&str, Option<u8>> = Channel::new();
        assert!(channel.try_take().is_none());

        channel.put("maybe", None);
        let envelope = channel.try_take().expect("a message with an empty payload");
        assert_eq!(envelope.payload(), &None);
        assert!(channel.try_take().is_none());
    }

    #[test]
    fn snapshot_ignores_late_arrivals() {
        let mut channel = Channel::new();
        let publisher = channel.publisher();
        channel.put(1_u8, "a");
        channel.put(1_u8, "b");

        let mut seen = Vec::new();
        for envelope in channel.snapshot() {
            seen.push(*envelope.payload());
            publisher.put(2, "late");
        }

        assert_eq!(seen, vec!["a", "b"]);
        assert_eq!(channel.pending(), 2);
    }

    #[test]
    fn dropping_snapshot_keeps_the_rest() {
        let mut channel = Channel::new();
        for i in 0..3 {
            channel.put((), i);
        }

        let first = channel.snapshot().next().map(|e| *e.payload());
        assert_eq!(first, Some(0));
        assert_eq!(channel.pending(), 2);
    }

    #[test]
    fn put_arc_keeps_the_shared_payload() {
        let mut channel = Channel::new();
        let payload = Arc::new(String::from("loot"));
        channel.publisher().put_arc('x', Arc::clone(&payload));

        let envelope = channel.try_take().expect("queued");
        assert!(Arc::ptr_eq(envelope.payload_arc(), &payload));
        assert_eq!(Arc::strong_count(&payload), 2);
    }

    #[test]
    fn publisher_outliving_channel_discards() {
        let channel: Channel<u8, u8> = Channel::new();
        let publisher = channel.publisher();
        drop(channel);

        assert!(publisher.is_closed());
        publisher.put(1, 1);
    }
}
