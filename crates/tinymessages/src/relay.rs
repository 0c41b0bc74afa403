use crate::channel::{Channel, Publisher};
use crate::envelope::{Category, Envelope, Payload};
use crate::report::DrainReport;
use crate::routes::Routes;
use fxhash::FxHashSet;
use std::fmt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tracing::{debug, trace, warn};

/// Identifies one mailbox in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MailboxId(u64);

impl fmt::Display for MailboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mailbox-{}", self.0)
    }
}

/// Sending half of a mailbox, held by the relay's routing table.
pub struct MailboxSender<C, P> {
    id: MailboxId,
    tx: UnboundedSender<Envelope<C, P>>,
}

impl<C, P> MailboxSender<C, P> {
    #[must_use]
    pub const fn id(&self) -> MailboxId {
        self.id
    }

    /// Whether the subscriber dropped its [`Mailbox`].
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<C, P> Clone for MailboxSender<C, P> {
    fn clone(&self) -> Self {
        Self { id: self.id, tx: self.tx.clone() }
    }
}

impl<C, P> fmt::Debug for MailboxSender<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailboxSender").field("id", &self.id).finish_non_exhaustive()
    }
}

/// A subscriber's private queue, filled by [`Relay::update`].
///
/// The queue is unbounded. A subscriber that stops polling makes it grow
/// without limit; the relay never evicts on its behalf. Dropping the mailbox
/// unsubscribes it on the next relay pass.
pub struct Mailbox<C, P> {
    id: MailboxId,
    rx: UnboundedReceiver<Envelope<C, P>>,
}

impl<C: Category, P: Payload> Mailbox<C, P> {
    #[must_use]
    pub const fn id(&self) -> MailboxId {
        self.id
    }

    /// Next message, or `None` when nothing is waiting.
    pub fn try_take(&mut self) -> Option<Envelope<C, P>> {
        match self.rx.try_recv() {
            Ok(envelope) => Some(envelope),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Takes everything currently queued.
    pub fn drain(&mut self) -> impl Iterator<Item = Envelope<C, P>> + '_ {
        std::iter::from_fn(|| self.try_take())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<C, P> fmt::Debug for Mailbox<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox").field("id", &self.id).field("queued", &self.rx.len()).finish()
    }
}

/// Pull model distributor.
///
/// Subscribers register a set of categories and receive a [`Mailbox`]. Each
/// [`Relay::update`] copies every message queued at the start of the call into
/// the mailbox of every subscriber registered for its category. Copies share
/// the payload, so fan-out is one reference count increment per mailbox.
///
/// # Examples
///
/// ```rust
/// use tinymessages::Relay;
///
/// let mut relay = Relay::default();
/// let mut inbox = relay.register(["loot"]);
///
/// relay.put("loot", 42_u32);
/// relay.update();
///
/// let envelope = inbox.try_take().expect("delivered");
/// assert_eq!((*envelope.category(), *envelope.payload()), ("loot", 42));
/// assert!(inbox.try_take().is_none());
/// ```
pub struct Relay<C, P> {
    channel: Channel<C, P>,
    routes: Routes<C, MailboxSender<C, P>>,
    next_id: u64,
}

impl<C: Category, P: Payload> Relay<C, P> {
    /// Creates a relay draining `channel`.
    #[must_use]
    pub fn new(channel: Channel<C, P>) -> Self {
        Self { channel, routes: Routes::new(), next_id: 0 }
    }

    /// Creates a mailbox subscribed to every category in `categories`.
    pub fn register(&mut self, categories: impl IntoIterator<Item = C>) -> Mailbox<C, P> {
        let id = MailboxId(self.next_id);
        self.next_id += 1;

        let (tx, rx) = mpsc::unbounded_channel();
        let count = self.routes.register(categories, &MailboxSender { id, tx });
        debug!(%id, categories = count, "Mailbox registered");

        Mailbox { id, rx }
    }

    pub fn put(&self, category: C, payload: P) {
        self.channel.put(category, payload);
    }

    /// A producer handle usable from other threads.
    #[must_use]
    pub fn publisher(&self) -> Publisher<C, P> {
        self.channel.publisher()
    }

    /// Messages waiting for the next [`Relay::update`].
    #[must_use]
    pub fn pending(&self) -> usize {
        self.channel.pending()
    }

    #[must_use]
    pub const fn routes(&self) -> &Routes<C, MailboxSender<C, P>> {
        &self.routes
    }

    /// Distributes every message queued at the start of the call.
    ///
    /// Never blocks and never waits for subscribers. Mailboxes found dropped
    /// during the pass are removed from the routing table afterwards.
    pub fn update(&mut self) -> DrainReport {
        let mut report = DrainReport::default();
        let mut saw_dropped = false;

        for envelope in self.channel.snapshot() {
            report.drained += 1;
            let category = envelope.category();
            let mailboxes = self.routes.lookup(category);

            if mailboxes.is_empty() {
                trace!(?category, "No mailbox registered");
                report.unrouted += 1;
                continue;
            }

            for mailbox in mailboxes {
                match mailbox.tx.send(envelope.clone()) {
                    Ok(()) => {
                        trace!(?category, mailbox = %mailbox.id, "Message relayed");
                        report.delivered += 1;
                    },
                    Err(_) => {
                        trace!(?category, mailbox = %mailbox.id, "Mailbox dropped");
                        saw_dropped = true;
                    },
                }
            }
        }

        if saw_dropped {
            report.closed = self.prune_closed();
        }

        if !report.is_idle() {
            debug!(
                drained = report.drained,
                delivered = report.delivered,
                unrouted = report.unrouted,
                closed = report.closed,
                "Relay pass complete"
            );
        }
        report
    }

    /// Removes mailboxes whose subscriber is gone from every category.
    ///
    /// Returns the number of distinct mailboxes removed, not the number of
    /// category subscriptions they held.
    pub fn prune_closed(&mut self) -> usize {
        let mut closed = FxHashSet::default();
        let subscriptions = self.routes.retain(|mailbox| {
            if mailbox.is_closed() {
                closed.insert(mailbox.id);
                return false;
            }
            true
        });
        if !closed.is_empty() {
            warn!(mailboxes = closed.len(), subscriptions, "Pruned dropped mailboxes");
        }
        closed.len()
    }
}

impl<C: Category, P: Payload> Default for Relay<C, P> {
    fn default() -> Self {
        Self::new(Channel::new())
    }
}

impl<C: Category, P> fmt::Debug for Relay<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relay")
            .field("channel", &self.channel)
            .field("categories", &self.routes.len())
            .field("mailboxes", &self.next_id)
            .finish()
    }
}
