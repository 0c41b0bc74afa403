use crate::channel::{Channel, Publisher};
use crate::envelope::{Category, Payload};
use crate::error::{BrokerError, BrokerErrorExt, HandlerError};
use crate::report::DrainReport;
use crate::routes::Routes;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A subscriber callback driven by [`Broker::update`].
///
/// Handlers run synchronously on the thread calling `update`, so a slow handler
/// delays every message behind it in the same pass. Handlers take `&self`; keep
/// mutable state behind a lock or an atomic.
///
/// Returning `Err` aborts the current pass and surfaces from `update`. To emit
/// follow-up messages, hold a [`Publisher`]: they are delivered on the next
/// `update`.
pub trait Handler<C, P>: Send + Sync {
    /// Called once per matching message.
    ///
    /// # Errors
    /// Any error is returned to the caller of [`Broker::update`] unchanged.
    fn handle(&self, category: &C, payload: &P) -> Result<(), HandlerError>;
}

impl<C, P, F> Handler<C, P> for F
where
    F: Fn(&C, &P) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self, category: &C, payload: &P) -> Result<(), HandlerError> {
        self(category, payload)
    }
}

/// How the routing table stores broker handlers.
pub type SharedHandler<C, P> = Arc<dyn Handler<C, P>>;

/// Push model dispatcher.
///
/// Producers `put` messages; once per tick the owner calls [`Broker::update`],
/// which hands every message that was queued at the start of the call to the
/// handlers registered for its category, in registration order.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use tinymessages::Broker;
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// enum Topic { Died, Spawned }
///
/// # fn main() -> Result<(), tinymessages::BrokerError> {
/// let mut broker = Broker::default();
/// let deaths = Arc::new(AtomicU32::new(0));
///
/// let counter = Arc::clone(&deaths);
/// broker.register_fn([Topic::Died], move |_, points: &u32| {
///     counter.fetch_add(*points, Ordering::Relaxed);
///     Ok(())
/// });
///
/// broker.put(Topic::Died, 42);
/// broker.put(Topic::Spawned, 1);
/// let report = broker.update()?;
///
/// assert_eq!(deaths.load(Ordering::Relaxed), 42);
/// assert_eq!(report.unrouted, 1);
/// # Ok(())
/// # }
/// ```
pub struct Broker<C, P> {
    channel: Channel<C, P>,
    routes: Routes<C, SharedHandler<C, P>>,
}

impl<C: Category, P: Payload> Broker<C, P> {
    /// Creates a broker draining `channel`.
    #[must_use]
    pub fn new(channel: Channel<C, P>) -> Self {
        Self { channel, routes: Routes::new() }
    }

    /// Registers `handler` for every category in `categories`.
    ///
    /// The broker keeps a shared reference; the caller may keep its own clone of
    /// the `Arc` to inspect the subscriber afterwards.
    pub fn register<H>(&mut self, categories: impl IntoIterator<Item = C>, handler: Arc<H>)
    where
        H: Handler<C, P> + 'static,
    {
        let handler: SharedHandler<C, P> = handler;
        let count = self.routes.register(categories, &handler);
        debug!(categories = count, handler = std::any::type_name::<H>(), "Handler registered");
    }

    /// Registers a closure as a handler.
    pub fn register_fn<F>(&mut self, categories: impl IntoIterator<Item = C>, handler: F)
    where
        F: Fn(&C, &P) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.register(categories, Arc::new(handler));
    }

    pub fn put(&self, category: C, payload: P) {
        self.channel.put(category, payload);
    }

    /// A producer handle usable from other threads and from inside handlers.
    #[must_use]
    pub fn publisher(&self) -> Publisher<C, P> {
        self.channel.publisher()
    }

    /// Messages waiting for the next [`Broker::update`].
    #[must_use]
    pub fn pending(&self) -> usize {
        self.channel.pending()
    }

    #[must_use]
    pub const fn routes(&self) -> &Routes<C, SharedHandler<C, P>> {
        &self.routes
    }

    /// Dispatches every message queued at the start of the call.
    ///
    /// Messages published while the pass runs, including by handlers, wait for
    /// the next call. Calling this with nothing queued is a cheap no-op.
    ///
    /// # Errors
    /// Returns [`BrokerError::Handler`] as soon as a handler fails. Remaining
    /// handlers of that message are skipped; messages not yet taken stay queued.
    pub fn update(&mut self) -> Result<DrainReport, BrokerError> {
        let mut report = DrainReport::default();

        for envelope in self.channel.snapshot() {
            report.drained += 1;
            let category = envelope.category();
            let handlers = self.routes.lookup(category);

            if handlers.is_empty() {
                trace!(?category, "No handler registered");
                report.unrouted += 1;
                continue;
            }

            for handler in handlers {
                if let Err(err) = handler.handle(category, envelope.payload()) {
                    warn!(?category, error = %err, "Handler failed; aborting pass");
                    return Err(err).context(format!("category {category:?}"));
                }
                report.delivered += 1;
            }
            trace!(?category, handlers = handlers.len(), "Message dispatched");
        }

        if !report.is_idle() {
            debug!(
                drained = report.drained,
                delivered = report.delivered,
                unrouted = report.unrouted,
                "Broker pass complete"
            );
        }
        Ok(report)
    }
}

impl<C: Category, P: Payload> Default for Broker<C, P> {
    fn default() -> Self {
        Self::new(Channel::new())
    }
}

impl<C: Category, P> fmt::Debug for Broker<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broker")
            .field("channel", &self.channel)
            .field("categories", &self.routes.len())
            .finish()
    }
}
