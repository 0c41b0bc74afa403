//! The two demo subscribers.
//!
//! Both implement [`Handler`], so the broker demo registers them directly and
//! the relay demo wraps them in a [`Polling`] adapter that feeds them from a
//! mailbox once per tick.

use crate::world::{Event, MessageType};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tinymessages::{Handler, HandlerError, Mailbox, Publisher};
use tracing::info;

fn mismatch(kind: MessageType, event: &Event) -> HandlerError {
    format!("unexpected {kind:?} payload: {event}").into()
}

/// Keeps the running score and announces every increase.
///
/// Deaths worth no points leave the total unchanged and publish nothing, so
/// every `ScoreIncreased` carries a higher total than the one before.
#[derive(Debug)]
pub struct Score {
    total: AtomicU64,
    publisher: Publisher<MessageType, Event>,
}

impl Score {
    /// Listens to these categories.
    pub const CATEGORIES: [MessageType; 1] = [MessageType::SomethingDied];

    #[must_use]
    pub fn new(publisher: Publisher<MessageType, Event>) -> Arc<Self> {
        Arc::new(Self { total: AtomicU64::new(0), publisher })
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl Handler<MessageType, Event> for Score {
    fn handle(&self, kind: &MessageType, event: &Event) -> Result<(), HandlerError> {
        let Event::Died(entity) = event else {
            return Err(mismatch(*kind, event));
        };

        match entity.points() {
            Some(points) => {
                let total = self.total.fetch_add(points, Ordering::Relaxed) + points;
                info!(points, total, "Score: increased by {points} to {total}");
                self.publisher.put(MessageType::ScoreIncreased, Event::Score(total));
            },
            None => {
                info!(entity = entity.name(), "Score: not increased, entity provides no points");
            },
        }
        Ok(())
    }
}

/// Watches everything and keeps tallies.
#[derive(Debug, Default)]
pub struct BigBrother {
    deaths: AtomicU64,
    scores: AtomicU64,
}

impl BigBrother {
    pub const CATEGORIES: [MessageType; 2] =
        [MessageType::SomethingDied, MessageType::ScoreIncreased];

    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[must_use]
    pub fn deaths(&self) -> u64 {
        self.deaths.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn scores(&self) -> u64 {
        self.scores.load(Ordering::Relaxed)
    }
}

impl Handler<MessageType, Event> for BigBrother {
    fn handle(&self, kind: &MessageType, event: &Event) -> Result<(), HandlerError> {
        match (kind, event) {
            (MessageType::SomethingDied, Event::Died(entity)) => {
                self.deaths.fetch_add(1, Ordering::Relaxed);
                info!(entity = entity.name(), "BigBrother: Yeeaaahhiiii, somebody died!");
            },
            (MessageType::ScoreIncreased, Event::Score(total)) => {
                self.scores.fetch_add(1, Ordering::Relaxed);
                info!(total, "BigBrother: Yeeaaahhiiii, we scored!");
            },
            _ => return Err(mismatch(*kind, event)),
        }
        Ok(())
    }
}

/// Feeds a handler from its relay mailbox.
#[derive(Debug)]
pub struct Polling<H> {
    handler: Arc<H>,
    mailbox: Mailbox<MessageType, Event>,
}

impl<H: Handler<MessageType, Event>> Polling<H> {
    #[must_use]
    pub const fn new(handler: Arc<H>, mailbox: Mailbox<MessageType, Event>) -> Self {
        Self { handler, mailbox }
    }

    /// Handles everything waiting in the mailbox and returns how many messages
    /// were seen.
    ///
    /// # Errors
    /// Stops at the first handler failure; later messages stay in the mailbox.
    pub fn poll(&mut self) -> Result<usize, HandlerError> {
        let mut seen = 0;
        while let Some(envelope) = self.mailbox.try_take() {
            self.handler.handle(envelope.category(), envelope.payload())?;
            seen += 1;
        }
        Ok(seen)
    }

    #[must_use]
    pub const fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    /// Messages waiting in the mailbox.
    #[must_use]
    pub fn backlog(&self) -> usize {
        self.mailbox.len()
    }
}
