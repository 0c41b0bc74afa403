//! # tinymessages
//!
//! In-process publish/subscribe for applications driven by a tick, such as a
//! game loop. Producers `put` a `(category, payload)` pair; subscribers declare
//! the categories they care about and never see the producers.
//!
//! ## Delivery models
//!
//! Both models drain one inbound [`Channel`] per instance and share the same
//! [`Routes`] table; they differ in how a matched message reaches a subscriber.
//!
//! * [`Broker`] (push): `update()` calls each subscriber's [`Handler`]
//!   synchronously. Simple, but a slow handler stalls the whole pass.
//! * [`Relay`] (pull): `update()` copies messages into per-subscriber
//!   [`Mailbox`]es that subscribers poll whenever they like. Decoupled, but a
//!   mailbox nobody polls grows without bound.
//!
//! ## Rules
//!
//! * `put` never blocks and never fails. [`Publisher`] handles can be cloned
//!   across threads; order is kept per publisher.
//! * `update()` processes exactly the messages queued when it starts. Messages
//!   published during the pass (for example by a handler) wait for the next call,
//!   so a handler that always republishes cannot make a pass loop forever.
//! * Subscribers of one category are served in registration order. A category
//!   with no subscriber is not an error; its messages are counted as unrouted.
//! * Delivery uses the registrations present when `update()` runs, not when the
//!   message was put.
//! * Registration and `update()` take `&mut self`; sharing an instance between
//!   threads for registration requires the caller's own lock.
//!
//! # Example
//!
//! ```rust
//! use tinymessages::{Broker, Channel, Relay};
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Message { ScoreIncreased, SomethingDied }
//!
//! # fn main() -> Result<(), tinymessages::BrokerError> {
//! // Push: handlers run inside `update`.
//! let mut broker = Broker::new(Channel::new());
//! let publisher = broker.publisher();
//! broker.register_fn([Message::SomethingDied], move |_, points: &u64| {
//!     publisher.put(Message::ScoreIncreased, *points);
//!     Ok(())
//! });
//! broker.put(Message::SomethingDied, 42);
//! broker.update()?;
//! assert_eq!(broker.pending(), 1); // the follow-up waits for the next tick
//!
//! // Pull: subscribers poll their mailbox.
//! let mut relay = Relay::new(Channel::new());
//! let mut score = relay.register([Message::ScoreIncreased]);
//! relay.put(Message::ScoreIncreased, 42_u64);
//! relay.update();
//! assert_eq!(score.try_take().map(|e| *e.payload()), Some(42));
//! # Ok(())
//! # }
//! ```

mod broker;
mod channel;
mod envelope;
mod error;
mod relay;
mod report;
mod routes;

pub use broker::{Broker, Handler, SharedHandler};
pub use channel::{Channel, Publisher, Snapshot};
pub use envelope::{Category, Envelope, Payload};
pub use error::{BrokerError, BrokerErrorExt, HandlerError};
pub use relay::{Mailbox, MailboxId, MailboxSender, Relay};
pub use report::DrainReport;
pub use routes::Routes;
