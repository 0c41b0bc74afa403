use std::borrow::Cow;

/// Boxed failure returned by a broker handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by [`Broker::update`](crate::Broker::update).
#[tmsg_derive::tmsg_error]
pub enum BrokerError {
    /// A subscriber handler failed. The pass stopped at that handler; later
    /// handlers for the same message were skipped and untouched messages stay
    /// queued for the next update.
    #[error("Handler failed{}: {source}", format_context(.context))]
    Handler { source: HandlerError, context: Option<Cow<'static, str>> },
}
