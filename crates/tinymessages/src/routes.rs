//! Category to sink routing shared by the broker and the relay.

use crate::envelope::Category;
use fxhash::{FxHashMap, FxHashSet};

/// Maps each category to the sinks registered for it, in registration order.
///
/// `S` is the delivery target: a handler for the [`Broker`](crate::Broker), a
/// mailbox sender for the [`Relay`](crate::Relay). Sinks are cloned once per
/// category they are registered under, so `S` is expected to be a cheap handle.
#[derive(Debug, Clone)]
pub struct Routes<C, S> {
    table: FxHashMap<C, Vec<S>>,
}

impl<C: Category, S: Clone> Routes<C, S> {
    #[must_use]
    pub fn new() -> Self {
        Self { table: FxHashMap::default() }
    }

    /// Appends `sink` to the list of every category in `categories`.
    ///
    /// A category repeated within one call is registered once. Returns the
    /// number of categories the sink was added to.
    pub fn register<I>(&mut self, categories: I, sink: &S) -> usize
    where
        I: IntoIterator<Item = C>,
    {
        let mut seen = FxHashSet::default();
        for category in categories {
            if seen.insert(category.clone()) {
                self.table.entry(category).or_default().push(sink.clone());
            }
        }
        seen.len()
    }

    /// Sinks registered for `category`, oldest first. Unknown categories yield
    /// an empty slice.
    #[must_use]
    pub fn lookup(&self, category: &C) -> &[S] {
        self.table.get(category).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of sinks registered for `category`.
    #[must_use]
    pub fn subscriptions(&self, category: &C) -> usize {
        self.lookup(category).len()
    }

    /// Categories with at least one sink, in no particular order.
    pub fn categories(&self) -> impl Iterator<Item = &C> {
        self.table.keys()
    }

    /// Number of categories with at least one sink.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Drops every sink for which `keep` returns `false` and forgets categories
    /// left without sinks. Returns the number of removed (category, sink) entries.
    pub fn retain(&mut self, mut keep: impl FnMut(&S) -> bool) -> usize {
        let mut removed = 0;
        self.table.retain(|_, sinks| {
            let before = sinks.len();
            sinks.retain(&mut keep);
            removed += before - sinks.len();
            !sinks.is_empty()
        });
        removed
    }
}

impl<C: Category, S: Clone> Default for Routes<C, S> {
    fn default() -> Self {
        Self::new()
    }
}
