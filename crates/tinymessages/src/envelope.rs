use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Marker trait for values used to route messages.
///
/// Anything comparable, hashable and cloneable qualifies: an enum, an integer,
/// a `&'static str`. `Debug` is required so deliveries can be traced.
pub trait Category: Eq + Hash + Clone + Debug + Send + Sync + 'static {}
impl<T: Eq + Hash + Clone + Debug + Send + Sync + 'static> Category for T {}

/// Marker trait for message bodies. The core never looks inside a payload.
pub trait Payload: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Payload for T {}

/// An immutable `(category, payload)` pair.
///
/// The payload is reference counted, so fanning one envelope out to many
/// subscribers never clones the payload itself.
#[derive(Debug)]
pub struct Envelope<C, P> {
    category: C,
    payload: Arc<P>,
}

impl<C: Category, P: Payload> Envelope<C, P> {
    #[must_use]
    pub fn new(category: C, payload: P) -> Self {
        Self::from_arc(category, Arc::new(payload))
    }

    #[must_use]
    pub const fn from_arc(category: C, payload: Arc<P>) -> Self {
        Self { category, payload }
    }

    #[must_use]
    pub const fn category(&self) -> &C {
        &self.category
    }

    #[must_use]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Shared handle to the payload.
    #[must_use]
    pub const fn payload_arc(&self) -> &Arc<P> {
        &self.payload
    }

    #[must_use]
    pub fn into_parts(self) -> (C, Arc<P>) {
        (self.category, self.payload)
    }
}

impl<C: Clone, P> Clone for Envelope<C, P> {
    fn clone(&self) -> Self {
        Self { category: self.category.clone(), payload: Arc::clone(&self.payload) }
    }
}

impl<C: PartialEq, P: PartialEq> PartialEq for Envelope<C, P> {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category && self.payload == other.payload
    }
}

impl<C: Eq, P: Eq> Eq for Envelope<C, P> {}

impl<C: Category, P: Payload> From<(C, P)> for Envelope<C, P> {
    fn from((category, payload): (C, P)) -> Self {
        Self::new(category, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_the_payload() {
        let envelope = Envelope::new("loot", vec![1_u8, 2, 3]);
        let copy = envelope.clone();

        assert!(Arc::ptr_eq(envelope.payload_arc(), copy.payload_arc()));
        assert_eq!(envelope, copy);
    }

    #[test]
    fn into_parts_returns_both_halves() {
        let (category, payload) = Envelope::from((7_u32, "seven")).into_parts();
        assert_eq!(category, 7);
        assert_eq!(*payload, "seven");
    }

    #[test]
    fn unit_payload_is_still_a_message() {
        let envelope = Envelope::new('x', ());
        assert_eq!(envelope.category(), &'x');
        assert_eq!(envelope.payload(), &());
    }
}
