use std::fmt;
use std::sync::Arc;

/// Categories exchanged by the demo subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    ScoreIncreased,
    SomethingDied,
}

/// Something living in the game world.
///
/// Only some entities are worth points; subscribers ask instead of assuming.
pub trait Entity: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn points(&self) -> Option<u64> {
        None
    }
}

/// Points granted for picking up [`Loot`].
pub const LOOT_POINTS: u64 = 42;

#[derive(Debug, Clone, Copy, Default)]
pub struct Loot;

impl Entity for Loot {
    fn name(&self) -> &str {
        "loot"
    }

    fn points(&self) -> Option<u64> {
        Some(LOOT_POINTS)
    }
}

/// Breaks apart without scoring anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Debris;

impl Entity for Debris {
    fn name(&self) -> &str {
        "debris"
    }
}

/// Payload carried by every [`MessageType`].
#[derive(Debug, Clone)]
pub enum Event {
    /// An entity left the world.
    Died(Arc<dyn Entity>),
    /// The running total after an increase.
    Score(u64),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Died(entity) => write!(f, "{} died", entity.name()),
            Self::Score(total) => write!(f, "score is {total}"),
        }
    }
}
