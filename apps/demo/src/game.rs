//! Tick loops driving the two delivery models.

use crate::config::DemoConfig;
use crate::subscribers::{BigBrother, Polling, Score};
use crate::world::{Debris, Entity, Event, Loot, MessageType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::thread;
use tinymessages::{Broker, BrokerError, HandlerError, Publisher, Relay};
use tracing::{debug, info, info_span};

/// Share of drops that are [`Loot`]; the rest is [`Debris`].
pub const LOOT_SHARE: f64 = 0.75;

/// Settling passes after the last tick; each subscriber chain is at most two hops.
const SETTLE_PASSES: usize = 4;

#[tmsg_derive::tmsg_error]
pub enum DemoError {
    #[error("Broker error{}: {source}", format_context(.context))]
    Broker { source: BrokerError, context: Option<Cow<'static, str>> },

    #[error("Subscriber failed{}: {source}", format_context(.context))]
    Subscriber { source: HandlerError, context: Option<Cow<'static, str>> },
}

/// Drops entities into the world at random.
#[derive(Debug)]
pub struct Spawner {
    publisher: Publisher<MessageType, Event>,
    rng: StdRng,
    drop_chance: f64,
    loot: u64,
    debris: u64,
}

impl Spawner {
    /// A fixed `seed` makes the sequence of drops reproducible. `drop_chance`
    /// is clamped to `0.0..=1.0`; NaN means nothing ever drops.
    #[must_use]
    pub fn new(
        publisher: Publisher<MessageType, Event>,
        drop_chance: f64,
        seed: Option<u64>,
    ) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let drop_chance = if drop_chance.is_nan() { 0.0 } else { drop_chance.clamp(0.0, 1.0) };
        Self { publisher, rng, drop_chance, loot: 0, debris: 0 }
    }

    /// Maybe kills something; returns what died.
    pub fn tick(&mut self) -> Option<Arc<dyn Entity>> {
        if !self.rng.random_bool(self.drop_chance) {
            return None;
        }

        let entity: Arc<dyn Entity> = if self.rng.random_bool(LOOT_SHARE) {
            self.loot += 1;
            Arc::new(Loot)
        } else {
            self.debris += 1;
            Arc::new(Debris)
        };
        debug!(entity = entity.name(), "Dropping entity");
        self.publisher.put(MessageType::SomethingDied, Event::Died(Arc::clone(&entity)));
        Some(entity)
    }

    #[must_use]
    pub const fn loot(&self) -> u64 {
        self.loot
    }

    #[must_use]
    pub const fn debris(&self) -> u64 {
        self.debris
    }
}

/// What a finished run observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub ticks: u32,
    pub loot: u64,
    pub debris: u64,
    pub score: u64,
    pub deaths_seen: u64,
    pub scores_seen: u64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ticks, {} loot, {} debris, score {} ({} deaths and {} score updates observed)",
            self.ticks, self.loot, self.debris, self.score, self.deaths_seen, self.scores_seen
        )
    }
}

fn pause(cfg: &DemoConfig) {
    let interval = cfg.tick_interval();
    if !interval.is_zero() {
        thread::sleep(interval);
    }
}

/// Runs the push model: handlers are called from inside `Broker::update`.
///
/// # Errors
/// Returns [`DemoError::Broker`] when a subscriber fails.
pub fn run_broker(cfg: &DemoConfig) -> Result<Summary, DemoError> {
    info!("Message broker demo");
    let mut broker: Broker<MessageType, Event> = Broker::default();

    let big_brother = BigBrother::new();
    broker.register(BigBrother::CATEGORIES, Arc::clone(&big_brother));
    let score = Score::new(broker.publisher());
    broker.register(Score::CATEGORIES, Arc::clone(&score));

    let mut spawner = Spawner::new(broker.publisher(), cfg.drop_chance, cfg.seed);

    for tick in 1..=cfg.ticks {
        let _span = info_span!("tick", tick).entered();
        info!("Tick!");
        broker.update().context(format!("tick {tick}"))?;
        spawner.tick();
        pause(cfg);
    }

    for _ in 0..SETTLE_PASSES {
        if broker.pending() == 0 {
            break;
        }
        broker.update().context("settling")?;
    }

    Ok(Summary {
        ticks: cfg.ticks,
        loot: spawner.loot(),
        debris: spawner.debris(),
        score: score.total(),
        deaths_seen: big_brother.deaths(),
        scores_seen: big_brother.scores(),
    })
}

fn poll_all(
    big_brother: &mut Polling<BigBrother>,
    score: &mut Polling<Score>,
) -> Result<(), DemoError> {
    big_brother.poll().context("big brother")?;
    score.poll().context("score")?;
    Ok(())
}

/// Runs the pull model: subscribers poll their mailboxes after each relay pass.
///
/// # Errors
/// Returns [`DemoError::Subscriber`] when a subscriber fails.
pub fn run_relay(cfg: &DemoConfig) -> Result<Summary, DemoError> {
    info!("Relay demo");
    let mut relay: Relay<MessageType, Event> = Relay::default();

    let mut big_brother = Polling::new(BigBrother::new(), relay.register(BigBrother::CATEGORIES));
    let mut score =
        Polling::new(Score::new(relay.publisher()), relay.register(Score::CATEGORIES));

    let mut spawner = Spawner::new(relay.publisher(), cfg.drop_chance, cfg.seed);

    for tick in 1..=cfg.ticks {
        let _span = info_span!("tick", tick).entered();
        info!("Tick!");
        relay.update();
        spawner.tick();
        debug!(big_brother = big_brother.backlog(), score = score.backlog(), "Mailbox backlog");
        poll_all(&mut big_brother, &mut score)?;
        pause(cfg);
    }

    for _ in 0..SETTLE_PASSES {
        if relay.pending() == 0 {
            break;
        }
        relay.update();
        poll_all(&mut big_brother, &mut score)?;
    }

    Ok(Summary {
        ticks: cfg.ticks,
        loot: spawner.loot(),
        debris: spawner.debris(),
        score: score.handler().total(),
        deaths_seen: big_brother.handler().deaths(),
        scores_seen: big_brother.handler().scores(),
    })
}
