pub mod fixtures;

#[cfg(test)]
mod broker {
    use super::fixtures::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tinymessages::*;

    #[test]
    fn handlers_follow_registration_order() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut broker: Broker<Topic, u32> = Broker::default();
        for name in ["s1", "s2", "s3"] {
            broker.register([Topic::X], Arc::new(Journaled { name, journal: journal.clone() }));
        }

        broker.put(Topic::X, 1);
        broker.update().unwrap();

        assert_eq!(*journal.lock(), vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn no_cross_category_leakage() {
        let mut broker: Broker<Topic, u32> = Broker::default();
        let only_y = Recorder::new("y");
        broker.register([Topic::Y], only_y.clone());

        broker.put(Topic::X, 1);
        broker.put(Topic::Z, 2);
        broker.update().unwrap();

        assert!(only_y.calls().is_empty());
    }

    #[test]
    fn registration_before_update_sees_earlier_put() {
        let mut broker: Broker<Topic, u32> = Broker::default();
        broker.put(Topic::X, 5);

        let late = Recorder::new("late");
        broker.register([Topic::X], late.clone());
        broker.update().unwrap();
        assert_eq!(late.calls(), vec![(Topic::X, 5)]);

        let too_late = Recorder::new("too-late");
        broker.register([Topic::X], too_late.clone());
        broker.update().unwrap();
        assert!(too_late.calls().is_empty());
    }

    #[test]
    fn unregistered_category_is_a_no_op() {
        let mut broker: Broker<Topic, u32> = Broker::default();
        broker.put(Topic::Z, 9);

        let report = broker.update().unwrap();

        assert_eq!(report.unrouted, 1);
        assert_eq!(report.delivered, 0);
        assert_eq!(broker.pending(), 0);
    }

    #[test]
    fn empty_update_is_repeatable() {
        let mut broker: Broker<Topic, u32> = Broker::default();
        for _ in 0..10 {
            assert_eq!(broker.update().unwrap(), DrainReport::default());
        }
    }

    #[test]
    fn two_tick_scenario() {
        let mut broker: Broker<Topic, u32> = Broker::default();
        let a = Recorder::new("A");
        broker.register([Topic::X], a.clone());

        broker.put(Topic::X, 42);
        broker.update().unwrap();
        assert_eq!(a.calls(), vec![(Topic::X, 42)]);

        broker.put(Topic::X, 7);
        broker.put(Topic::Y, 9);
        broker.update().unwrap();
        assert_eq!(a.calls(), vec![(Topic::X, 42), (Topic::X, 7)]);
    }

    #[test]
    fn handler_publications_wait_for_next_update() {
        let mut broker: Broker<Topic, u32> = Broker::default();
        let publisher = broker.publisher();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        broker.register_fn([Topic::X], move |topic, n: &u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            // Always republish: a drain-until-empty loop would never end.
            publisher.put(*topic, n + 1);
            Ok(())
        });

        broker.put(Topic::X, 0);
        for tick in 1..=5 {
            let report = broker.update().unwrap();
            assert_eq!(report.drained, 1);
            assert_eq!(calls.load(Ordering::SeqCst), tick);
            assert_eq!(broker.pending(), 1);
        }
    }

    #[test]
    fn one_handler_for_several_categories() {
        let mut broker: Broker<Topic, u32> = Broker::default();
        let both = Recorder::new("both");
        broker.register([Topic::X, Topic::Y], both.clone());

        broker.put(Topic::Y, 1);
        broker.put(Topic::X, 2);
        broker.put(Topic::Z, 3);
        broker.update().unwrap();

        assert_eq!(both.calls(), vec![(Topic::Y, 1), (Topic::X, 2)]);
    }

    #[test]
    fn handler_error_surfaces_with_category() {
        let mut broker: Broker<Topic, u32> = Broker::default();
        broker.register_fn([Topic::Y], |_, _| Err("scoreboard offline".into()));

        broker.put(Topic::Y, 1);
        let err = broker.update().expect_err("handler failure must surface");

        assert!(matches!(err, BrokerError::Handler { .. }));
        assert_eq!(err.to_string(), "Handler failed (category Y): scoreboard offline");
    }

    #[test]
    #[should_panic(expected = "handler exploded")]
    fn handler_panic_propagates() {
        let mut broker: Broker<Topic, u32> = Broker::default();
        broker.register_fn([Topic::X], |_, _| panic!("handler exploded"));

        broker.put(Topic::X, 1);
        let _ = broker.update();
    }

    #[test]
    fn handler_panic_leaves_untaken_messages_queued() {
        let mut broker: Broker<Topic, u32> = Broker::default();
        let after = Recorder::new("after");
        broker.register_fn([Topic::X], |_, n: &u32| {
            assert_ne!(*n, 13, "unlucky");
            Ok(())
        });
        broker.register([Topic::X], after.clone());

        broker.put(Topic::X, 1);
        broker.put(Topic::X, 13);
        broker.put(Topic::X, 2);

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| broker.update()));
        assert!(outcome.is_err());
        assert_eq!(after.calls(), vec![(Topic::X, 1)]);
        assert_eq!(broker.pending(), 1);

        broker.update().unwrap();
        assert_eq!(after.calls(), vec![(Topic::X, 1), (Topic::X, 2)]);
    }

    #[test]
    fn injected_channel_keeps_queued_messages() {
        let channel: Channel<Topic, u32> = Channel::new();
        channel.put(Topic::X, 3);

        let mut broker = Broker::new(channel);
        let a = Recorder::new("A");
        broker.register([Topic::X], a.clone());
        broker.update().unwrap();

        assert_eq!(a.calls(), vec![(Topic::X, 3)]);
    }
}

#[cfg(test)]
mod relay {
    use super::fixtures::*;
    use tinymessages::*;

    #[test]
    fn loot_scenario() {
        let mut relay = Relay::default();
        let mut q = relay.register(["X"]);

        relay.put("X", "loot");
        relay.update();

        let envelope = q.try_take().expect("first poll yields the loot");
        assert_eq!(envelope.category(), &"X");
        assert_eq!(envelope.payload(), &"loot");
        assert!(q.try_take().is_none());
    }

    #[test]
    fn subscribers_get_independent_copies() {
        let mut relay = Relay::default();
        let mut first = relay.register([Topic::X]);
        let mut second = relay.register([Topic::X]);

        relay.put(Topic::X, 1_u32);
        relay.put(Topic::X, 2);
        relay.update();

        assert_eq!(drain(&mut first), vec![(Topic::X, 1), (Topic::X, 2)]);
        assert!(first.is_empty());
        assert_eq!(second.len(), 2);
        assert_eq!(drain(&mut second), vec![(Topic::X, 1), (Topic::X, 2)]);
    }

    #[test]
    fn copies_share_one_payload() {
        let mut relay = Relay::default();
        let mut first = relay.register([Topic::X]);
        let mut second = relay.register([Topic::X]);

        relay.put(Topic::X, vec![0_u8; 1024]);
        relay.update();

        let a = first.try_take().unwrap();
        let b = second.try_take().unwrap();
        assert!(std::sync::Arc::ptr_eq(a.payload_arc(), b.payload_arc()));
    }

    #[test]
    fn registration_before_update_sees_earlier_put() {
        let mut relay = Relay::default();
        relay.put(Topic::Y, 8_u32);
        let mut early = relay.register([Topic::Y]);
        relay.update();
        let mut late = relay.register([Topic::Y]);
        relay.update();

        assert_eq!(drain(&mut early), vec![(Topic::Y, 8)]);
        assert!(late.try_take().is_none());
    }

    #[test]
    fn no_cross_category_leakage() {
        let mut relay = Relay::default();
        let mut x = relay.register([Topic::X]);
        let mut y = relay.register([Topic::Y]);

        relay.put(Topic::Y, 'y');
        relay.put(Topic::Z, 'z');
        let report = relay.update();

        assert!(x.try_take().is_none());
        assert_eq!(drain(&mut y), vec![(Topic::Y, 'y')]);
        assert_eq!(report.unrouted, 1);
    }

    #[test]
    fn unpolled_mailbox_keeps_growing() {
        let mut relay = Relay::default();
        let idle = relay.register([Topic::X]);

        for tick in 0..100_u32 {
            relay.put(Topic::X, tick);
            relay.update();
        }

        assert_eq!(idle.len(), 100);
    }

    #[test]
    fn empty_update_is_repeatable() {
        let mut relay: Relay<Topic, ()> = Relay::default();
        let inbox = relay.register([Topic::X]);
        for _ in 0..10 {
            assert!(relay.update().is_idle());
        }
        assert!(inbox.is_empty());
    }

    #[test]
    fn dropped_mailboxes_are_reported_once() {
        let mut relay = Relay::default();
        let gone = relay.register([Topic::X, Topic::Y]);
        let mut kept = relay.register([Topic::X]);
        drop(gone);

        relay.put(Topic::X, 1_u8);
        let first = relay.update();
        relay.put(Topic::X, 2);
        let second = relay.update();

        assert_eq!(first.closed, 1);
        assert_eq!(second.closed, 0);
        assert_eq!(relay.routes().len(), 1);
        assert_eq!(drain(&mut kept), vec![(Topic::X, 1), (Topic::X, 2)]);
    }
}
