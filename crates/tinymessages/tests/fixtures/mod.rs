#![allow(dead_code, unreachable_pub)]

use parking_lot::Mutex;
use std::sync::Arc;
use tinymessages::{Handler, HandlerError, Mailbox};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    X,
    Y,
    Z,
}

/// Handler that records every call, tagged with its name.
#[derive(Debug, Default)]
pub struct Recorder {
    name: &'static str,
    seen: Mutex<Vec<(&'static str, Topic, u32)>>,
}

impl Recorder {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self { name, seen: Mutex::default() })
    }

    pub fn calls(&self) -> Vec<(Topic, u32)> {
        self.seen.lock().iter().map(|(_, topic, payload)| (*topic, *payload)).collect()
    }
}

impl Handler<Topic, u32> for Recorder {
    fn handle(&self, category: &Topic, payload: &u32) -> Result<(), HandlerError> {
        self.seen.lock().push((self.name, *category, *payload));
        Ok(())
    }
}

/// Handler that appends its name to a shared journal, to observe ordering
/// across handlers.
#[derive(Debug)]
pub struct Journaled {
    pub name: &'static str,
    pub journal: Arc<Mutex<Vec<&'static str>>>,
}

impl Handler<Topic, u32> for Journaled {
    fn handle(&self, _: &Topic, _: &u32) -> Result<(), HandlerError> {
        self.journal.lock().push(self.name);
        Ok(())
    }
}

pub fn drain<C, P>(mailbox: &mut Mailbox<C, P>) -> Vec<(C, P)>
where
    C: tinymessages::Category,
    P: tinymessages::Payload + Clone,
{
    mailbox.drain().map(|e| (e.category().clone(), e.payload().clone())).collect()
}
