/// Outcome of one `update()` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Envelopes taken from the inbound channel.
    pub drained: usize,
    /// Handler invocations (broker) or mailbox pushes (relay).
    pub delivered: usize,
    /// Envelopes whose category had no sink.
    pub unrouted: usize,
    /// Distinct mailboxes found dropped and pruned (relay only).
    pub closed: usize,
}

impl DrainReport {
    /// True when the pass found nothing to do.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.drained == 0
    }
}
