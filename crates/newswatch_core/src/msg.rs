use crate::{CandidateItem, DeliveryOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Process start.
    Started,
    /// Result of the sink reachability check.
    SinkChecked { reachable: bool },
    /// A cycle extracted these items, in document order.
    CycleCompleted { items: Vec<CandidateItem> },
    /// A cycle failed before classification (fetch, decode or panic).
    CycleFailed { reason: String },
    /// One notification attempt finished; the item is already seen either way.
    DeliveryFinished { outcome: DeliveryOutcome },
    /// The poll period elapsed.
    TimerElapsed,
    /// Interrupt signal observed between cycles.
    StopRequested,
    /// Leaves the watcher untouched in every phase.
    NoOp,
}
