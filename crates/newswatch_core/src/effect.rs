use crate::CandidateItem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Probe the notification sink before the first cycle.
    CheckSink,
    /// Fetch, decode and extract the source document.
    RunCycle { cycle: u64 },
    /// Deliver one new item to the sink.
    Notify(CandidateItem),
    /// Sleep one full poll period, unless an interrupt arrives first.
    WaitForNextCycle,
    /// Leave the run loop with the given status.
    Exit(ExitStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Interrupt-triggered shutdown.
    Clean,
    /// The startup reachability check against the sink failed.
    SinkUnreachable,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Clean => 0,
            ExitStatus::SinkUnreachable => 1,
        }
    }
}
