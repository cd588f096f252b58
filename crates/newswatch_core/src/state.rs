use crate::view_model::{WatchStats, WatchView};
use crate::SeenSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Starting,
    FirstCycle,
    Steady,
    Stopped,
}

/// Scheduler state: run phase, the Seen-Set it owns, and counters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    phase: Phase,
    seen: SeenSet,
    cycle: u64,
    stats: WatchStats,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    pub fn view(&self) -> WatchView {
        WatchView {
            phase: self.phase,
            cycle: self.cycle,
            seen_count: self.seen.len(),
            stats: self.stats,
        }
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn seen_mut(&mut self) -> &mut SeenSet {
        &mut self.seen
    }

    pub(crate) fn stats_mut(&mut self) -> &mut WatchStats {
        &mut self.stats
    }

    /// Advances the cycle counter and returns the new cycle number.
    pub(crate) fn begin_cycle(&mut self) -> u64 {
        self.cycle += 1;
        self.cycle
    }
}
