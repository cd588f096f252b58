use crate::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatchStats {
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub baseline_items: usize,
    pub delivered: u64,
    pub failed_deliveries: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchView {
    pub phase: Phase,
    pub cycle: u64,
    pub seen_count: usize,
    pub stats: WatchStats,
}
