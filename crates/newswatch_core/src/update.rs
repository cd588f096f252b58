use crate::{classify, AppState, DeliveryOutcome, Effect, ExitStatus, Msg, Phase};

/// Pure update function: applies a message to state and returns any effects.
///
/// Phase transitions:
/// - `Starting` probes the sink; a reachable sink starts the first cycle, an
///   unreachable one stops with [`ExitStatus::SinkUnreachable`].
/// - `FirstCycle` classifies its items only to seed the Seen-Set and never
///   emits [`Effect::Notify`]. Success or failure both move to `Steady`.
/// - `Steady` emits one `Notify` per new item, in document order, followed by
///   a wait for the next period. Failures only schedule the wait.
/// - `StopRequested` stops from any phase.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if state.phase() == Phase::Stopped {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::Started => match state.phase() {
            Phase::Starting => vec![Effect::CheckSink],
            _ => Vec::new(),
        },
        Msg::SinkChecked { reachable } => {
            if state.phase() != Phase::Starting {
                return (state, Vec::new());
            }
            if reachable {
                state.set_phase(Phase::FirstCycle);
                let cycle = state.begin_cycle();
                vec![Effect::RunCycle { cycle }]
            } else {
                state.set_phase(Phase::Stopped);
                vec![Effect::Exit(ExitStatus::SinkUnreachable)]
            }
        }
        Msg::CycleCompleted { items } => match state.phase() {
            Phase::FirstCycle => {
                let baseline = classify(items, state.seen_mut());
                let stats = state.stats_mut();
                stats.cycles_completed += 1;
                stats.baseline_items += baseline.len();
                state.set_phase(Phase::Steady);
                vec![Effect::WaitForNextCycle]
            }
            Phase::Steady => {
                let fresh = classify(items, state.seen_mut());
                state.stats_mut().cycles_completed += 1;
                let mut effects = Vec::with_capacity(fresh.len() + 1);
                effects.extend(fresh.into_iter().map(Effect::Notify));
                effects.push(Effect::WaitForNextCycle);
                effects
            }
            Phase::Starting | Phase::Stopped => Vec::new(),
        },
        Msg::CycleFailed { .. } => match state.phase() {
            Phase::FirstCycle | Phase::Steady => {
                state.stats_mut().cycles_failed += 1;
                state.set_phase(Phase::Steady);
                vec![Effect::WaitForNextCycle]
            }
            Phase::Starting | Phase::Stopped => Vec::new(),
        },
        Msg::DeliveryFinished { outcome } => {
            let stats = state.stats_mut();
            match outcome {
                DeliveryOutcome::Delivered => stats.delivered += 1,
                DeliveryOutcome::Failed => stats.failed_deliveries += 1,
            }
            Vec::new()
        }
        Msg::TimerElapsed => match state.phase() {
            Phase::Steady => {
                let cycle = state.begin_cycle();
                vec![Effect::RunCycle { cycle }]
            }
            _ => Vec::new(),
        },
        Msg::StopRequested => {
            state.set_phase(Phase::Stopped);
            vec![Effect::Exit(ExitStatus::Clean)]
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
