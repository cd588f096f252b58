use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use newswatch_core::{update, AppState, CandidateItem, Effect, ExitStatus, Msg, Phase};
use newswatch_logging::{set_cycle, watch_debug, watch_error, watch_info, watch_warn};
use tokio_util::sync::CancellationToken;

use crate::extract::{ArticleExtractor, Extractor};
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::links::SourceBase;
use crate::notify::{MessageSink, Notifier};
use crate::telegram::{TelegramSettings, TelegramSink};
use crate::{CycleError, EngineError};

#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub source_url: String,
    pub fetch: FetchSettings,
    pub telegram: TelegramSettings,
    pub poll_interval: Duration,
    pub pacing: Duration,
}

/// Executes the effects of the core state machine against real IO.
///
/// Cycles run strictly one after another: every effect is awaited before the
/// next message is applied, and the poll period is slept in full after each
/// cycle, successful or not.
pub struct WatchEngine {
    source_url: String,
    poll_interval: Duration,
    fetcher: Arc<dyn Fetcher>,
    extractor: Box<dyn Extractor>,
    notifier: Notifier,
}

impl WatchEngine {
    pub fn new(
        source_url: impl Into<String>,
        poll_interval: Duration,
        fetcher: Arc<dyn Fetcher>,
        extractor: Box<dyn Extractor>,
        notifier: Notifier,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            poll_interval,
            fetcher,
            extractor,
            notifier,
        }
    }

    /// Wires the reqwest fetcher, article extractor and Telegram sink.
    pub fn from_settings(settings: WatchSettings) -> Result<Self, EngineError> {
        let base = SourceBase::parse(&settings.source_url).map_err(|source| {
            EngineError::SourceUrl {
                url: settings.source_url.clone(),
                source,
            }
        })?;
        let extractor = ArticleExtractor::new(base)?;
        let sink: Arc<dyn MessageSink> = Arc::new(TelegramSink::new(settings.telegram)?);

        Ok(Self::new(
            settings.source_url,
            settings.poll_interval,
            Arc::new(ReqwestFetcher::new(settings.fetch)?),
            Box::new(extractor),
            Notifier::new(sink, settings.pacing),
        ))
    }

    /// One fetch and extract pass over the source.
    pub async fn poll_source(&self) -> Result<Vec<CandidateItem>, CycleError> {
        let output = self.fetcher.fetch(&self.source_url).await?;
        watch_debug!(
            "Fetched {} bytes from {} ({} redirects, content type {:?})",
            output.metadata.byte_len,
            output.metadata.final_url,
            output.metadata.redirect_count,
            output.metadata.content_type
        );
        let items = self
            .extractor
            .extract(&output.bytes, output.metadata.content_type.as_deref())?;
        Ok(items)
    }

    /// Runs until `cancel` fires between cycles or the startup check fails.
    pub async fn run(mut self, cancel: CancellationToken) -> ExitStatus {
        let mut state = AppState::new();
        let mut queue: VecDeque<Effect> = VecDeque::new();
        let mut msg = Msg::Started;

        loop {
            let first_cycle = state.phase() == Phase::FirstCycle;
            let completed = matches!(msg, Msg::CycleCompleted { .. });
            let (next, effects) = update(state, msg);
            state = next;
            if completed {
                report_classification(first_cycle, &state, &effects);
            }
            queue.extend(effects);

            let Some(effect) = queue.pop_front() else {
                // The state machine always schedules a wait or an exit.
                watch_warn!("Scheduler went idle unexpectedly; stopping");
                return ExitStatus::Clean;
            };
            msg = match effect {
                Effect::Exit(status) => {
                    set_cycle(0);
                    let view = state.view();
                    watch_info!(
                        "Stopping after {} cycles: {} delivered, {} failed deliveries, {} links seen",
                        view.cycle,
                        view.stats.delivered,
                        view.stats.failed_deliveries,
                        view.seen_count
                    );
                    return status;
                }
                Effect::CheckSink => self.check_sink().await,
                Effect::RunCycle { cycle } => self.run_cycle(cycle).await,
                Effect::Notify(item) => {
                    let outcome = self.notifier.notify(&item).await;
                    Msg::DeliveryFinished { outcome }
                }
                Effect::WaitForNextCycle => {
                    let view = state.view();
                    watch_info!(
                        "Cycle summary: {} completed, {} failed, {} delivered, {} failed deliveries, {} seen",
                        view.stats.cycles_completed,
                        view.stats.cycles_failed,
                        view.stats.delivered,
                        view.stats.failed_deliveries,
                        view.seen_count
                    );
                    set_cycle(0);
                    self.wait_for_next_cycle(&cancel).await
                }
            };
        }
    }

    async fn check_sink(&self) -> Msg {
        match self.notifier.check_sink().await {
            Ok(()) => {
                watch_info!("Notification sink connected successfully");
                Msg::SinkChecked { reachable: true }
            }
            Err(err) => {
                watch_error!("Failed to connect to notification sink: {}", err);
                Msg::SinkChecked { reachable: false }
            }
        }
    }

    async fn run_cycle(&self, cycle: u64) -> Msg {
        set_cycle(cycle);
        watch_info!("Checking {} for new articles", self.source_url);
        match AssertUnwindSafe(self.poll_source()).catch_unwind().await {
            Ok(Ok(items)) => {
                watch_info!("Extracted {} articles", items.len());
                Msg::CycleCompleted { items }
            }
            Ok(Err(err)) => {
                watch_error!("Error checking {}: {}", self.source_url, err);
                Msg::CycleFailed {
                    reason: err.to_string(),
                }
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                watch_error!("Unexpected error during cycle: {}", reason);
                Msg::CycleFailed { reason }
            }
        }
    }

    async fn wait_for_next_cycle(&self, cancel: &CancellationToken) -> Msg {
        watch_debug!("Next check in {:?}", self.poll_interval);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                watch_info!("Interrupt received, stopping");
                Msg::StopRequested
            }
            _ = tokio::time::sleep(self.poll_interval) => Msg::TimerElapsed,
        }
    }
}

fn report_classification(first_cycle: bool, state: &AppState, effects: &[Effect]) {
    if first_cycle {
        watch_info!(
            "First run: {} articles marked as seen, not sending",
            state.view().stats.baseline_items
        );
        return;
    }
    let fresh = effects
        .iter()
        .filter(|effect| matches!(effect, Effect::Notify(_)))
        .count();
    if fresh == 0 {
        watch_info!("No new articles found");
    } else {
        watch_info!("Found {} new articles to send", fresh);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
