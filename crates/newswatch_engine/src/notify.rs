use std::sync::Arc;
use std::time::Duration;

use newswatch_core::{CandidateItem, DeliveryOutcome};
use newswatch_logging::{watch_error, watch_info, watch_warn};
use tokio::time::Instant;

use crate::SinkError;

const TITLE_LOG_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    Markdown,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub format: MessageFormat,
}

impl OutgoingMessage {
    /// Rich message: bold header, markup interpreted by the sink.
    pub fn markdown(item: &CandidateItem) -> Self {
        Self {
            text: format!("📰 *New Article*\n\n{}\n\n{}", item.title, item.link),
            format: MessageFormat::Markdown,
        }
    }

    /// Same content with no markup at all.
    pub fn plain(item: &CandidateItem) -> Self {
        Self {
            text: format!("📰 New Article\n\n{}\n\n{}", item.title, item.link),
            format: MessageFormat::Plain,
        }
    }
}

/// Destination for article notifications.
#[async_trait::async_trait]
pub trait MessageSink: Send + Sync {
    /// Lightweight probe that credentials and destination are usable.
    async fn check_reachable(&self) -> Result<(), SinkError>;

    async fn send(&self, message: &OutgoingMessage) -> Result<(), SinkError>;
}

/// Delivers items one at a time with a markup fallback and fixed pacing.
pub struct Notifier {
    sink: Arc<dyn MessageSink>,
    pacing: Duration,
    last_attempt: Option<Instant>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn MessageSink>, pacing: Duration) -> Self {
        Self {
            sink,
            pacing,
            last_attempt: None,
        }
    }

    pub async fn check_sink(&self) -> Result<(), SinkError> {
        self.sink.check_reachable().await
    }

    /// Sends `item`, retrying once as plain text if the sink rejects the markup.
    ///
    /// Any other failure, or a failed fallback, yields `Failed`; the caller
    /// never retries.
    pub async fn notify(&mut self, item: &CandidateItem) -> DeliveryOutcome {
        self.pace().await;
        let outcome = self.deliver(item).await;
        self.last_attempt = Some(Instant::now());
        outcome
    }

    async fn deliver(&self, item: &CandidateItem) -> DeliveryOutcome {
        let title = short_title(&item.title);
        let err = match self.sink.send(&OutgoingMessage::markdown(item)).await {
            Ok(()) => {
                watch_info!("Sent: {}...", title);
                return DeliveryOutcome::Delivered;
            }
            Err(err) => err,
        };

        if !err.is_formatting() {
            watch_error!("Delivery failed for {}: {}", item.link, err);
            return DeliveryOutcome::Failed;
        }

        watch_warn!("Sink rejected markup ({}), retrying as plain text", err.message);
        match self.sink.send(&OutgoingMessage::plain(item)).await {
            Ok(()) => {
                watch_info!("Sent as plain text: {}...", title);
                DeliveryOutcome::Delivered
            }
            Err(err) => {
                watch_error!("Failed to send message even without markup: {}", err);
                DeliveryOutcome::Failed
            }
        }
    }

    async fn pace(&self) {
        if let Some(last) = self.last_attempt {
            tokio::time::sleep_until(last + self.pacing).await;
        }
    }
}

fn short_title(title: &str) -> String {
    title.chars().take(TITLE_LOG_CHARS).collect()
}
