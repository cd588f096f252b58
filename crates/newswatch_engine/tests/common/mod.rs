#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use newswatch_engine::{
    FailureKind, FetchError, FetchMetadata, FetchOutput, Fetcher, MessageFormat, MessageSink,
    OutgoingMessage, SinkError, SinkErrorKind,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub fn sink_error(kind: SinkErrorKind) -> SinkError {
    SinkError {
        kind,
        message: "scripted failure".to_string(),
    }
}

/// Records every message and answers from a script, then succeeds.
#[derive(Default)]
pub struct RecordingSink {
    reachable: bool,
    replies: Mutex<VecDeque<Result<(), SinkError>>>,
    sent: Mutex<Vec<(Instant, OutgoingMessage)>>,
}

impl RecordingSink {
    pub fn reachable() -> Arc<Self> {
        Arc::new(Self {
            reachable: true,
            ..Self::default()
        })
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_replies(replies: Vec<Result<(), SinkError>>) -> Arc<Self> {
        Arc::new(Self {
            reachable: true,
            replies: Mutex::new(replies.into()),
            ..Self::default()
        })
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn sent_at(&self) -> Vec<Instant> {
        self.sent.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }
}

#[async_trait::async_trait]
impl MessageSink for RecordingSink {
    async fn check_reachable(&self) -> Result<(), SinkError> {
        if self.reachable {
            Ok(())
        } else {
            Err(sink_error(SinkErrorKind::Unauthorized))
        }
    }

    async fn send(&self, message: &OutgoingMessage) -> Result<(), SinkError> {
        self.sent
            .lock()
            .unwrap()
            .push((Instant::now(), message.clone()));
        self.replies.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

/// Fails every Markdown message with a formatting rejection.
#[derive(Default)]
pub struct MarkdownRejectingSink {
    pub attempts: Mutex<Vec<MessageFormat>>,
}

#[async_trait::async_trait]
impl MessageSink for MarkdownRejectingSink {
    async fn check_reachable(&self) -> Result<(), SinkError> {
        Ok(())
    }

    async fn send(&self, message: &OutgoingMessage) -> Result<(), SinkError> {
        self.attempts.lock().unwrap().push(message.format);
        match message.format {
            MessageFormat::Markdown => Err(sink_error(SinkErrorKind::Formatting)),
            MessageFormat::Plain => Ok(()),
        }
    }
}

pub enum Page {
    Html(&'static str),
    Fail(FailureKind),
    Panic,
}

/// Serves one scripted page per call and cancels `stop` once the script is
/// exhausted, so the run loop exits at its next wait.
pub struct ScriptedFetcher {
    pages: Mutex<VecDeque<Page>>,
    calls: Mutex<Vec<Instant>>,
    stop: CancellationToken,
}

impl ScriptedFetcher {
    pub fn new(pages: Vec<Page>, stop: CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            pages: Mutex::new(pages.into()),
            calls: Mutex::new(Vec::new()),
            stop,
        })
    }

    pub fn calls(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        self.calls.lock().unwrap().push(Instant::now());
        let page = {
            let mut pages = self.pages.lock().unwrap();
            let page = pages.pop_front();
            if pages.is_empty() {
                self.stop.cancel();
            }
            page
        };

        match page {
            Some(Page::Html(html)) => Ok(FetchOutput {
                bytes: html.as_bytes().to_vec(),
                metadata: FetchMetadata {
                    final_url: url.to_string(),
                    redirect_count: 0,
                    content_type: Some("text/html; charset=utf-8".to_string()),
                    byte_len: html.len() as u64,
                },
            }),
            Some(Page::Fail(kind)) => Err(FetchError {
                kind,
                message: "scripted failure".to_string(),
            }),
            Some(Page::Panic) => panic!("scripted fetcher panic"),
            None => Err(FetchError {
                kind: FailureKind::Network,
                message: "script exhausted".to_string(),
            }),
        }
    }
}
