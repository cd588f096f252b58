mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{sink_error, MarkdownRejectingSink, RecordingSink};
use newswatch_core::{CandidateItem, DeliveryOutcome};
use newswatch_engine::{MessageFormat, Notifier, SinkErrorKind};
use pretty_assertions::assert_eq;

fn item(slug: &str) -> CandidateItem {
    CandidateItem::new(format!("Story {slug}"), format!("https://news.example/{slug}"))
}

#[tokio::test]
async fn markdown_success_sends_once() {
    let sink = RecordingSink::reachable();
    let mut notifier = Notifier::new(sink.clone(), Duration::ZERO);

    assert_eq!(notifier.notify(&item("a")).await, DeliveryOutcome::Delivered);

    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].format, MessageFormat::Markdown);
    assert!(sent[0].text.contains("Story a"));
    assert!(sent[0].text.contains("https://news.example/a"));
}

#[tokio::test]
async fn formatting_rejection_falls_back_to_plain_once() {
    let sink = Arc::new(MarkdownRejectingSink::default());
    let mut notifier = Notifier::new(sink.clone(), Duration::ZERO);

    assert_eq!(notifier.notify(&item("a")).await, DeliveryOutcome::Delivered);
    assert_eq!(
        *sink.attempts.lock().unwrap(),
        vec![MessageFormat::Markdown, MessageFormat::Plain]
    );
}

#[tokio::test]
async fn failed_fallback_is_final() {
    let sink = RecordingSink::with_replies(vec![
        Err(sink_error(SinkErrorKind::Formatting)),
        Err(sink_error(SinkErrorKind::Formatting)),
    ]);
    let mut notifier = Notifier::new(sink.clone(), Duration::ZERO);

    assert_eq!(notifier.notify(&item("a")).await, DeliveryOutcome::Failed);

    let formats: Vec<MessageFormat> = sink.sent().iter().map(|m| m.format).collect();
    assert_eq!(formats, vec![MessageFormat::Markdown, MessageFormat::Plain]);
}

#[tokio::test]
async fn non_formatting_failure_skips_fallback() {
    for kind in [
        SinkErrorKind::Unauthorized,
        SinkErrorKind::Network,
        SinkErrorKind::RateLimited {
            retry_after_secs: Some(5),
        },
    ] {
        let sink = RecordingSink::with_replies(vec![Err(sink_error(kind.clone()))]);
        let mut notifier = Notifier::new(sink.clone(), Duration::ZERO);

        assert_eq!(
            notifier.notify(&item("a")).await,
            DeliveryOutcome::Failed,
            "{kind}"
        );
        assert_eq!(sink.sent().len(), 1, "{kind}");
    }
}

#[tokio::test(start_paused = true)]
async fn consecutive_deliveries_are_paced() {
    let sink = RecordingSink::with_replies(vec![
        Ok(()),
        Err(sink_error(SinkErrorKind::Network)),
        Ok(()),
    ]);
    let pacing = Duration::from_secs(1);
    let mut notifier = Notifier::new(sink.clone(), pacing);

    notifier.notify(&item("a")).await;
    notifier.notify(&item("b")).await;
    notifier.notify(&item("c")).await;

    let at = sink.sent_at();
    assert_eq!(at.len(), 3);
    assert!(at[1] - at[0] >= pacing);
    assert!(at[2] - at[1] >= pacing);
}

#[tokio::test(start_paused = true)]
async fn first_delivery_is_not_delayed() {
    let sink = RecordingSink::reachable();
    let mut notifier = Notifier::new(sink.clone(), Duration::from_secs(30));
    let start = tokio::time::Instant::now();

    notifier.notify(&item("a")).await;

    assert!(sink.sent_at()[0] - start < Duration::from_secs(30));
}
