mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{sink_error, Page, RecordingSink, ScriptedFetcher};
use newswatch_core::ExitStatus;
use newswatch_engine::{
    ArticleExtractor, FailureKind, Notifier, SinkErrorKind, SourceBase, WatchEngine,
};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

const SOURCE: &str = "https://news.example/";
const PERIOD: Duration = Duration::from_secs(300);
const PACING: Duration = Duration::from_secs(1);

const PAGE_ABC: &str = r#"
<html><body>
    <article><a href="/a"><h2>Story A</h2></a></article>
    <article><a href="/b"><h2>Story B</h2></a></article>
    <article><a href="/c"><h2>Story C</h2></a></article>
</body></html>
"#;

const PAGE_ABCD: &str = r#"
<html><body>
    <article><a href="/d"><h2>Story D</h2></a></article>
    <article><a href="/a"><h2>Story A</h2></a></article>
    <article><a href="/b"><h2>Story B (updated)</h2></a></article>
    <article><a href="/c"><h2>Story C</h2></a></article>
</body></html>
"#;

const PAGE_EMPTY: &str = "<html><body><p>Maintenance</p></body></html>";

const PAGE_A: &str = r#"<article><a href="/a"><h2>Story A</h2></a></article>"#;

fn engine(fetcher: Arc<ScriptedFetcher>, sink: Arc<RecordingSink>) -> WatchEngine {
    newswatch_logging::initialize_for_tests();
    let base = SourceBase::parse(SOURCE).unwrap();
    WatchEngine::new(
        SOURCE,
        PERIOD,
        fetcher,
        Box::new(ArticleExtractor::new(base).unwrap()),
        Notifier::new(sink, PACING),
    )
}

fn sent_links(sink: &RecordingSink) -> Vec<String> {
    sink.sent()
        .iter()
        .filter_map(|message| message.text.lines().last().map(str::to_string))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn baseline_then_only_the_new_article_is_sent() {
    let stop = CancellationToken::new();
    let fetcher = ScriptedFetcher::new(vec![Page::Html(PAGE_ABC), Page::Html(PAGE_ABCD)], stop.clone());
    let sink = RecordingSink::reachable();

    let status = engine(fetcher.clone(), sink.clone()).run(stop).await;

    assert_eq!(status, ExitStatus::Clean);
    assert_eq!(fetcher.calls().len(), 2);
    assert_eq!(sent_links(&sink), vec!["https://news.example/d".to_string()]);
    assert!(sink.sent()[0].text.contains("Story D"));
}

#[tokio::test(start_paused = true)]
async fn failed_cycles_wait_the_full_period_and_continue() {
    let stop = CancellationToken::new();
    let fetcher = ScriptedFetcher::new(
        vec![
            Page::Fail(FailureKind::HttpStatus(503)),
            Page::Fail(FailureKind::Timeout),
            Page::Fail(FailureKind::Network),
        ],
        stop.clone(),
    );
    let sink = RecordingSink::reachable();

    let status = engine(fetcher.clone(), sink.clone()).run(stop).await;

    assert_eq!(status, ExitStatus::Clean);
    let calls = fetcher.calls();
    assert_eq!(calls.len(), 3);
    for pair in calls.windows(2) {
        assert!(pair[1] - pair[0] >= PERIOD);
    }
    assert!(sink.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn panicking_cycle_is_isolated() {
    let stop = CancellationToken::new();
    let fetcher = ScriptedFetcher::new(
        vec![Page::Html(PAGE_ABC), Page::Panic, Page::Html(PAGE_ABCD)],
        stop.clone(),
    );
    let sink = RecordingSink::reachable();

    let status = engine(fetcher.clone(), sink.clone()).run(stop).await;

    assert_eq!(status, ExitStatus::Clean);
    let calls = fetcher.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[2] - calls[1] >= PERIOD);
    assert_eq!(sent_links(&sink), vec!["https://news.example/d".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn failed_first_cycle_still_establishes_the_baseline_phase() {
    let stop = CancellationToken::new();
    let fetcher = ScriptedFetcher::new(
        vec![Page::Fail(FailureKind::Timeout), Page::Html(PAGE_ABC)],
        stop.clone(),
    );
    let sink = RecordingSink::reachable();

    engine(fetcher.clone(), sink.clone()).run(stop).await;

    assert_eq!(
        sent_links(&sink),
        vec![
            "https://news.example/a".to_string(),
            "https://news.example/b".to_string(),
            "https://news.example/c".to_string(),
        ]
    );
    let sent_at = sink.sent_at();
    assert!(sent_at[1] - sent_at[0] >= PACING);
    assert!(sent_at[2] - sent_at[1] >= PACING);
}

#[tokio::test(start_paused = true)]
async fn failed_delivery_is_not_retried_on_later_cycles() {
    let stop = CancellationToken::new();
    let fetcher = ScriptedFetcher::new(
        vec![Page::Html(PAGE_EMPTY), Page::Html(PAGE_A), Page::Html(PAGE_A)],
        stop.clone(),
    );
    let sink = RecordingSink::with_replies(vec![Err(sink_error(SinkErrorKind::Network))]);

    engine(fetcher.clone(), sink.clone()).run(stop).await;

    assert_eq!(fetcher.calls().len(), 3);
    assert_eq!(sent_links(&sink), vec!["https://news.example/a".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn unreachable_sink_stops_before_polling() {
    let stop = CancellationToken::new();
    let fetcher = ScriptedFetcher::new(vec![Page::Html(PAGE_ABC)], stop.clone());
    let sink = RecordingSink::unreachable();

    let status = engine(fetcher.clone(), sink.clone()).run(stop).await;

    assert_eq!(status, ExitStatus::SinkUnreachable);
    assert!(fetcher.calls().is_empty());
    assert!(sink.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn interrupt_before_start_exits_after_first_cycle() {
    let stop = CancellationToken::new();
    stop.cancel();
    let fetcher = ScriptedFetcher::new(vec![Page::Html(PAGE_ABC), Page::Html(PAGE_ABCD)], stop.clone());
    let sink = RecordingSink::reachable();

    let status = engine(fetcher.clone(), sink.clone()).run(stop).await;

    assert_eq!(status, ExitStatus::Clean);
    assert_eq!(fetcher.calls().len(), 1);
    assert!(sink.sent().is_empty());
}
