//! Newswatch engine: source fetching, article extraction, delivery and the
//! effect runner that drives the core state machine.
mod decode;
mod engine;
mod extract;
mod fetch;
mod links;
mod notify;
mod telegram;
mod types;

pub use decode::{decode_document, DecodeError, DecodedDocument};
pub use engine::{WatchEngine, WatchSettings};
pub use extract::{
    default_strategies, ArticleExtractor, ClassPatternStrategy, ContainerStrategy, ExtractError,
    Extractor, TagStrategy,
};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use links::SourceBase;
pub use notify::{MessageFormat, MessageSink, Notifier, OutgoingMessage};
pub use telegram::{TelegramSettings, TelegramSink};
pub use types::{
    CycleError, EngineError, FailureKind, FetchError, FetchMetadata, FetchOutput, SinkError,
    SinkErrorKind,
};
