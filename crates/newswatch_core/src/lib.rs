//! Newswatch core: pure scheduler state machine and novelty classification.
mod effect;
mod item;
mod msg;
mod novelty;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, ExitStatus};
pub use item::{CandidateItem, DeliveryOutcome};
pub use msg::Msg;
pub use novelty::{classify, SeenSet};
pub use state::{AppState, Phase};
pub use update::update;
pub use view_model::{WatchStats, WatchView};
