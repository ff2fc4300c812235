pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod store;
pub mod track;

pub use config::MatcherConfig;
pub use engine::Engine;
pub use error::StoreError;
pub use matcher::MatchOutcome;
pub use store::Store;
pub use track::{Track, TrackAttributes};
