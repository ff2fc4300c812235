//! `Engine`: the facade external callers use to ingest and query tracks,
//! wiring [`fp_core`]'s signal front end to the [`Store`] and [`matcher`].

use std::path::Path;

use fp_core::types::Pcm;

use crate::config::MatcherConfig;
use crate::error::StoreError;
use crate::matcher::{self, MatchOutcome};
use crate::store::{Posting, Store};
use crate::track::TrackAttributes;

pub struct Engine {
    store: Store,
    matcher_config: MatcherConfig,
}

impl Engine {
    pub fn open(db_path: impl AsRef<Path>) -> Result<Engine, StoreError> {
        Ok(Engine {
            store: Store::open(db_path)?,
            matcher_config: MatcherConfig::default(),
        })
    }

    pub fn open_in_memory() -> Result<Engine, StoreError> {
        Ok(Engine {
            store: Store::open_in_memory()?,
            matcher_config: MatcherConfig::default(),
        })
    }

    pub fn with_matcher_config(mut self, config: MatcherConfig) -> Self {
        self.matcher_config = config;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Fingerprint `pcm` and insert it as a new track under `attributes`.
    /// Tracks may legitimately have zero postings (silent or too-short
    /// input) — that is not an error.
    pub fn ingest(&self, pcm: &Pcm, attributes: &TrackAttributes) -> Result<i64, StoreError> {
        let track_id = self.store.add_track(attributes)?;
        let hashes = fp_core::fingerprint(pcm);
        let hash_count = hashes.len();
        let postings: Vec<Posting> = hashes
            .into_iter()
            .map(|h| Posting {
                token: h.token.0,
                track_id,
                anchor_offset_ms: h.anchor_offset_ms,
            })
            .collect();
        self.store.add_postings(track_id, &postings)?;
        log::info!("ingested track {track_id} ({hash_count} hashes)");
        Ok(track_id)
    }

    /// Fingerprint `pcm` and match it against the catalog.
    pub fn query(&self, pcm: &Pcm) -> Result<MatchOutcome, StoreError> {
        let hashes = fp_core::fingerprint(pcm);
        let outcome = matcher::match_query(&self.store, &hashes, &self.matcher_config)?;
        log::debug!("query over {} hashes resolved to {outcome:?}", hashes.len());
        Ok(outcome)
    }
}
