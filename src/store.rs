//! Index Store: a SQLite-backed catalog of tracks plus an
//! append-only, token-indexed posting list.
//!
//! Grounded on the connection-pool-plus-migration pattern used elsewhere in
//! the pack for local SQLite caches, stripped of any GUI-toolkit coupling:
//! a plain [`r2d2::Pool`] of [`rusqlite`] connections, one pooled connection
//! borrowed per operation and returned to the pool on drop.

use std::path::Path;

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params_from_iter;

use crate::error::StoreError;
use crate::track::{Track, TrackAttributes};

/// Maximum number of `?` placeholders per `lookup` query, safely under
/// SQLite's default `SQLITE_MAX_VARIABLE_NUMBER` (999).
const LOOKUP_CHUNK_SIZE: usize = 500;

/// One `(token, track_id, anchor_offset_ms)` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Posting {
    pub token: u32,
    pub track_id: i64,
    pub anchor_offset_ms: i64,
}

/// A posting returned by [`Store::lookup`]: which track, at what offset,
/// matched which of the query's tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LookupHit {
    pub track_id: i64,
    pub anchor_offset_ms: i64,
    pub token: u32,
}

/// A handle to the persistent catalog. Cheap to clone — clones share the
/// same underlying connection pool.
#[derive(Clone)]
pub struct Store {
    pool: r2d2::Pool<SqliteConnectionManager>,
}

impl Store {
    /// Open (creating if absent) the database file at `path` and ensure its
    /// schema exists. Idempotent.
    pub fn open(path: impl AsRef<Path>) -> Result<Store, StoreError> {
        let manager = SqliteConnectionManager::file(path.as_ref())
            .with_init(|conn| conn.execute_batch("pragma journal_mode=WAL; pragma foreign_keys=on;"));
        let pool = r2d2::Pool::new(manager)?;
        let store = Store { pool };
        store.initialize()?;
        log::info!("opened catalog at {}", path.as_ref().display());
        Ok(store)
    }

    /// Open a private in-memory database, for tests and short-lived
    /// processes. Capped to a single pooled connection so every borrower
    /// sees the same in-memory database (SQLite's `:memory:` databases are
    /// otherwise per-connection).
    pub fn open_in_memory() -> Result<Store, StoreError> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|conn| conn.execute_batch("pragma foreign_keys=on;"));
        let pool = r2d2::Pool::builder().max_size(1).build(manager)?;
        let store = Store { pool };
        store.initialize()?;
        Ok(store)
    }

    /// Create the `tracks`, `postings`, and `state` relations and the
    /// token index, if they don't already exist.
    pub fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute_batch(
            "begin;
            create table if not exists tracks (
                id integer primary key autoincrement,
                title text not null,
                artist text not null,
                album text not null,
                year text not null,
                source_locator text not null
            );
            create table if not exists postings (
                token integer not null,
                track_id integer not null references tracks(id),
                anchor_offset_ms integer not null
            );
            create index if not exists idx_postings_token on postings (token);
            create table if not exists state (
                key text primary key,
                value text not null
            );
            commit;",
        )?;
        Ok(())
    }

    /// Insert a track row, returning its generated id.
    pub fn add_track(&self, attributes: &TrackAttributes) -> Result<i64, StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "insert into tracks (title, artist, album, year, source_locator) values (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                attributes.title,
                attributes.artist,
                attributes.album,
                attributes.year,
                attributes.source_locator,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Bulk-insert postings for one track inside a single transaction: a
    /// reader opening a fresh connection either sees every row this call
    /// inserts, or none.
    pub fn add_postings(&self, track_id: i64, postings: &[Posting]) -> Result<(), StoreError> {
        if postings.is_empty() {
            log::warn!("track {track_id} has zero postings");
            return Ok(());
        }
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "insert into postings (token, track_id, anchor_offset_ms) values (?1, ?2, ?3)",
            )?;
            for posting in postings {
                debug_assert_eq!(posting.track_id, track_id, "all postings in one call must belong to `track_id`");
                stmt.execute(rusqlite::params![
                    posting.token,
                    posting.track_id,
                    posting.anchor_offset_ms,
                ])?;
            }
        }
        tx.commit()?;
        log::debug!("inserted {} postings for track {track_id}", postings.len());
        Ok(())
    }

    /// Return every posting whose token is in `tokens`.
    /// Order is unspecified. Chunks the query to stay under SQLite's
    /// parameter-count limit.
    pub fn lookup(&self, tokens: &[u32]) -> Result<Vec<LookupHit>, StoreError> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.pool.get()?;
        let mut hits = Vec::new();

        for chunk in tokens.chunks(LOOKUP_CHUNK_SIZE) {
            let placeholders = chunk.iter().map(|_| "?").collect::<Vec<_>>().join(",");
            let sql = format!(
                "select track_id, anchor_offset_ms, token from postings where token in ({placeholders})"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                Ok(LookupHit {
                    track_id: row.get(0)?,
                    anchor_offset_ms: row.get(1)?,
                    token: row.get(2)?,
                })
            })?;
            for row in rows {
                hits.push(row?);
            }
        }

        Ok(hits)
    }

    /// Fetch a track's attributes by id.
    pub fn get_track(&self, id: i64) -> Result<Option<Track>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "select title, artist, album, year, source_locator from tracks where id = ?1",
        )?;
        let mut rows = stmt.query(rusqlite::params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(Track {
                id,
                attributes: TrackAttributes {
                    title: row.get(0)?,
                    artist: row.get(1)?,
                    album: row.get(2)?,
                    year: row.get(3)?,
                    source_locator: row.get(4)?,
                },
            })),
            None => Ok(None),
        }
    }
}
