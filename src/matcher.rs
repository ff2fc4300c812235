//! Matcher: score a query's tokens against the Index Store by
//! anchor-offset histogramming.

use std::collections::HashMap;

use fp_core::hash::HashRecord;

use crate::config::MatcherConfig;
use crate::error::StoreError;
use crate::store::Store;

/// Outcome of a query. `NoMatch` is a normal result, not an error.
#[derive(Clone, Debug, PartialEq)]
pub enum MatchOutcome {
    Matched { track_id: i64, score: u32 },
    NoMatch,
}

/// Score `query` (a fresh fingerprint's hash records) against `store` and
/// return the best match, or [`MatchOutcome::NoMatch`] if no track clears
/// `config.min_score`. Ties broken by smallest `track_id`.
pub fn match_query(
    store: &Store,
    query: &[HashRecord],
    config: &MatcherConfig,
) -> Result<MatchOutcome, StoreError> {
    if query.is_empty() {
        return Ok(MatchOutcome::NoMatch);
    }

    // Step 1: last occurrence wins when a token recurs in the query.
    let mut query_offset: HashMap<u32, i64> = HashMap::new();
    for record in query {
        query_offset.insert(record.token.0, record.anchor_offset_ms);
    }

    let tokens: Vec<u32> = query_offset.keys().copied().collect();
    let hits = store.lookup(&tokens)?;

    // Step 3: histogram counts keyed by (track_id, delta).
    let mut histogram: HashMap<(i64, i64), u32> = HashMap::new();
    for hit in &hits {
        let Some(&q_off) = query_offset.get(&hit.token) else {
            continue;
        };
        let delta = hit.anchor_offset_ms - q_off;
        *histogram.entry((hit.track_id, delta)).or_insert(0) += 1;
    }

    // Step 4: modal score per track.
    let mut best_per_track: HashMap<i64, u32> = HashMap::new();
    for ((track_id, _delta), count) in histogram {
        let entry = best_per_track.entry(track_id).or_insert(0);
        if count > *entry {
            *entry = count;
        }
    }

    // Step 5: pick the highest score, ties to the smallest track_id.
    let best = best_per_track
        .into_iter()
        .filter(|&(_, score)| score >= config.min_score)
        .min_by(|(id_a, score_a), (id_b, score_b)| {
            score_b.cmp(score_a).then(id_a.cmp(id_b))
        });

    Ok(match best {
        Some((track_id, score)) => MatchOutcome::Matched { track_id, score },
        None => MatchOutcome::NoMatch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Posting;
    use crate::track::TrackAttributes;
    use fp_core::hash::Token;

    fn attrs(name: &str) -> TrackAttributes {
        TrackAttributes {
            title: name.into(),
            artist: String::new(),
            album: String::new(),
            year: String::new(),
            source_locator: String::new(),
        }
    }

    fn record(token: u32, offset_ms: i64) -> HashRecord {
        HashRecord {
            token: Token(token),
            anchor_offset_ms: offset_ms,
        }
    }

    #[test]
    fn empty_query_is_no_match() {
        let store = Store::open_in_memory().unwrap();
        let result = match_query(&store, &[], &MatcherConfig::default()).unwrap();
        assert_eq!(result, MatchOutcome::NoMatch);
    }

    #[test]
    fn below_threshold_is_no_match() {
        let store = Store::open_in_memory().unwrap();
        let id = store.add_track(&attrs("A")).unwrap();
        store
            .add_postings(id, &[Posting { token: 1, track_id: id, anchor_offset_ms: 0 }])
            .unwrap();

        let query = vec![record(1, 0)];
        let result = match_query(&store, &query, &MatcherConfig::default()).unwrap();
        assert_eq!(result, MatchOutcome::NoMatch);
    }

    #[test]
    fn consistent_offset_wins_above_threshold() {
        let store = Store::open_in_memory().unwrap();
        let id = store.add_track(&attrs("A")).unwrap();
        let postings: Vec<Posting> = (0..6)
            .map(|i| Posting { token: i, track_id: id, anchor_offset_ms: 12_000 + i as i64 })
            .collect();
        store.add_postings(id, &postings).unwrap();

        // Query offsets chosen so every token's delta is the same (12000),
        // simulating a clip starting 12s into the track.
        let query: Vec<HashRecord> = (0..6).map(|i| record(i, i as i64)).collect();
        let result = match_query(&store, &query, &MatcherConfig::default()).unwrap();
        assert_eq!(result, MatchOutcome::Matched { track_id: id, score: 6 });
    }

    #[test]
    fn tie_breaks_to_smallest_track_id() {
        let store = Store::open_in_memory().unwrap();
        let id_a = store.add_track(&attrs("A")).unwrap();
        let id_b = store.add_track(&attrs("B")).unwrap();
        let postings_a: Vec<Posting> = (0..6)
            .map(|i| Posting { token: i, track_id: id_a, anchor_offset_ms: i as i64 })
            .collect();
        let postings_b: Vec<Posting> = (0..6)
            .map(|i| Posting { token: i, track_id: id_b, anchor_offset_ms: i as i64 })
            .collect();
        store.add_postings(id_a, &postings_a).unwrap();
        store.add_postings(id_b, &postings_b).unwrap();

        let query: Vec<HashRecord> = (0..6).map(|i| record(i, i as i64)).collect();
        let result = match_query(&store, &query, &MatcherConfig::default()).unwrap();
        assert_eq!(result, MatchOutcome::Matched { track_id: id_a.min(id_b), score: 6 });
    }

    #[test]
    fn unrelated_tokens_contribute_uniform_noise_not_a_spike() {
        let store = Store::open_in_memory().unwrap();
        let id = store.add_track(&attrs("A")).unwrap();
        // Scatter postings across many distinct deltas: no single delta
        // should accumulate enough count to clear the default threshold.
        let postings: Vec<Posting> = (0..4)
            .map(|i| Posting { token: i, track_id: id, anchor_offset_ms: i as i64 * 1000 })
            .collect();
        store.add_postings(id, &postings).unwrap();

        let query: Vec<HashRecord> = (0..4).map(|i| record(i, 0)).collect();
        let result = match_query(&store, &query, &MatcherConfig::default()).unwrap();
        assert_eq!(result, MatchOutcome::NoMatch);
    }
}
