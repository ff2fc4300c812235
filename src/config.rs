use serde::{Deserialize, Serialize};

/// Matcher tuning, exposed as runtime configuration rather than a constant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum modal score `S` a track must clear to be reported as a match.
    pub min_score: u32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig { min_score: 5 }
    }
}
