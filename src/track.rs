use serde::{Deserialize, Serialize};

/// Opaque catalog attributes. The matching engine never reads these —
/// it operates purely on track ids.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackAttributes {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub source_locator: String,
}

/// A catalog entry as returned by [`crate::store::Store::get_track`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub attributes: TrackAttributes,
}
