pub mod error;
pub mod hash;
pub mod loader;
pub mod peaks;
pub mod spectrogram;
pub mod types;

pub use error::FpError;
pub use hash::{generate_hashes, HashRecord, Token};
pub use loader::load_audio;
pub use peaks::pick_peaks;
pub use spectrogram::spectrogram_from_pcm;
pub use types::{Constellation, Peak, Pcm};

/// Run the full front end — loader output through hashing — on a decoded
/// PCM signal. Empty/too-short inputs yield an empty `Vec`, not an error.
pub fn fingerprint(pcm: &Pcm) -> Vec<HashRecord> {
    let spectrogram = spectrogram::spectrogram_from_pcm(&pcm.samples);
    let constellation = peaks::pick_peaks(&spectrogram);
    hash::generate_hashes(&constellation)
}
