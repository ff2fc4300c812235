//! Plain data types shared across the pipeline. Peaks and constellations own
//! their data outright; nothing here borrows from the decoded PCM buffer.

use serde::{Deserialize, Serialize};

/// Native sample rate the core requires after loading, in Hz.
pub const SOURCE_SAMPLE_RATE: u32 = 44_100;
/// Decimation factor applied before framing.
pub const DECIMATION_FACTOR: usize = 4;
/// Effective sample rate of the decimated signal, in Hz.
pub const EFFECTIVE_SAMPLE_RATE: u32 = SOURCE_SAMPLE_RATE / DECIMATION_FACTOR as u32;
/// Frame length, in decimated samples.
pub const FRAME_SIZE: usize = 1024;
/// Frame hop, in decimated samples.
pub const HOP_SIZE: usize = 512;
/// Number of real FFT bins retained (N/2).
pub const NUM_BINS: usize = FRAME_SIZE / 2;
/// Band edges (in bin indices) used by the peak picker. Six half-open bands.
pub const BAND_EDGES: [usize; 7] = [0, 10, 20, 40, 80, 160, 511];
/// Peak amplitude threshold; a band's argmax must exceed this, strictly.
pub const PEAK_THRESHOLD: f32 = 100.0;

/// A decoded, mono PCM signal at its native sample rate.
#[derive(Clone, Debug)]
pub struct Pcm {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl Pcm {
    /// Build a mono PCM signal directly from already-decoded samples.
    pub fn from_i16_mono(samples: Vec<i16>, sample_rate: u32) -> Self {
        Pcm {
            samples,
            sample_rate,
        }
    }

    /// Build from floating-point samples in `[-1.0, 1.0]`, the domain most
    /// codec backends produce, scaling into the `i16` domain the rest of
    /// the pipeline (and the token threshold constants) assume.
    pub fn from_f32_mono(samples: &[f32], sample_rate: u32) -> Self {
        let scaled = samples
            .iter()
            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            .collect();
        Pcm {
            samples: scaled,
            sample_rate,
        }
    }
}

/// A spectrogram cell's physical coordinates and the peak's magnitude there.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub time_s: f64,
    pub freq_hz: f64,
    pub magnitude: f32,
}

/// An ordered sequence of peaks, sorted by non-decreasing time (peaks within
/// one frame appear in band order). Only ever constructed by
/// [`crate::peaks::pick_peaks`], which upholds that ordering by construction.
#[derive(Clone, Debug, Default)]
pub struct Constellation(pub Vec<Peak>);

impl Constellation {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn peaks(&self) -> &[Peak] {
        &self.0
    }
}

/// A single (frame, bin) spectrogram cell.
#[derive(Clone, Copy, Debug)]
pub struct Cell {
    pub frame: usize,
    pub bin: usize,
    pub magnitude: f32,
}

/// Magnitude spectrogram: one row of `NUM_BINS` magnitudes per frame.
#[derive(Clone, Debug, Default)]
pub struct Spectrogram {
    pub frames: Vec<Vec<f32>>,
}

impl Spectrogram {
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }
}
