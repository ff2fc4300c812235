//! Decimation, framing, windowing and FFT.
//!
//! Samples stay in the PCM's native `i16` magnitude scale (not normalized to
//! `[-1.0, 1.0]`) throughout: the peak-amplitude threshold in
//! [`crate::peaks`] is tuned against that scale, matching the reference
//! implementation this was distilled from.

use realfft::RealFftPlanner;
use std::cell::RefCell;

use crate::types::{Spectrogram, DECIMATION_FACTOR, FRAME_SIZE, HOP_SIZE, NUM_BINS};

thread_local! {
    static FFT_PLANNER: RefCell<RealFftPlanner<f32>> = RefCell::new(RealFftPlanner::new());
}

/// Symmetric Hamming window of the given length: `w[n] = 0.54 - 0.46*cos(2*pi*n/(N-1))`.
fn hamming_window(size: usize) -> Vec<f32> {
    if size <= 1 {
        return vec![1.0; size];
    }
    (0..size)
        .map(|i| 0.54 - 0.46 * (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
        .collect()
}

/// Windowed-sinc low-pass kernel, linear phase, for anti-alias filtering
/// before decimation. `cutoff` is expressed as a fraction of the Nyquist
/// rate (0.0, 1.0).
fn lowpass_fir_kernel(num_taps: usize, cutoff: f64) -> Vec<f64> {
    let m = (num_taps - 1) as f64;
    let mut kernel: Vec<f64> = (0..num_taps)
        .map(|n| {
            let x = n as f64 - m / 2.0;
            let sinc = if x.abs() < 1e-9 {
                cutoff
            } else {
                (std::f64::consts::PI * cutoff * x).sin() / (std::f64::consts::PI * x)
            };
            // Hamming window on the kernel itself, keeping the filter's
            // phase response linear and its transition band well-behaved.
            let w = 0.54 - 0.46 * (2.0 * std::f64::consts::PI * n as f64 / m).cos();
            sinc * w
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    if sum.abs() > 1e-12 {
        for k in kernel.iter_mut() {
            *k /= sum;
        }
    }
    kernel
}

/// Low-pass filter then keep every `factor`-th sample — `resample_poly(1, factor)`
/// semantics for an integer decimation factor.
fn decimate(samples: &[i16], factor: usize) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    let num_taps = 8 * factor + 1;
    let kernel = lowpass_fir_kernel(num_taps, 1.0 / factor as f64);
    let half = num_taps / 2;

    let filtered: Vec<f64> = (0..samples.len())
        .map(|i| {
            let mut acc = 0.0f64;
            for (k, &coeff) in kernel.iter().enumerate() {
                let idx = i as isize + k as isize - half as isize;
                if idx >= 0 && (idx as usize) < samples.len() {
                    acc += coeff * samples[idx as usize] as f64;
                }
            }
            acc
        })
        .collect();

    filtered
        .into_iter()
        .step_by(factor)
        .map(|v| v as f32)
        .collect()
}

/// Compute the magnitude spectrogram of a decimated signal: overlapping
/// `FRAME_SIZE`-sample Hamming-windowed frames, hop `HOP_SIZE`, keeping the
/// first `NUM_BINS` real FFT bins. Returns an empty spectrogram (not an
/// error) when the decimated signal is shorter than one frame.
pub fn compute_spectrogram(decimated: &[f32]) -> Spectrogram {
    if decimated.len() < FRAME_SIZE {
        return Spectrogram::default();
    }

    let fft = FFT_PLANNER.with(|p| p.borrow_mut().plan_fft_forward(FRAME_SIZE));
    let window = hamming_window(FRAME_SIZE);

    let mut input = fft.make_input_vec();
    let mut spectrum = fft.make_output_vec();
    let mut frames = Vec::new();

    let mut pos = 0;
    while pos + FRAME_SIZE <= decimated.len() {
        for (inp, (&s, &w)) in input
            .iter_mut()
            .zip(decimated[pos..pos + FRAME_SIZE].iter().zip(window.iter()))
        {
            *inp = s * w;
        }

        fft.process(&mut input, &mut spectrum)
            .expect("fixed-size FFT plan cannot fail on correctly-sized buffers");

        let magnitudes: Vec<f32> = spectrum.iter().take(NUM_BINS).map(|c| c.norm()).collect();
        frames.push(magnitudes);

        pos += HOP_SIZE;
    }

    Spectrogram { frames }
}

/// Run decimation then framing/windowing/FFT on a native-rate `i16` signal.
pub fn spectrogram_from_pcm(samples: &[i16]) -> Spectrogram {
    let decimated = decimate(samples, DECIMATION_FACTOR);
    compute_spectrogram(&decimated)
}
