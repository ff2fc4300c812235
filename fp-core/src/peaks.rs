//! Peak picking: per-frame, per-band argmax with amplitude gating.

use crate::types::{
    Constellation, Peak, Spectrogram, BAND_EDGES, EFFECTIVE_SAMPLE_RATE, FRAME_SIZE,
    HOP_SIZE, PEAK_THRESHOLD,
};

/// Select the six fixed-band maxima of every frame in `spectrogram`, emitting
/// a peak only when that maximum strictly exceeds [`PEAK_THRESHOLD`]. Peaks
/// come out in (frame ascending, band ascending) order, which is also
/// (time ascending) order — the ordering [`Constellation`] requires.
pub fn pick_peaks(spectrogram: &Spectrogram) -> Constellation {
    let mut peaks = Vec::new();

    for (frame_idx, row) in spectrogram.frames.iter().enumerate() {
        for band in BAND_EDGES.windows(2) {
            let (start, end) = (band[0], band[1]);
            if start >= row.len() {
                continue;
            }
            let end = end.min(row.len());

            let (bin, &magnitude) = row[start..end]
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
                .map(|(i, m)| (start + i, m))
                .unwrap();

            if magnitude > PEAK_THRESHOLD {
                let time_s = (frame_idx * HOP_SIZE) as f64 / EFFECTIVE_SAMPLE_RATE as f64;
                let freq_hz = bin as f64 * EFFECTIVE_SAMPLE_RATE as f64 / FRAME_SIZE as f64;
                peaks.push(Peak {
                    time_s,
                    freq_hz,
                    magnitude,
                });
            }
        }
    }

    Constellation(peaks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NUM_BINS;

    fn row_with_single_peak(bin: usize, magnitude: f32) -> Vec<f32> {
        let mut row = vec![0.0f32; NUM_BINS];
        row[bin] = magnitude;
        row
    }

    #[test]
    fn below_threshold_emits_nothing() {
        let spectrogram = Spectrogram {
            frames: vec![row_with_single_peak(15, 100.0)],
        };
        let constellation = pick_peaks(&spectrogram);
        assert!(constellation.is_empty(), "magnitude == threshold must not emit (strict >)");
    }

    #[test]
    fn above_threshold_emits_one_peak_per_band_hit() {
        let spectrogram = Spectrogram {
            frames: vec![row_with_single_peak(15, 100.1)],
        };
        let constellation = pick_peaks(&spectrogram);
        assert_eq!(constellation.len(), 1);
        assert_eq!(constellation.peaks()[0].freq_hz, 15.0 * EFFECTIVE_SAMPLE_RATE as f64 / FRAME_SIZE as f64);
    }

    #[test]
    fn emits_up_to_six_peaks_one_per_band() {
        let mut row = vec![0.0f32; NUM_BINS];
        // One strong bin in every band.
        for band in BAND_EDGES.windows(2) {
            row[band[0]] = 500.0;
        }
        let spectrogram = Spectrogram { frames: vec![row] };
        let constellation = pick_peaks(&spectrogram);
        assert_eq!(constellation.len(), BAND_EDGES.len() - 1);
    }

    #[test]
    fn ties_within_a_band_resolve_to_lowest_bin() {
        let mut row = vec![0.0f32; NUM_BINS];
        // Band [20, 40): tie between bin 25 and bin 30.
        row[25] = 500.0;
        row[30] = 500.0;
        let spectrogram = Spectrogram { frames: vec![row] };
        let constellation = pick_peaks(&spectrogram);
        let expected_freq = 25.0 * EFFECTIVE_SAMPLE_RATE as f64 / FRAME_SIZE as f64;
        let found = constellation
            .peaks()
            .iter()
            .find(|p| (p.freq_hz - expected_freq).abs() < 1e-6);
        assert!(found.is_some(), "expected tie resolved to bin 25, the lower index");
    }

    #[test]
    fn peaks_are_time_ordered_across_frames() {
        let spectrogram = Spectrogram {
            frames: vec![row_with_single_peak(15, 200.0), row_with_single_peak(15, 200.0)],
        };
        let constellation = pick_peaks(&spectrogram);
        let times: Vec<f64> = constellation.peaks().iter().map(|p| p.time_s).collect();
        let mut sorted = times.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(times, sorted);
    }
}
