//! PCM loader: decode a waveform container to mono `i16` PCM at the
//! container's native rate. No resampling happens here — [`crate::spectrogram`]
//! owns the decimation to the core's effective rate.

use std::io::Cursor;

use crate::error::FpError;
use crate::types::Pcm;

/// Decode raw container bytes, sniffing the format by magic bytes — WAV
/// (`hound`) and FLAC (`claxon`) as the common-case fast paths, falling back
/// to `symphonia` for everything else it supports (MP3, Ogg/Vorbis, AAC).
/// Returns [`FpError::EmptyInput`] when the container holds zero frames.
pub fn load_audio(bytes: &[u8]) -> Result<Pcm, FpError> {
    if bytes.len() < 4 {
        return Err(FpError::Decode("file too small to contain a header".into()));
    }

    let pcm = match &bytes[0..4] {
        b"RIFF" => load_wav(bytes)?,
        b"fLaC" => load_flac(bytes)?,
        _ => {
            log::debug!("no WAV/FLAC magic bytes, falling back to symphonia");
            load_via_symphonia(bytes)?
        }
    };

    if pcm.samples.is_empty() {
        log::warn!("decoded container has zero samples");
        return Err(FpError::EmptyInput);
    }
    Ok(pcm)
}

fn mix_to_mono_i16(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| (frame.iter().map(|&s| s as i64).sum::<i64>() / channels as i64) as i16)
        .collect()
}

fn mix_to_mono_f32(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn load_wav(bytes: &[u8]) -> Result<Pcm, FpError> {
    let cursor = Cursor::new(bytes);
    let reader = hound::WavReader::new(cursor)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    match spec.sample_format {
        hound::SampleFormat::Int if spec.bits_per_sample == 16 => {
            let samples: Vec<i16> = reader
                .into_samples::<i16>()
                .collect::<Result<Vec<_>, _>>()?;
            let mono = mix_to_mono_i16(&samples, channels);
            Ok(Pcm::from_i16_mono(mono, spec.sample_rate))
        }
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            let samples: Vec<f32> = reader
                .into_samples::<i32>()
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .map(|s| s as f32 / max_val)
                .collect();
            let mono = mix_to_mono_f32(&samples, channels);
            Ok(Pcm::from_f32_mono(&mono, spec.sample_rate))
        }
        hound::SampleFormat::Float => {
            let samples: Vec<f32> = reader
                .into_samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?;
            let mono = mix_to_mono_f32(&samples, channels);
            Ok(Pcm::from_f32_mono(&mono, spec.sample_rate))
        }
    }
}

fn load_flac(bytes: &[u8]) -> Result<Pcm, FpError> {
    let cursor = Cursor::new(bytes);
    let mut reader = claxon::FlacReader::new(cursor)?;
    let info = reader.streaminfo();
    let channels = info.channels as usize;
    let max_val = (1i64 << (info.bits_per_sample - 1)) as f32;

    let samples: Vec<f32> = reader
        .samples()
        .map(|s| s.map(|v| v as f32 / max_val))
        .collect::<Result<Vec<_>, _>>()?;
    let mono = mix_to_mono_f32(&samples, channels);
    Ok(Pcm::from_f32_mono(&mono, info.sample_rate))
}

fn load_via_symphonia(bytes: &[u8]) -> Result<Pcm, FpError> {
    use symphonia::core::audio::Signal;
    use symphonia::core::codecs::DECODER_TYPE_NULL;
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;

    let source = Cursor::new(bytes.to_vec());
    let mss = MediaSourceStream::new(Box::new(source), MediaSourceStreamOptions::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| FpError::Decode(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != DECODER_TYPE_NULL)
        .ok_or_else(|| FpError::Decode("no decodable track found".into()))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| FpError::Decode("unknown sample rate".into()))?;
    let channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &Default::default())
        .map_err(|e| FpError::Decode(e.to_string()))?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(_)) => break,
            Err(e) => return Err(FpError::Decode(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }
        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let mut buf =
                    symphonia::core::audio::SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buf.samples());
            }
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(FpError::Decode(e.to_string())),
        }
    }

    let mono = mix_to_mono_f32(&samples, channels.max(1));
    Ok(Pcm::from_f32_mono(&mono, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_small_is_a_decode_error() {
        let err = load_audio(&[0u8; 2]).unwrap_err();
        assert!(matches!(err, FpError::Decode(_)));
    }

    #[test]
    fn unrecognised_header_falls_through_to_symphonia_and_fails_cleanly() {
        let bytes = vec![0xFFu8; 16];
        let err = load_audio(&bytes).unwrap_err();
        assert!(matches!(err, FpError::Decode(_)));
    }

    #[test]
    fn minimal_wav_round_trips() {
        let mut buf = Vec::new();
        {
            let spec = hound::WavSpec {
                channels: 1,
                sample_rate: 44_100,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            };
            let mut writer = hound::WavWriter::new(Cursor::new(&mut buf), spec).unwrap();
            for i in 0..1000i16 {
                writer.write_sample(i % 100 - 50).unwrap();
            }
            writer.finalize().unwrap();
        }
        let pcm = load_audio(&buf).unwrap();
        assert_eq!(pcm.sample_rate, 44_100);
        assert_eq!(pcm.samples.len(), 1000);
    }

    #[test]
    fn stereo_wav_is_downmixed_by_channel_mean() {
        let mut buf = Vec::new();
        {
            let spec = hound::WavSpec {
                channels: 2,
                sample_rate: 44_100,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            };
            let mut writer = hound::WavWriter::new(Cursor::new(&mut buf), spec).unwrap();
            for _ in 0..100 {
                writer.write_sample(100i16).unwrap();
                writer.write_sample(-100i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        let pcm = load_audio(&buf).unwrap();
        assert_eq!(pcm.samples.len(), 100);
        assert!(pcm.samples.iter().all(|&s| s == 0));
    }
}
