//! Decoded audio clips and looping playback voices.
//!
//! An [`AudioClip`] is immutable mono f32 data plus its source sample rate,
//! shared via `Arc`: the rain texture is decoded once and reused by every
//! rain voice, and file-backed tracks are decoded once per mood swap. A
//! [`LoopVoice`] is a transient looping playhead over a clip; it resamples to
//! the device rate with linear interpolation and is cheap to create and drop.

use std::path::Path;
use std::sync::Arc;

use moodscape_core::dsp::lerp;

use crate::error::AssetError;

/// Playable sample-rate window. Clips outside are rejected at play time
/// rather than resampled into aliasing soup.
const MIN_CLIP_RATE: u32 = 8_000;
const MAX_CLIP_RATE: u32 = 192_000;

/// Immutable decoded audio: mono f32 samples at `sample_rate`.
#[derive(Debug, Clone)]
pub struct AudioClip {
    sample_rate: u32,
    samples: Vec<f32>,
}

impl AudioClip {
    /// Wrap already-decoded mono samples (used by tests and synthetic beds).
    pub fn from_samples(sample_rate: u32, samples: Vec<f32>) -> Arc<Self> {
        Arc::new(Self { sample_rate, samples })
    }

    /// Read and decode a WAV file, folding all channels to mono.
    ///
    /// Integer formats are normalized to [-1, 1]; float WAVs pass through.
    pub fn load_wav(path: &Path) -> Result<Arc<Self>, AssetError> {
        let mut reader = hound::WavReader::open(path).map_err(|e| match e {
            hound::Error::IoError(source) => AssetError::Io { path: path.to_path_buf(), source },
            other => AssetError::Decode { path: path.to_path_buf(), source: other },
        })?;

        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|source| AssetError::Decode { path: path.to_path_buf(), source })?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()
                    .map_err(|source| AssetError::Decode { path: path.to_path_buf(), source })?
            }
        };

        // Fold interleaved channels down to mono.
        let samples = if channels == 1 {
            interleaved
        } else {
            interleaved
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        };

        Ok(Arc::new(Self { sample_rate: spec.sample_rate, samples }))
    }

    /// Verify the clip can actually drive a voice.
    pub fn check_playable(&self, path: &Path) -> Result<(), AssetError> {
        if self.samples.is_empty() {
            return Err(AssetError::Rejected {
                path: path.to_path_buf(),
                reason: "contains no audio frames",
            });
        }
        if !(MIN_CLIP_RATE..=MAX_CLIP_RATE).contains(&self.sample_rate) {
            return Err(AssetError::Rejected {
                path: path.to_path_buf(),
                reason: "sample rate out of the playable range",
            });
        }
        Ok(())
    }

    #[inline] pub fn sample_rate(&self) -> u32 { self.sample_rate }
    #[inline] pub fn len(&self) -> usize { self.samples.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.samples.is_empty() }

    #[inline]
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate.max(1) as f32
    }
}

/// A looping playhead over a shared clip.
///
/// Voices are disposable: stopping playback drops the voice, restarting
/// creates a fresh one over the same cached clip.
#[derive(Debug, Clone)]
pub struct LoopVoice {
    clip: Arc<AudioClip>,
    pos: f64,
}

impl LoopVoice {
    pub fn new(clip: Arc<AudioClip>) -> Self {
        Self { clip, pos: 0.0 }
    }

    /// Next mono sample, resampled to `out_sr` with linear interpolation;
    /// wraps seamlessly at the clip boundary.
    #[inline]
    pub fn next(&mut self, out_sr: f32) -> f32 {
        let n = self.clip.samples.len();
        if n == 0 {
            return 0.0;
        }
        let i0 = self.pos as usize;
        let frac = (self.pos - i0 as f64) as f32;
        let i1 = (i0 + 1) % n;
        let s = lerp(self.clip.samples[i0], self.clip.samples[i1], frac);

        self.pos += self.clip.sample_rate as f64 / out_sr.max(1.0) as f64;
        while self.pos >= n as f64 {
            self.pos -= n as f64;
        }
        s
    }

    #[inline]
    pub fn clip(&self) -> &Arc<AudioClip> {
        &self.clip
    }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn voice_loops_seamlessly() {
        // Two-sample clip at the device rate: output must alternate forever.
        let clip = AudioClip::from_samples(48_000, vec![0.25, -0.25]);
        let mut voice = LoopVoice::new(clip);
        for i in 0..1000 {
            let s = voice.next(48_000.0);
            let expect = if i % 2 == 0 { 0.25 } else { -0.25 };
            assert_relative_eq!(s, expect, epsilon = 1e-6);
        }
    }

    #[test]
    fn voice_resamples_by_rate_ratio() {
        // A clip at half the device rate advances half a source sample per
        // output sample; odd output samples fall exactly between neighbors.
        let clip = AudioClip::from_samples(24_000, vec![0.0, 1.0, 2.0, 3.0]);
        let mut voice = LoopVoice::new(clip);
        assert_relative_eq!(voice.next(48_000.0), 0.0);
        assert_relative_eq!(voice.next(48_000.0), 0.5);
        assert_relative_eq!(voice.next(48_000.0), 1.0);
        assert_relative_eq!(voice.next(48_000.0), 1.5);
    }

    #[test]
    fn empty_clip_is_rejected_for_playback() {
        let clip = AudioClip::from_samples(44_100, vec![]);
        let err = clip.check_playable(Path::new("x.wav")).unwrap_err();
        assert!(matches!(err, AssetError::Rejected { .. }));
    }

    #[test]
    fn absurd_rate_is_rejected_for_playback() {
        let clip = AudioClip::from_samples(1_000, vec![0.0; 16]);
        assert!(clip.check_playable(Path::new("x.wav")).is_err());
        let clip = AudioClip::from_samples(44_100, vec![0.0; 16]);
        assert!(clip.check_playable(Path::new("x.wav")).is_ok());
    }

    #[test]
    fn wav_round_trip_decodes_and_folds_to_mono() {
        // Written with hound, read back through the same crate; stereo frames
        // fold to their average.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..64 {
            writer.write_sample(8_192i16).unwrap(); // left
            writer.write_sample(-8_192i16).unwrap(); // right
        }
        writer.finalize().unwrap();

        let clip = AudioClip::load_wav(&path).unwrap();
        assert_eq!(clip.sample_rate(), 44_100);
        assert_eq!(clip.len(), 64);
        for i in 0..clip.len() {
            assert_relative_eq!(clip.samples[i], 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn missing_file_maps_to_io_error() {
        let err = AudioClip::load_wav(Path::new("/definitely/not/here.wav")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn garbage_bytes_map_to_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"this is not a wav file at all").unwrap();
        let err = AudioClip::load_wav(&path).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }
}
