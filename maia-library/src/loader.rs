//! Audio file loading and decoding

use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

/// Errors that can occur during track loading
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No audio track found in file")]
    NoAudioTrack,
    #[error("File decoded to zero samples")]
    Empty,
    #[error("Decode error: {0}")]
    Decode(String),
}

/// A loaded and decoded audio track
pub struct LoadedTrack {
    /// Interleaved stereo samples (f32, normalized to -1.0 to 1.0)
    pub samples: Vec<f32>,
    /// Sample rate in Hz (the loader's target rate)
    pub sample_rate: u32,
    /// Pre-computed waveform overview for display (downsampled peaks)
    pub waveform_overview: Vec<f32>,
}

impl LoadedTrack {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        (self.samples.len() / 2) as f64 / self.sample_rate as f64
    }
}

/// Audio file loader using Symphonia
#[derive(Debug, Clone, Copy)]
pub struct TrackLoader {
    target_sample_rate: u32,
}

impl Default for TrackLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackLoader {
    /// Number of peaks in the waveform overview
    pub const OVERVIEW_POINTS: usize = 1000;

    /// Create a new track loader with default 48kHz sample rate
    pub fn new() -> Self {
        Self::with_sample_rate(48000)
    }

    /// Create a new track loader with specific sample rate
    pub fn with_sample_rate(target_sample_rate: u32) -> Self {
        Self { target_sample_rate }
    }

    /// Load and decode an audio file
    pub fn load(&self, path: &Path) -> Result<LoadedTrack, LoadError> {
        self.load_with_progress(path, |_| {})
    }

    /// Load and decode an audio file, reporting decode progress in percent
    ///
    /// Progress is reported in 10% steps when the container knows its frame count,
    /// and always ends with 100 on success.
    pub fn load_with_progress<F>(&self, path: &Path, mut progress: F) -> Result<LoadedTrack, LoadError>
    where
        F: FnMut(u8),
    {
        progress(0);

        let file = std::fs::File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(LoadError::NoAudioTrack)?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let source_sample_rate = codec_params.sample_rate.unwrap_or(44100);
        let channels = codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(2)
            .max(1);
        let expected_frames = codec_params.n_frames;

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        let mut samples: Vec<f32> = Vec::new();
        let mut last_reported = 0u8;

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    tracing::debug!("Stopping decode of {}: {}", path.display(), e);
                    break;
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(_) => continue,
            };

            let spec = *decoded.spec();
            let duration = decoded.capacity() as u64;

            let mut sample_buf = SampleBuffer::<f32>::new(duration, spec);
            sample_buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(sample_buf.samples());

            if let Some(total) = expected_frames.filter(|&n| n > 0) {
                let frames = (samples.len() / channels as usize) as u64;
                // Leave the last step for after resampling
                let percent = ((frames * 100 / total).min(90) / 10 * 10) as u8;
                if percent > last_reported {
                    last_reported = percent;
                    progress(percent);
                }
            }
        }

        if samples.is_empty() {
            return Err(LoadError::Empty);
        }

        let samples = if source_sample_rate != self.target_sample_rate {
            self.resample(&samples, source_sample_rate, channels)?
        } else {
            samples
        };
        let samples = to_stereo(samples, channels);

        let waveform_overview = waveform_overview(&samples, Self::OVERVIEW_POINTS);
        let track = LoadedTrack {
            samples,
            sample_rate: self.target_sample_rate,
            waveform_overview,
        };

        tracing::debug!(
            "Decoded {} ({} Hz, {} ch, {:.2}s)",
            path.display(),
            source_sample_rate,
            channels,
            track.duration_secs()
        );
        progress(100);

        Ok(track)
    }

    /// Resample audio to target sample rate
    fn resample(
        &self,
        samples: &[f32],
        source_rate: u32,
        channels: u16,
    ) -> Result<Vec<f32>, LoadError> {
        use rubato::{FftFixedInOut, Resampler};

        let channels_usize = channels as usize;
        let frames = samples.len() / channels_usize;

        let mut resampler = FftFixedInOut::<f32>::new(
            source_rate as usize,
            self.target_sample_rate as usize,
            1024,
            channels_usize,
        )
        .map_err(|e| LoadError::Decode(e.to_string()))?;

        let deinterleaved: Vec<Vec<f32>> = (0..channels_usize)
            .map(|ch| {
                (0..frames)
                    .map(|f| samples[f * channels_usize + ch])
                    .collect()
            })
            .collect();

        let chunk_size = resampler.input_frames_next();
        let mut output: Vec<Vec<f32>> = vec![Vec::new(); channels_usize];

        let mut pos = 0;
        while pos + chunk_size <= frames {
            let input_refs: Vec<&[f32]> = deinterleaved
                .iter()
                .map(|ch| &ch[pos..pos + chunk_size])
                .collect();

            let resampled = resampler
                .process(&input_refs, None)
                .map_err(|e| LoadError::Decode(e.to_string()))?;

            for (ch, data) in resampled.into_iter().enumerate() {
                output[ch].extend(data);
            }

            pos += chunk_size;
        }

        // Tail: pad the last partial chunk with zeros and keep the proportional output
        if pos < frames {
            let remaining = frames - pos;
            let padded: Vec<Vec<f32>> = deinterleaved
                .iter()
                .map(|ch| {
                    let mut v = ch[pos..].to_vec();
                    v.resize(chunk_size, 0.0);
                    v
                })
                .collect();

            let input_refs: Vec<&[f32]> = padded.iter().map(|v| v.as_slice()).collect();

            if let Ok(resampled) = resampler.process(&input_refs, None) {
                let output_frames =
                    (remaining * self.target_sample_rate as usize) / source_rate as usize;
                for (ch, data) in resampled.into_iter().enumerate() {
                    output[ch].extend(&data[..output_frames.min(data.len())]);
                }
            }
        }

        let output_frames = output[0].len();
        let mut interleaved = Vec::with_capacity(output_frames * channels_usize);
        for frame_idx in 0..output_frames {
            for channel in &output {
                interleaved.push(channel[frame_idx]);
            }
        }

        Ok(interleaved)
    }
}

/// Convert interleaved audio with any channel count to interleaved stereo
///
/// Mono is duplicated to both sides; channels beyond the first two are dropped.
pub fn to_stereo(samples: Vec<f32>, channels: u16) -> Vec<f32> {
    match channels {
        2 => samples,
        1 => samples.iter().flat_map(|&s| [s, s]).collect(),
        n => samples
            .chunks_exact(n as usize)
            .flat_map(|frame| [frame[0], frame[1]])
            .collect(),
    }
}

/// Generate a downsampled peak waveform for display
pub fn waveform_overview(samples: &[f32], target_points: usize) -> Vec<f32> {
    if samples.is_empty() || target_points == 0 {
        return vec![0.0; target_points];
    }

    let chunk_size = (samples.len() / target_points).max(1);

    samples
        .chunks(chunk_size)
        .map(|chunk| chunk.iter().map(|s| s.abs()).fold(0.0f32, f32::max))
        .collect()
}
