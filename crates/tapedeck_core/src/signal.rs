//! Source Signal
//!
//! The immutable sample matrix a session plays from. Samples are stored
//! planar (one lane per channel) since effects, histories and the recorder
//! all operate per channel; the device boundary interleaves on the way out.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{PlayerError, PlayerResult};

/// Reject paths whose extension names a container we do not speak.
pub(crate) fn require_wav(path: &Path) -> PlayerResult<()> {
    let is_wav = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);
    if is_wav {
        Ok(())
    } else {
        Err(PlayerError::UnsupportedContainer(path.to_path_buf()))
    }
}

/// An immutable, fully loaded audio signal
#[derive(Debug, Clone)]
pub struct Signal {
    /// Per-channel sample lanes, all of equal length
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
    frames: usize,
    /// Where the signal came from, when loaded from a file
    path: Option<PathBuf>,
}

impl Signal {
    /// Build a signal from planar channel data.
    ///
    /// Every lane must have the same length and there must be at least one
    /// frame in at least one channel.
    pub fn from_planar(channels: Vec<Vec<f32>>, sample_rate: u32) -> PlayerResult<Self> {
        let frames = channels.first().map(Vec::len).unwrap_or(0);
        if frames == 0 {
            return Err(PlayerError::EmptySignal);
        }
        if channels.iter().any(|lane| lane.len() != frames) {
            return Err(PlayerError::RaggedChannels);
        }

        Ok(Self {
            channels,
            sample_rate,
            frames,
            path: None,
        })
    }

    /// Load a WAV file, normalizing integer PCM to f32 in [-1, 1].
    ///
    /// Single-channel sources still come back with a channel dimension
    /// (one lane), so downstream code never special-cases mono.
    pub fn from_wav(path: impl AsRef<Path>) -> PlayerResult<Self> {
        let path = path.as_ref();
        require_wav(path)?;

        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let num_channels = spec.channels as usize;
        if num_channels == 0 {
            return Err(PlayerError::EmptySignal);
        }

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => {
                reader.samples::<f32>().collect::<Result<_, _>>()?
            }
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
        };

        let frames = interleaved.len() / num_channels;
        if frames == 0 {
            return Err(PlayerError::EmptySignal);
        }

        let mut channels: Vec<Vec<f32>> = (0..num_channels)
            .map(|_| Vec::with_capacity(frames))
            .collect();
        for frame in interleaved.chunks_exact(num_channels) {
            for (lane, &sample) in channels.iter_mut().zip(frame.iter()) {
                lane.push(sample);
            }
        }

        info!(
            path = %path.display(),
            frames,
            channels = num_channels,
            sample_rate = spec.sample_rate,
            "Loaded signal"
        );

        Ok(Self {
            channels,
            sample_rate: spec.sample_rate,
            frames,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// One channel's samples, full length
    pub fn channel(&self, channel: usize) -> &[f32] {
        &self.channels[channel]
    }

    /// Source file, when loaded through `from_wav`
    pub fn source_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn duration_seconds(&self) -> f32 {
        self.frames as f32 / self.sample_rate as f32
    }
}
