//! Output Capture
//!
//! Append-only record of every frame the engine emits, sized for the whole
//! signal plus one trailing block so the zero-padded final block always
//! fits. Persisted as 32-bit float WAV once the session is over.

use std::path::Path;

use tracing::info;

use crate::error::PlayerResult;
use crate::signal::require_wav;

/// Full-length capture of a session's processed output
#[derive(Debug)]
pub struct Recorder {
    block_size: usize,
    channels: usize,
    /// `signal frames + block_size` frames per channel
    capacity_frames: usize,
    /// High-water mark; record offsets only move forward
    written: usize,
    /// Channel-major lanes, `channels * capacity_frames` samples, zeroed
    data: Vec<f32>,
}

impl Recorder {
    pub fn new(signal_frames: usize, block_size: usize, channels: usize) -> Self {
        let capacity_frames = signal_frames + block_size;
        Self {
            block_size,
            channels,
            capacity_frames,
            written: 0,
            data: vec![0.0; channels * capacity_frames],
        }
    }

    pub fn capacity_frames(&self) -> usize {
        self.capacity_frames
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Frames recorded so far
    pub fn written_frames(&self) -> usize {
        self.written
    }

    /// One channel's captured lane, full capacity (unwritten tail is zero)
    pub fn channel(&self, channel: usize) -> &[f32] {
        &self.data[channel * self.capacity_frames..(channel + 1) * self.capacity_frames]
    }

    /// Append `frames` frames of the planar output block at absolute
    /// position `offset`.
    ///
    /// Offsets strictly increase across a session, so no frame range is
    /// ever written twice.
    pub fn record(&mut self, offset: usize, frames: usize, output_block: &[f32]) {
        debug_assert!(offset >= self.written, "recording must move forward");
        debug_assert!(offset + frames <= self.capacity_frames);
        debug_assert_eq!(output_block.len(), self.channels * self.block_size);

        for c in 0..self.channels {
            let dst = c * self.capacity_frames + offset;
            let src = c * self.block_size;
            self.data[dst..dst + frames].copy_from_slice(&output_block[src..src + frames]);
        }

        self.written = offset + frames;
    }

    /// Write the whole capture (including any zero tail) as 32-bit float
    /// WAV. The container is inferred from the path extension; only `.wav`
    /// is handled. Sequencing against a running stream is enforced by the
    /// player, which keeps this buffer out of reach until the session is
    /// over.
    pub fn persist(&self, path: impl AsRef<Path>, sample_rate: u32) -> PlayerResult<()> {
        let path = path.as_ref();
        require_wav(path)?;

        let spec = hound::WavSpec {
            channels: self.channels as u16,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };

        let mut writer = hound::WavWriter::create(path, spec)?;
        for frame in 0..self.capacity_frames {
            for c in 0..self.channels {
                writer.write_sample(self.data[c * self.capacity_frames + frame])?;
            }
        }
        writer.finalize()?;

        info!(
            path = %path.display(),
            frames = self.capacity_frames,
            channels = self.channels,
            sample_rate,
            "Persisted recording"
        );

        Ok(())
    }
}
