//! Player Configuration

use serde::{Deserialize, Serialize};

/// Streaming configuration for one playback session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Frames processed per callback (lower = less latency, higher = more stability)
    pub block_size: usize,

    /// Number of prior blocks retained per channel for effect history
    pub history_depth: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            block_size: 1024,
            history_depth: 10,
        }
    }
}

impl PlayerConfig {
    /// Retained history per channel, in frames
    pub fn history_frames(&self) -> usize {
        self.block_size * self.history_depth
    }

    /// Callback latency in milliseconds at the given sample rate
    pub fn latency_ms(&self, sample_rate: u32) -> f32 {
        (self.block_size as f32 / sample_rate as f32) * 1000.0
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.block_size < 32 || self.block_size > 8192 {
            return Err(format!("Invalid block size: {}", self.block_size));
        }
        // Depth 1 would leave effects with no frames older than the
        // current block, defeating the history buffer entirely.
        if self.history_depth < 2 || self.history_depth > 64 {
            return Err(format!("Invalid history depth: {}", self.history_depth));
        }
        Ok(())
    }
}
