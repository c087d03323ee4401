//! Tapedeck Core - Streaming Playback Engine
//!
//! This crate plays a pre-loaded signal through an audio output device,
//! routes every block through an optional per-channel effect, and captures
//! the processed output for later persistence:
//! - Signal loading and WAV persistence (via hound)
//! - Ring-buffered block history feeding effects across block boundaries
//! - Real-time render callback with a zero-allocation hot path (via CPAL)
//! - One-shot outcome hand-off between the device and control threads
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Control Thread                          │
//! │   Player ──start/stop──▶ playback thread ──outcome──▶ save  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ crossbeam-channel (one-shot)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Device-driven Thread                       │
//! │   Signal ──▶ Effect per channel ──▶ Device + Recorder       │
//! │                  ▲          │                               │
//! │                  └─ History ┘   (zero allocation here)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod history;
mod player;
mod recorder;
mod signal;
mod stream;

pub use config::PlayerConfig;
pub use error::{PlayerError, PlayerResult};
pub use history::HistoryRing;
pub use player::{Player, PlayerState};
pub use recorder::Recorder;
pub use signal::Signal;
pub use stream::StreamOutcome;

// Re-export effect types for convenience
pub use tapedeck_fx::{
    BlockEffect, Bypass, EffectContext, FeedbackDelay, FxError, HistoryView, PeakingFilter,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_exports() {
        // Verify public API is accessible
        let _config = PlayerConfig::default();
        let _signal = Signal::from_planar(vec![vec![0.0; 4]], 48000).unwrap();
    }
}
