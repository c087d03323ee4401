//! Engine Error Types
//!
//! Four families, none retried: load errors surface before streaming
//! begins, device errors surface at `start()`, effect errors end the
//! session with a failed outcome, and sequencing errors reject the call
//! synchronously.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the playback engine
#[derive(Error, Debug)]
pub enum PlayerError {
    // ---- load ----
    #[error("Unsupported container for '{0}': only .wav files are handled")]
    UnsupportedContainer(PathBuf),

    #[error("Malformed audio file: {0}")]
    MalformedFile(#[from] hound::Error),

    #[error("Signal holds no frames")]
    EmptySignal,

    #[error("Channel data lengths differ")]
    RaggedChannels,

    // ---- device ----
    #[error("No audio output device found")]
    NoOutputDevice,

    #[error("Output device does not support {channels} channel(s) at {sample_rate}Hz")]
    UnsupportedStreamConfig { channels: u16, sample_rate: u32 },

    #[error("Failed to build audio stream: {0}")]
    StreamBuild(String),

    #[error("Failed to play audio stream: {0}")]
    StreamPlay(String),

    #[error("Audio stream failed while running: {0}")]
    StreamRuntime(String),

    #[error("Stream configuration error: {0}")]
    ConfigError(String),

    // ---- effect ----
    #[error("Effect error: {0}")]
    Effect(#[from] tapedeck_fx::FxError),

    // ---- sequencing ----
    #[error("Player already running")]
    AlreadyRunning,

    #[error("Session already finished - a player streams once")]
    AlreadyFinished,

    #[error("Player was never started")]
    NotStarted,

    #[error("Stream still running - wait for it to finish before saving")]
    StillRunning,

    #[error("No recording captured by the last session")]
    NothingRecorded,

    #[error("Signal was not loaded from a file, no default output path")]
    NoSourcePath,

    #[error("Playback thread ended without reporting an outcome")]
    ChannelDisconnected,
}

/// Result type alias for engine operations
pub type PlayerResult<T> = Result<T, PlayerError>;
