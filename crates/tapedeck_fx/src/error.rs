//! Effect Error Types

use thiserror::Error;

/// Errors that can occur while configuring or running a block effect
#[derive(Error, Debug)]
pub enum FxError {
    #[error("Degenerate filter coefficients for frequency {frequency}Hz at sample rate {sample_rate}Hz")]
    DegenerateCoefficient { frequency: f32, sample_rate: u32 },

    #[error("Delay tap of {tau} frames exceeds the {history} frames of retained history")]
    TapExceedsHistory { tau: usize, history: usize },

    #[error("Feedback gain {0} would not decay (|gain| must be < 1)")]
    UnstableFeedback(f32),

    #[error("Effect produced a non-finite sample on channel {channel}, frame {frame}")]
    NonFiniteSample { channel: usize, frame: usize },
}
