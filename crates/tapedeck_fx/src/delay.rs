//! Feedback delay effect
//!
//! Comb-style recursion `y[k] = x[k] - feedback * y[k - tau]` where the tap
//! length `tau` is derived from a resonance frequency and may span several
//! blocks. Taps older than the current block are read from the output
//! history, so the effect itself carries no state between calls.

use crate::effect::{BlockEffect, EffectContext, HistoryView};
use crate::error::FxError;

/// Delay-with-feedback effect driven entirely by the shared output history.
#[derive(Debug, Clone)]
pub struct FeedbackDelay {
    /// Resonance frequency in Hz; the tap length is `sample_rate / frequency`.
    frequency: f32,
    /// Feedback amount, |feedback| < 1 so echoes decay.
    feedback: f32,
}

impl FeedbackDelay {
    pub fn new(frequency: f32, feedback: f32) -> Result<Self, FxError> {
        if !(feedback.abs() < 1.0) {
            return Err(FxError::UnstableFeedback(feedback));
        }
        Ok(Self {
            frequency,
            feedback,
        })
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Tap length in frames for the given sample rate.
    fn tap(&self, ctx: &EffectContext) -> Result<usize, FxError> {
        if !(self.frequency > 0.0) {
            return Err(FxError::DegenerateCoefficient {
                frequency: self.frequency,
                sample_rate: ctx.sample_rate,
            });
        }
        let tau = (ctx.sample_rate as f32 / self.frequency) as usize;
        if tau == 0 {
            return Err(FxError::DegenerateCoefficient {
                frequency: self.frequency,
                sample_rate: ctx.sample_rate,
            });
        }
        if tau > ctx.history_len {
            return Err(FxError::TapExceedsHistory {
                tau,
                history: ctx.history_len,
            });
        }
        Ok(tau)
    }
}

impl BlockEffect for FeedbackDelay {
    fn prepare(&self, ctx: &EffectContext) -> Result<(), FxError> {
        self.tap(ctx).map(|_| ())
    }

    fn process(
        &self,
        ctx: &EffectContext,
        input: &[f32],
        output: &mut [f32],
        _input_history: &HistoryView<'_>,
        output_history: &HistoryView<'_>,
    ) -> Result<(), FxError> {
        let tau = self.tap(ctx)?;
        let hist_len = output_history.len();

        for k in 0..input.len() {
            let delayed = if k >= tau {
                output[k - tau]
            } else {
                // tau frames back from the current frame lands in history
                output_history.at(hist_len + k - tau)
            };
            output[k] = input[k] - self.feedback * delayed;
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "Feedback Delay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_view(buf: &[f32]) -> HistoryView<'_> {
        HistoryView::new(buf, &[])
    }

    #[test]
    fn test_rejects_non_decaying_feedback() {
        assert!(matches!(
            FeedbackDelay::new(10.0, 1.0),
            Err(FxError::UnstableFeedback(_))
        ));
        assert!(matches!(
            FeedbackDelay::new(10.0, -1.5),
            Err(FxError::UnstableFeedback(_))
        ));
        assert!(FeedbackDelay::new(10.0, 0.99).is_ok());
    }

    #[test]
    fn test_prepare_rejects_tap_longer_than_history() {
        // 48000 / 10 = 4800 frame tap, but only 4096 frames retained
        let delay = FeedbackDelay::new(10.0, 0.6).unwrap();
        let ctx = EffectContext::new(48000, 1024, 4096);
        assert!(matches!(
            delay.prepare(&ctx),
            Err(FxError::TapExceedsHistory { tau: 4800, history: 4096 })
        ));
    }

    #[test]
    fn test_prepare_rejects_frequency_above_sample_rate() {
        // tau would truncate to zero frames
        let delay = FeedbackDelay::new(96000.0, 0.6).unwrap();
        let ctx = EffectContext::new(48000, 1024, 8192);
        assert!(matches!(
            delay.prepare(&ctx),
            Err(FxError::DegenerateCoefficient { .. })
        ));
    }

    #[test]
    fn test_echo_within_block() {
        // 16000 / 4000 = 4 frame tap
        let delay = FeedbackDelay::new(4000.0, 0.5).unwrap();
        let ctx = EffectContext::new(16000, 16, 32);

        let mut input = [0.0_f32; 16];
        input[0] = 1.0;
        let mut output = [0.0_f32; 16];
        let zeros = [0.0_f32; 32];

        delay
            .process(&ctx, &input, &mut output, &zero_view(&zeros), &zero_view(&zeros))
            .unwrap();

        assert_eq!(output[0], 1.0);
        assert_eq!(output[4], -0.5);
        assert_eq!(output[8], 0.25);
        assert_eq!(output[1], 0.0);
    }

    #[test]
    fn test_tap_crosses_block_boundary() {
        // tau = 4 equals the block size, so every echo reads from history
        let delay = FeedbackDelay::new(4000.0, 0.5).unwrap();
        let ctx = EffectContext::new(16000, 4, 8);

        let mut first_in = [0.0_f32; 4];
        first_in[0] = 1.0;
        let mut first_out = [0.0_f32; 4];
        let zeros = [0.0_f32; 8];
        delay
            .process(&ctx, &first_in, &mut first_out, &zero_view(&zeros), &zero_view(&zeros))
            .unwrap();
        assert_eq!(first_out, [1.0, 0.0, 0.0, 0.0]);

        // History now ends with the first block's output
        let mut hist = [0.0_f32; 8];
        hist[4..].copy_from_slice(&first_out);

        let second_in = [0.0_f32; 4];
        let mut second_out = [0.0_f32; 4];
        delay
            .process(&ctx, &second_in, &mut second_out, &zero_view(&zeros), &zero_view(&hist))
            .unwrap();

        assert_eq!(second_out, [-0.5, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_deterministic_for_identical_inputs() {
        let delay = FeedbackDelay::new(4000.0, 0.7).unwrap();
        let ctx = EffectContext::new(16000, 8, 16);

        let input: Vec<f32> = (0..8).map(|i| (i as f32 * 0.37).sin()).collect();
        let hist: Vec<f32> = (0..16).map(|i| (i as f32 * 0.11).cos()).collect();

        let mut a = [0.0_f32; 8];
        let mut b = [0.0_f32; 8];
        delay
            .process(&ctx, &input, &mut a, &zero_view(&hist), &zero_view(&hist))
            .unwrap();
        delay
            .process(&ctx, &input, &mut b, &zero_view(&hist), &zero_view(&hist))
            .unwrap();

        assert_eq!(a, b);
    }
}
