//! Single-band peaking filter
//!
//! BiQuad peaking EQ following the RBJ (Robert Bristow-Johnson) Audio EQ
//! Cookbook, evaluated as a direct-form difference equation. The two frames
//! of filter memory come from the shared input/output histories instead of
//! internal state, which keeps the effect deterministic per block and
//! continuous across block boundaries.

use biquad::{Coefficients, ToHertz, Type, Q_BUTTERWORTH_F32};

use crate::effect::{BlockEffect, EffectContext, HistoryView};
use crate::error::FxError;

/// One peaking EQ band applied per channel.
#[derive(Debug, Clone)]
pub struct PeakingFilter {
    frequency: f32,
    gain_db: f32,
    q: f32,
}

impl PeakingFilter {
    /// Peaking band at `frequency` Hz with `gain_db` boost/cut and a
    /// Butterworth Q (~0.707).
    pub fn new(frequency: f32, gain_db: f32) -> Self {
        Self {
            frequency,
            gain_db,
            q: Q_BUTTERWORTH_F32,
        }
    }

    pub fn with_q(frequency: f32, gain_db: f32, q: f32) -> Self {
        Self {
            frequency,
            gain_db,
            q,
        }
    }

    fn coefficients(&self, sample_rate: u32) -> Result<Coefficients<f32>, FxError> {
        // Nyquist bound keeps the bilinear transform well-conditioned
        if !(self.frequency > 0.0) || self.frequency * 2.0 >= sample_rate as f32 {
            return Err(FxError::DegenerateCoefficient {
                frequency: self.frequency,
                sample_rate,
            });
        }

        // biquad takes the peaking gain in dB and applies the cookbook
        // 10^(dB/40) conversion itself
        Coefficients::<f32>::from_params(
            Type::PeakingEQ(self.gain_db),
            (sample_rate as f32).hz(),
            self.frequency.hz(),
            self.q,
        )
        .map_err(|_| FxError::DegenerateCoefficient {
            frequency: self.frequency,
            sample_rate,
        })
    }
}

/// Frame `back` positions before block frame `k`, falling through to history.
#[inline]
fn past(block: &[f32], history: &HistoryView<'_>, k: usize, back: usize) -> f32 {
    if k >= back {
        block[k - back]
    } else {
        history.at(history.len() - (back - k))
    }
}

impl BlockEffect for PeakingFilter {
    fn prepare(&self, ctx: &EffectContext) -> Result<(), FxError> {
        self.coefficients(ctx.sample_rate).map(|_| ())
    }

    fn process(
        &self,
        ctx: &EffectContext,
        input: &[f32],
        output: &mut [f32],
        input_history: &HistoryView<'_>,
        output_history: &HistoryView<'_>,
    ) -> Result<(), FxError> {
        let c = self.coefficients(ctx.sample_rate)?;

        // y[n] = b0 x[n] + b1 x[n-1] + b2 x[n-2] - a1 y[n-1] - a2 y[n-2]
        for k in 0..input.len() {
            let x1 = past(input, input_history, k, 1);
            let x2 = past(input, input_history, k, 2);
            let y1 = past(output, output_history, k, 1);
            let y2 = past(output, output_history, k, 2);
            output[k] = c.b0 * input[k] + c.b1 * x1 + c.b2 * x2 - c.a1 * y1 - c.a2 * y2;
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "Peaking Filter"
    }
}
