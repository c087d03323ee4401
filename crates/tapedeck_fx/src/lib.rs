//! Tapedeck FX - Block Effect Library
//!
//! This crate provides the per-channel effect contract for Tapedeck and the
//! shipped effect implementations:
//! - `BlockEffect` trait: one transform per channel per audio block
//! - `HistoryView`: read access to ring-buffered input/output history, so
//!   feedback taps longer than one block stay reachable
//! - `FeedbackDelay`: comb-style delay with decaying feedback
//! - `PeakingFilter`: single-band BiQuad peaking EQ
//!
//! # Architecture
//!
//! Effects are stateless per block: everything a transform needs beyond the
//! current input block comes in through the history views, which keeps
//! output deterministic for a given (input, history) pair and keeps the
//! audio-callback path free of allocation and locking.

mod delay;
mod effect;
mod error;
mod filter;

pub use delay::FeedbackDelay;
pub use effect::{BlockEffect, Bypass, EffectContext, HistoryView};
pub use error::FxError;
pub use filter::PeakingFilter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_exports() {
        // Verify all public types are accessible
        let _ctx = EffectContext::new(48000, 512, 5120);
        let _delay = FeedbackDelay::new(10.0, 0.6).unwrap();
        let _filter = PeakingFilter::new(1000.0, 3.0);
    }
}
