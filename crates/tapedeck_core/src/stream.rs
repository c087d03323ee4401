//! Stream Engine
//!
//! The real-time half of a playback session. `render` is the body of the
//! audio callback: it slices the next chunk of the source signal, runs the
//! effect per channel against the ring histories, interleaves the result
//! into the device buffer, captures it, and rolls the histories forward.
//!
//! All mutable stream state lives inside this struct, which is moved into
//! the device callback for the lifetime of the session. The only signals
//! crossing thread boundaries are a stop flag (read here, set by the
//! controller) and a one-shot outcome report (sent here exactly once,
//! carrying the recording back out by move).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;

use tapedeck_fx::{BlockEffect, EffectContext, FxError};

use crate::config::PlayerConfig;
use crate::error::PlayerError;
use crate::history::HistoryRing;
use crate::recorder::Recorder;
use crate::signal::Signal;

/// How a streaming session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Source signal exhausted
    Completed,
    /// Cooperative stop honored at a block boundary
    Stopped,
    /// Fatal error inside the session
    Failed,
}

/// One-shot message handing the session result back to the controller
#[derive(Debug)]
pub(crate) struct SessionReport {
    pub outcome: StreamOutcome,
    pub error: Option<PlayerError>,
    /// Absent when the session died before the engine ever ran
    pub recorder: Option<Recorder>,
}

impl SessionReport {
    pub(crate) fn failed(error: PlayerError) -> Self {
        Self {
            outcome: StreamOutcome::Failed,
            error: Some(error),
            recorder: None,
        }
    }

    pub(crate) fn disconnected() -> Self {
        Self::failed(PlayerError::ChannelDisconnected)
    }
}

/// Owns all per-session stream state and implements the device callback
pub struct StreamEngine {
    signal: Arc<Signal>,
    effect: Option<Box<dyn BlockEffect>>,
    ctx: EffectContext,

    /// Next frame of the signal to play
    offset: usize,

    /// Channel-major input scratch, `channels * block_size`, reused every block
    input_scratch: Vec<f32>,
    /// Channel-major output scratch, same layout
    output_scratch: Vec<f32>,

    history: HistoryRing,
    /// Taken when the outcome report is emitted
    recorder: Option<Recorder>,

    stop_flag: Arc<AtomicBool>,
    /// Taken on first (and only) report
    report_tx: Option<Sender<SessionReport>>,
}

impl StreamEngine {
    pub(crate) fn new(
        signal: Arc<Signal>,
        config: &PlayerConfig,
        effect: Option<Box<dyn BlockEffect>>,
        stop_flag: Arc<AtomicBool>,
        report_tx: Sender<SessionReport>,
    ) -> Self {
        let channels = signal.num_channels();
        let block = config.block_size;
        let ctx = EffectContext::new(signal.sample_rate(), block, config.history_frames());

        Self {
            ctx,
            offset: 0,
            input_scratch: vec![0.0; channels * block],
            output_scratch: vec![0.0; channels * block],
            history: HistoryRing::new(block, config.history_depth, channels),
            recorder: Some(Recorder::new(signal.frames(), block, channels)),
            stop_flag,
            report_tx: Some(report_tx),
            signal,
            effect,
        }
    }

    /// Whether the one-shot outcome has been emitted
    pub fn is_finished(&self) -> bool {
        self.report_tx.is_none()
    }

    /// Fill one device buffer. This is the audio callback body.
    ///
    /// `data` is interleaved `frames * channels`; the driver normally
    /// delivers exactly one block per call. No allocation, no I/O, no
    /// locking happens on this path.
    pub fn render(&mut self, data: &mut [f32]) {
        data.fill(0.0);

        if self.is_finished() {
            return;
        }
        if self.stop_flag.load(Ordering::Acquire) {
            self.finish(StreamOutcome::Stopped, None);
            return;
        }

        let channels = self.signal.num_channels();
        let block = self.ctx.block_size;
        // The driver block; clamped so a short device buffer cannot
        // overrun the scratch blocks
        let frames = (data.len() / channels).min(block);
        let chunk = (self.signal.frames() - self.offset).min(frames);

        self.input_scratch.fill(0.0);
        self.output_scratch.fill(0.0);

        for c in 0..channels {
            let src = &self.signal.channel(c)[self.offset..self.offset + chunk];
            self.input_scratch[c * block..c * block + chunk].copy_from_slice(src);
        }

        if let Err(e) = self.process_channels(channels, block) {
            self.finish(StreamOutcome::Failed, Some(PlayerError::Effect(e)));
            return;
        }

        // Only the real chunk reaches the device; padded frames stay silent
        for c in 0..channels {
            let lane = &self.output_scratch[c * block..];
            for k in 0..chunk {
                data[k * channels + c] = lane[k];
            }
        }

        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record(self.offset, chunk, &self.output_scratch);
        }

        // History always advances by a whole (zero-padded) block so lanes
        // stay block-aligned
        self.history.advance(&self.input_scratch, &self.output_scratch);

        if chunk < frames {
            self.finish(StreamOutcome::Completed, None);
        } else {
            self.offset += chunk;
        }
    }

    /// Run the effect (or bypass-copy) for every channel.
    fn process_channels(&mut self, channels: usize, block: usize) -> Result<(), FxError> {
        for c in 0..channels {
            let in_lane = &self.input_scratch[c * block..(c + 1) * block];
            let out_lane = &mut self.output_scratch[c * block..(c + 1) * block];

            match &self.effect {
                None => out_lane.copy_from_slice(in_lane),
                Some(fx) => {
                    let input_history = self.history.input_view(c);
                    let output_history = self.history.output_view(c);
                    fx.process(&self.ctx, in_lane, out_lane, &input_history, &output_history)?;

                    // Classify numerical faults the effect let through
                    if let Some(frame) = out_lane.iter().position(|s| !s.is_finite()) {
                        return Err(FxError::NonFiniteSample { channel: c, frame });
                    }
                }
            }
        }
        Ok(())
    }

    fn finish(&mut self, outcome: StreamOutcome, error: Option<PlayerError>) {
        if let Some(tx) = self.report_tx.take() {
            let report = SessionReport {
                outcome,
                error,
                recorder: self.recorder.take(),
            };
            // bounded(1); if the device error path already reported, the
            // session outcome is decided and this one is dropped
            let _ = tx.try_send(report);
        }
    }
}
