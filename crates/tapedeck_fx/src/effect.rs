//! Block Effect Trait
//!
//! Defines the interface for per-channel block transforms. An effect is
//! invoked once per channel per audio block and sees, besides the current
//! input block, the most recent blocks of input and output history, so
//! feedback taps longer than one block stay reachable.

use crate::error::FxError;

/// Context passed to effects containing stream metadata
#[derive(Debug, Clone, Copy)]
pub struct EffectContext {
    pub sample_rate: u32,
    pub block_size: usize,
    /// Retained history per channel, in frames (`block_size * history_depth`)
    pub history_len: usize,
}

impl EffectContext {
    pub fn new(sample_rate: u32, block_size: usize, history_len: usize) -> Self {
        Self {
            sample_rate,
            block_size,
            history_len,
        }
    }
}

/// Read-only window over one channel's retained history.
///
/// The ring that backs it rotates a start index instead of moving data, so
/// the window is made of up to two physical slices. Logical index 0 is the
/// oldest retained frame; `len() - 1` is the newest.
#[derive(Debug, Clone, Copy)]
pub struct HistoryView<'a> {
    head: &'a [f32],
    tail: &'a [f32],
}

impl<'a> HistoryView<'a> {
    /// Build a view from the two physical segments, oldest segment first.
    pub fn new(head: &'a [f32], tail: &'a [f32]) -> Self {
        Self { head, tail }
    }

    /// Total retained frames
    #[inline]
    pub fn len(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_empty() && self.tail.is_empty()
    }

    /// Frame at logical position `index`, oldest-first.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    #[inline]
    pub fn at(&self, index: usize) -> f32 {
        if index < self.head.len() {
            self.head[index]
        } else {
            self.tail[index - self.head.len()]
        }
    }

    /// Iterate frames oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.head.iter().chain(self.tail.iter()).copied()
    }
}

/// Trait for per-channel block effects
///
/// # Contract
///
/// `process` must fully populate `output` (length = `ctx.block_size`) using
/// only the given input block and the two histories. It must not retain any
/// of the buffers past the call; all are reused on the next block. Given
/// identical input and history contents it must produce identical output.
///
/// # Real-time Safety
///
/// `process` runs on the audio callback path. Implementors MUST NOT:
/// - allocate (no Vec::push, no Box::new, no String)
/// - perform syscalls (no file I/O, no network, no mutex locks)
/// - loop without a bound tied to the block size
///
/// Violating these rules causes audio dropouts.
pub trait BlockEffect: Send {
    /// Validate this effect against the stream parameters.
    ///
    /// Invoked once before streaming begins; an error here is fatal to the
    /// session before any audio is emitted.
    fn prepare(&self, _ctx: &EffectContext) -> Result<(), FxError> {
        Ok(())
    }

    /// Transform one channel's block.
    fn process(
        &self,
        ctx: &EffectContext,
        input: &[f32],
        output: &mut [f32],
        input_history: &HistoryView<'_>,
        output_history: &HistoryView<'_>,
    ) -> Result<(), FxError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Pass-through effect.
///
/// The engine short-circuits when no effect is configured; this exists for
/// places that need a concrete `BlockEffect` doing nothing.
pub struct Bypass;

impl BlockEffect for Bypass {
    fn process(
        &self,
        _ctx: &EffectContext,
        input: &[f32],
        output: &mut [f32],
        _input_history: &HistoryView<'_>,
        _output_history: &HistoryView<'_>,
    ) -> Result<(), FxError> {
        output.copy_from_slice(input);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Bypass"
    }
}
