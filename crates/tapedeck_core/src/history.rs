//! Ring-buffered block history
//!
//! Retains the most recent `history_depth` input and output blocks per
//! channel so effects can reach samples older than the current block.
//! Rather than shifting the whole buffer every block, a start index rotates
//! over a fixed allocation; because the capacity is a whole number of
//! blocks, each advance writes one physically contiguous region.

use tapedeck_fx::HistoryView;

/// Fixed-capacity input/output history for every channel of a stream.
///
/// All lanes start zeroed, so effects that reach before the first block
/// read silence rather than garbage.
#[derive(Debug)]
pub struct HistoryRing {
    block_size: usize,
    /// `block_size * history_depth` frames retained per channel
    capacity: usize,
    channels: usize,
    /// Physical index of the oldest retained frame in every lane
    start: usize,
    /// Channel-major input lanes, `channels * capacity` samples
    input: Vec<f32>,
    /// Channel-major output lanes, same layout
    output: Vec<f32>,
}

impl HistoryRing {
    pub fn new(block_size: usize, history_depth: usize, channels: usize) -> Self {
        let capacity = block_size * history_depth;
        Self {
            block_size,
            capacity,
            channels,
            start: 0,
            input: vec![0.0; channels * capacity],
            output: vec![0.0; channels * capacity],
        }
    }

    /// Retained frames per channel
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Commit one block of input and output samples for every channel.
    ///
    /// Blocks are channel-major planar (`channels * block_size` samples).
    /// The oldest block in every lane is overwritten; the write region
    /// never wraps because `start` only moves in whole blocks.
    pub fn advance(&mut self, input_block: &[f32], output_block: &[f32]) {
        debug_assert_eq!(input_block.len(), self.channels * self.block_size);
        debug_assert_eq!(output_block.len(), self.channels * self.block_size);

        for c in 0..self.channels {
            let dst = c * self.capacity + self.start;
            let src = c * self.block_size;
            self.input[dst..dst + self.block_size]
                .copy_from_slice(&input_block[src..src + self.block_size]);
            self.output[dst..dst + self.block_size]
                .copy_from_slice(&output_block[src..src + self.block_size]);
        }

        self.start = (self.start + self.block_size) % self.capacity;
    }

    /// Oldest-first view of one channel's input history
    pub fn input_view(&self, channel: usize) -> HistoryView<'_> {
        Self::lane_view(&self.input, channel, self.capacity, self.start)
    }

    /// Oldest-first view of one channel's output history
    pub fn output_view(&self, channel: usize) -> HistoryView<'_> {
        Self::lane_view(&self.output, channel, self.capacity, self.start)
    }

    fn lane_view(buf: &[f32], channel: usize, capacity: usize, start: usize) -> HistoryView<'_> {
        let lane = &buf[channel * capacity..(channel + 1) * capacity];
        HistoryView::new(&lane[start..], &lane[..start])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Planar block where channel `c` holds `base + c` in every frame
    fn block(channels: usize, block_size: usize, base: f32) -> Vec<f32> {
        let mut data = vec![0.0; channels * block_size];
        for c in 0..channels {
            for k in 0..block_size {
                data[c * block_size + k] = base + c as f32;
            }
        }
        data
    }

    #[test]
    fn test_starts_all_zero() {
        let ring = HistoryRing::new(4, 3, 2);
        assert_eq!(ring.capacity(), 12);
        for c in 0..2 {
            assert!(ring.input_view(c).iter().all(|s| s == 0.0));
            assert!(ring.output_view(c).iter().all(|s| s == 0.0));
        }
    }

    #[test]
    fn test_newest_block_occupies_tail() {
        let mut ring = HistoryRing::new(4, 3, 1);
        ring.advance(&block(1, 4, 1.0), &block(1, 4, 10.0));

        let input: Vec<f32> = ring.input_view(0).iter().collect();
        assert_eq!(&input[..8], &[0.0; 8]);
        assert_eq!(&input[8..], &[1.0; 4]);

        let output: Vec<f32> = ring.output_view(0).iter().collect();
        assert_eq!(&output[8..], &[10.0; 4]);
    }

    #[test]
    fn test_oldest_block_is_discarded() {
        let mut ring = HistoryRing::new(2, 3, 1);
        for i in 0..4 {
            ring.advance(&block(1, 2, i as f32 + 1.0), &block(1, 2, 0.0));
        }

        // Blocks 2, 3, 4 remain; block 1 has been pushed out
        let input: Vec<f32> = ring.input_view(0).iter().collect();
        assert_eq!(input, vec![2.0, 2.0, 3.0, 3.0, 4.0, 4.0]);
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut ring = HistoryRing::new(4, 2, 2);
        for i in 0..20 {
            ring.advance(&block(2, 4, i as f32), &block(2, 4, i as f32));
            assert_eq!(ring.input_view(0).len(), 8);
            assert_eq!(ring.output_view(1).len(), 8);
        }
    }

    #[test]
    fn test_channels_stay_independent() {
        let mut ring = HistoryRing::new(2, 2, 3);
        ring.advance(&block(3, 2, 5.0), &block(3, 2, 50.0));

        for c in 0..3 {
            let newest_in = ring.input_view(c).at(3);
            let newest_out = ring.output_view(c).at(3);
            assert_eq!(newest_in, 5.0 + c as f32);
            assert_eq!(newest_out, 50.0 + c as f32);
        }
    }

    #[test]
    fn test_rotation_matches_shift_by_copy() {
        // Reference model: shift left one block, append at the tail
        let block_size = 3;
        let depth = 4;
        let mut ring = HistoryRing::new(block_size, depth, 1);
        let mut model = vec![0.0_f32; block_size * depth];

        for i in 0..11 {
            let data: Vec<f32> = (0..block_size).map(|k| (i * 10 + k) as f32).collect();
            ring.advance(&data, &data);

            model.copy_within(block_size.., 0);
            let tail = model.len() - block_size;
            model[tail..].copy_from_slice(&data);

            let actual: Vec<f32> = ring.input_view(0).iter().collect();
            assert_eq!(actual, model, "mismatch after advance {i}");
        }
    }
}
