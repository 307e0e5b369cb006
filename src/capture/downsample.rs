//! Stride downsampling of captured sample blocks.
//!
//! Each arriving block is reduced independently: the stride grid restarts at
//! index 0 of every block and never spans block boundaries. A block shorter
//! than the stride still yields its first sample, so quiet devices with tiny
//! callback buffers remain visible.

/// Keeps every `stride`-th sample of `block`, starting at index 0.
///
/// Output length is `len / stride` when `len >= stride`, otherwise a single
/// sample (or nothing for an empty block). `stride` must be >= 1; it is
/// validated at configuration load.
pub fn downsample_block(block: &[f32], stride: usize) -> Vec<f32> {
    debug_assert!(stride >= 1);
    if block.is_empty() {
        return Vec::new();
    }

    let count = block.len() / stride;
    if count == 0 {
        return vec![block[0]];
    }

    (0..count).map(|i| block[i * stride]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_every_nth_sample() {
        let block: Vec<f32> = (0..1000).map(|i| i as f32).collect();
        let reduced = downsample_block(&block, 50);

        assert_eq!(reduced.len(), 20);
        for (i, &s) in reduced.iter().enumerate() {
            assert_eq!(s, (i * 50) as f32);
        }
    }

    #[test]
    fn length_is_floor_of_len_over_stride() {
        // 1001 / 50 floors to 20: index 1000 is not on the grid.
        let block: Vec<f32> = (0..1001).map(|i| i as f32).collect();
        let reduced = downsample_block(&block, 50);
        assert_eq!(reduced.len(), 20);
        assert_eq!(*reduced.last().unwrap(), 950.0);
    }

    #[test]
    fn short_block_yields_first_sample() {
        let block = [0.25f32, 0.5, 0.75];
        assert_eq!(downsample_block(&block, 50), vec![0.25]);
    }

    #[test]
    fn empty_block_yields_empty_output() {
        assert!(downsample_block(&[], 50).is_empty());
    }

    #[test]
    fn stride_one_is_identity() {
        let block = [0.1f32, -0.2, 0.3];
        assert_eq!(downsample_block(&block, 1), block.to_vec());
    }

    #[test]
    fn grid_restarts_at_each_block() {
        // Two 75-sample blocks at stride 50 each yield their own index 0,
        // not a continuation of a global 50-sample grid.
        let a: Vec<f32> = (0..75).map(|i| i as f32).collect();
        let b: Vec<f32> = (0..75).map(|i| 100.0 + i as f32).collect();

        let mut out = downsample_block(&a, 50);
        out.extend(downsample_block(&b, 50));

        assert_eq!(out, vec![0.0, 100.0]);
    }
}
