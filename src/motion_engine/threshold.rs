use heapless::Vec;

use super::types::{AxisBounds, BoundPair, ClassifyError, Sample, WINDOW_CAPACITY};

/// Per-window amplitude statistics driving the peak detector.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct WindowLevels {
    pub ground: f32,
    pub positive_mean: f32,
    pub negative_mean: f32,
    pub bounds: AxisBounds,
}

/// Descending comb sort. Gaps shrink by 10/13 and 9 or 10 snap to 11.
pub fn comb_sort_descending(values: &mut [f32]) {
    let len = values.len();
    let mut gap = len;
    let mut swaps = 0usize;

    while gap + swaps > 1 {
        if gap > 1 {
            gap = gap * 10 / 13;
            if gap == 9 || gap == 10 {
                gap = 11;
            }
        }
        swaps = 0;
        for i in (gap..len).rev() {
            if values[i - gap] < values[i] {
                values.swap(i - gap, i);
                swaps += 1;
            }
        }
    }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

fn ordered(a: f32, b: f32) -> BoundPair {
    if a > b {
        BoundPair { high: a, low: b }
    } else {
        BoundPair { high: b, low: a }
    }
}

pub fn estimate_levels(
    window: &[Sample],
    percentile_n: usize,
    low_coeff: f32,
    high_coeff: f32,
) -> Result<WindowLevels, ClassifyError> {
    if window.is_empty() {
        return Err(ClassifyError::EmptyWindow);
    }
    if percentile_n == 0 || percentile_n > window.len() {
        return Err(ClassifyError::PercentileExceedsWindow);
    }

    let mut sorted: Vec<f32, WINDOW_CAPACITY> = window.iter().map(|s| s.value).collect();
    let ground = mean(&sorted);
    comb_sort_descending(&mut sorted);

    let positive_mean = mean(&sorted[..percentile_n]);
    let negative_mean = mean(&sorted[sorted.len() - percentile_n..]);

    let p_high = ground + (positive_mean - ground) * high_coeff;
    let p_low = ground + (positive_mean - ground) * low_coeff;
    let n_low = ground - (ground - negative_mean) * high_coeff;
    let n_high = ground - (ground - negative_mean) * low_coeff;

    Ok(WindowLevels {
        ground,
        positive_mean,
        negative_mean,
        bounds: AxisBounds {
            upper: ordered(p_high, p_low),
            lower: ordered(n_high, n_low),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion_engine::seq::SeqId;

    fn window_from(values: &[f32]) -> Vec<Sample, WINDOW_CAPACITY> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Sample {
                value: *v,
                seq: SeqId(i as u16),
            })
            .collect()
    }

    fn pseudo_random(seed: &mut u32) -> f32 {
        *seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        ((*seed >> 16) % 4000) as f32 - 2000.0
    }

    #[test]
    fn comb_sort_orders_descending() {
        let mut seed = 7u32;
        for len in [0usize, 1, 2, 9, 10, 11, 37, 100, 200] {
            let mut values: Vec<f32, WINDOW_CAPACITY> =
                (0..len).map(|_| pseudo_random(&mut seed)).collect();
            comb_sort_descending(&mut values);
            assert!(values.windows(2).all(|w| w[0] >= w[1]), "len {len}");
        }
    }

    #[test]
    fn flat_window_collapses_bounds_to_ground() {
        let window = window_from(&[500.0; 100]);
        let levels = estimate_levels(&window, 20, 0.4, 0.6).expect("valid window");
        assert_eq!(levels.ground, 500.0);
        assert_eq!(levels.bounds.upper.high, 500.0);
        assert_eq!(levels.bounds.lower.low, 500.0);
    }

    #[test]
    fn bounds_follow_percentile_means() {
        let mut values = [0.0f32; 100];
        values[..10].fill(1000.0);
        values[90..].fill(-1000.0);
        let window = window_from(&values);
        let levels = estimate_levels(&window, 20, 0.4, 0.6).expect("valid window");

        assert_eq!(levels.ground, 0.0);
        assert_eq!(levels.positive_mean, 500.0);
        assert_eq!(levels.negative_mean, -500.0);
        assert_eq!(levels.bounds.upper.high, 300.0);
        assert_eq!(levels.bounds.upper.low, 200.0);
        assert_eq!(levels.bounds.lower.high, -200.0);
        assert_eq!(levels.bounds.lower.low, -300.0);
    }

    #[test]
    fn swapped_coefficients_are_reordered() {
        let mut seed = 99u32;
        for _ in 0..20 {
            let values: Vec<f32, WINDOW_CAPACITY> =
                (0..200).map(|_| pseudo_random(&mut seed)).collect();
            let window = window_from(&values);
            for (low, high) in [(0.6, 0.4), (0.4, 0.6), (0.2, 0.3)] {
                let levels = estimate_levels(&window, 40, low, high).expect("valid window");
                assert!(levels.bounds.upper.low <= levels.bounds.upper.high);
                assert!(levels.bounds.lower.low <= levels.bounds.lower.high);
            }
        }
    }

    #[test]
    fn degenerate_windows_are_errors() {
        assert_eq!(
            estimate_levels(&[], 20, 0.4, 0.6),
            Err(ClassifyError::EmptyWindow)
        );
        let window = window_from(&[1.0; 10]);
        assert_eq!(
            estimate_levels(&window, 20, 0.4, 0.6),
            Err(ClassifyError::PercentileExceedsWindow)
        );
    }
}
