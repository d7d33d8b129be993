//! Weight normalization and index selection for resampling

use rand::Rng;

use crate::common::Resampler;

/// Normalized weights plus whether the uniform fallback was used
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedWeights {
    pub weights: Vec<f64>,
    pub degenerate: bool,
}

/// Normalize raw weights to sum to one.
///
/// When the total is zero (every weight underflowed) or not finite, every
/// entry becomes `1/K` so selection always has somewhere to land.
pub fn normalize_weights(raw: &[f64]) -> NormalizedWeights {
    let total: f64 = raw.iter().sum();

    if total > 0.0 && total.is_finite() {
        NormalizedWeights {
            weights: raw.iter().map(|w| w / total).collect(),
            degenerate: false,
        }
    } else {
        let uniform = 1.0 / raw.len().max(1) as f64;
        NormalizedWeights {
            weights: vec![uniform; raw.len()],
            degenerate: true,
        }
    }
}

/// Effective number of particles, 1 / sum(w^2), for normalized weights
pub fn effective_sample_size(weights: &[f64]) -> f64 {
    let sum_w2: f64 = weights.iter().map(|w| w * w).sum();
    if sum_w2 > 0.0 {
        1.0 / sum_w2
    } else {
        0.0
    }
}

/// Index selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResamplingStrategy {
    /// Linear scan over the running sum, O(K) per draw
    #[default]
    RouletteWheel,
    /// Binary search over the cumulative table, O(log K) per draw
    BinarySearch,
}

impl ResamplingStrategy {
    /// First positive-weight index whose running sum reaches `r`
    fn roulette_wheel(weights: &[f64], r: f64) -> usize {
        let mut cumulative = 0.0;
        for (i, &w) in weights.iter().enumerate() {
            cumulative += w;
            if w > 0.0 && r <= cumulative {
                return i;
            }
        }
        last_positive(weights)
    }

    fn binary_search(weights: &[f64], r: f64) -> usize {
        let cumulative: Vec<f64> = weights
            .iter()
            .scan(0.0, |acc, &w| {
                *acc += w;
                Some(*acc)
            })
            .collect();

        // First slot with cumulative >= r; zero-weight slots share their
        // predecessor's sum, so step forward to the slot that added mass.
        let mut i = cumulative.partition_point(|&c| c < r);
        while i < weights.len() && weights[i] <= 0.0 {
            i += 1;
        }
        if i < weights.len() {
            i
        } else {
            last_positive(weights)
        }
    }
}

/// Round-off guard: the running sum can end a hair below `r`
fn last_positive(weights: &[f64]) -> usize {
    weights
        .iter()
        .rposition(|&w| w > 0.0)
        .unwrap_or_else(|| weights.len().saturating_sub(1))
}

impl Resampler for ResamplingStrategy {
    fn select<R: Rng + ?Sized>(&self, weights: &[f64], rng: &mut R) -> usize {
        let r: f64 = rng.gen();
        match self {
            ResamplingStrategy::RouletteWheel => Self::roulette_wheel(weights, r),
            ResamplingStrategy::BinarySearch => Self::binary_search(weights, r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const STRATEGIES: [ResamplingStrategy; 2] =
        [ResamplingStrategy::RouletteWheel, ResamplingStrategy::BinarySearch];

    #[test]
    fn test_normalize_weights_sums_to_one() {
        let n = normalize_weights(&[1.0, 3.0, 4.0]);
        assert!(!n.degenerate);
        assert!((n.weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((n.weights[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_all_zero_falls_back_to_uniform() {
        let n = normalize_weights(&[0.0; 4]);
        assert!(n.degenerate);
        assert_eq!(n.weights, vec![0.25; 4]);
    }

    #[test]
    fn test_normalize_non_finite_falls_back_to_uniform() {
        let n = normalize_weights(&[f64::INFINITY, 1.0]);
        assert!(n.degenerate);
        assert_eq!(n.weights, vec![0.5, 0.5]);
    }

    #[test]
    fn test_effective_sample_size() {
        assert!((effective_sample_size(&[0.25; 4]) - 4.0).abs() < 1e-12);
        assert!((effective_sample_size(&[0.0, 1.0, 0.0]) - 1.0).abs() < 1e-12);
        assert_eq!(effective_sample_size(&[]), 0.0);
    }

    #[test]
    fn test_single_heavy_weight_always_selected() {
        let weights = [0.0, 0.0, 1.0, 0.0, 0.0];
        for strategy in STRATEGIES {
            let mut rng = StdRng::seed_from_u64(3);
            let picks = strategy.select_many(&weights, 200, &mut rng);
            assert!(picks.iter().all(|&i| i == 2), "{:?}", strategy);
        }
    }

    #[test]
    fn test_zero_weight_never_selected_at_boundaries() {
        let weights = [0.0, 0.5, 0.0, 0.5, 0.0];
        for strategy in STRATEGIES {
            let pick_low = match strategy {
                ResamplingStrategy::RouletteWheel => ResamplingStrategy::roulette_wheel(&weights, 0.0),
                ResamplingStrategy::BinarySearch => ResamplingStrategy::binary_search(&weights, 0.0),
            };
            assert_eq!(pick_low, 1);
            let pick_mid = match strategy {
                ResamplingStrategy::RouletteWheel => ResamplingStrategy::roulette_wheel(&weights, 0.5),
                ResamplingStrategy::BinarySearch => ResamplingStrategy::binary_search(&weights, 0.5),
            };
            assert_eq!(pick_mid, 1);
        }
    }

    #[test]
    fn test_round_off_falls_back_to_last_positive() {
        let weights = [0.3, 0.3, 0.3, 0.0];
        assert_eq!(ResamplingStrategy::roulette_wheel(&weights, 0.95), 2);
        assert_eq!(ResamplingStrategy::binary_search(&weights, 0.95), 2);
    }

    #[test]
    fn test_uniform_fallback_selects_every_index() {
        let n = normalize_weights(&[0.0; 5]);
        for strategy in STRATEGIES {
            let mut rng = StdRng::seed_from_u64(11);
            let mut counts = [0usize; 5];
            for i in strategy.select_many(&n.weights, 5000, &mut rng) {
                counts[i] += 1;
            }
            for c in counts {
                assert!(c > 800 && c < 1200, "counts {:?}", counts);
            }
        }
    }

    #[test]
    fn test_strategies_agree_on_same_draw() {
        let weights = normalize_weights(&[0.1, 0.0, 0.4, 0.2, 0.0, 0.3]).weights;
        for k in 0..=100 {
            let r = k as f64 / 100.0;
            assert_eq!(
                ResamplingStrategy::roulette_wheel(&weights, r),
                ResamplingStrategy::binary_search(&weights, r),
                "r = {}",
                r
            );
        }
    }
}
