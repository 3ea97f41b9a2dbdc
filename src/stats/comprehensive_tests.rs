//! Property-based tests for the statistical helpers

use super::*;
use proptest::collection::vec;
use proptest::prelude::*;

/// Property-based test generators
mod generators {
    use super::*;

    /// Plausible round-trip times in milliseconds
    pub fn rtt_ms() -> impl Strategy<Value = f64> {
        0.01f64..5000.0
    }

    pub fn small_sets() -> impl Strategy<Value = Vec<f64>> {
        vec(rtt_ms(), 1..MIN_PERCENTILE_SAMPLES)
    }

    pub fn large_sets() -> impl Strategy<Value = Vec<f64>> {
        vec(rtt_ms(), MIN_PERCENTILE_SAMPLES..200)
    }

    pub fn any_sets() -> impl Strategy<Value = Vec<f64>> {
        vec(rtt_ms(), 1..200)
    }
}

proptest! {
    /// Below twenty samples the percentile is exactly the maximum
    #[test]
    fn p95_fallback_equals_max(values in generators::small_sets()) {
        prop_assert_eq!(p95_or_max(&values), max(&values));
    }

    /// From twenty samples on, the percentile is a nearest-rank member of the set
    #[test]
    fn p95_is_nearest_rank(values in generators::large_sets()) {
        let p95 = p95_or_max(&values).unwrap();
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let rank = (0.95 * sorted.len() as f64).ceil() as usize;
        prop_assert_eq!(p95, sorted[rank - 1]);
    }

    /// Mean and median always lie between min and max
    #[test]
    fn central_values_bounded(values in generators::any_sets()) {
        let lo = min(&values).unwrap();
        let hi = max(&values).unwrap();
        let avg = mean(&values).unwrap();
        let mid = median(&values).unwrap();
        prop_assert!(avg >= lo - 1e-9 && avg <= hi + 1e-9);
        prop_assert!(mid >= lo && mid <= hi);
    }

    /// Standard deviations are finite and non-negative; population <= sample
    #[test]
    fn std_devs_non_negative(values in generators::any_sets()) {
        let sample = sample_std_dev(&values).unwrap();
        let population = population_std_dev(&values).unwrap();
        prop_assert!(sample.is_finite() && sample >= 0.0);
        prop_assert!(population.is_finite() && population >= 0.0);
        prop_assert!(population <= sample + 1e-9);
    }

    /// Distribution summary is internally consistent
    #[test]
    fn distribution_consistent(values in generators::any_sets()) {
        let dist = RttDistribution::from_samples(&values).unwrap();
        prop_assert_eq!(dist.count, values.len());
        prop_assert!(dist.min_ms <= dist.median_ms);
        prop_assert!(dist.median_ms <= dist.max_ms);
        prop_assert!(dist.p95_ms <= dist.max_ms);
    }
}

#[test]
fn constant_samples_have_zero_spread() {
    let values = vec![4.0; 25];
    assert_eq!(sample_std_dev(&values), Some(0.0));
    assert_eq!(p95_or_max(&values), Some(4.0));
}
