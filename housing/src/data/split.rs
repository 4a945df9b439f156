//! Stratified train/test split on an income category.

use super::record::HousingRecord;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

/// Upper bounds of the `median_income` strata; the last stratum is open.
pub const INCOME_CATEGORY_BOUNDS: [f64; 4] = [1.5, 3.0, 4.5, 6.0];

/// Share of each stratum assigned to the test split.
pub const TEST_RATIO: f64 = 0.2;

/// Shuffle seed, fixed so repeated ingestions of one file split identically.
pub const SPLIT_SEED: u64 = 42;

/// Returns the income stratum of a row, 1 through 5, or 0 when unknown.
#[must_use]
pub fn income_category(median_income: Option<f64>) -> usize {
    match median_income {
        Some(income) if income.is_finite() => {
            1 + INCOME_CATEGORY_BOUNDS
                .iter()
                .take_while(|bound| income > **bound)
                .count()
        }
        _ => 0,
    }
}

/// Splits rows into `(train, test)`, preserving the income distribution.
///
/// Each stratum is shuffled with a generator seeded by `seed` and its first
/// `round(len * test_ratio)` rows go to the test split. Row order within each
/// split follows the strata in ascending order.
#[must_use]
pub fn stratified_split(
    records: &[HousingRecord],
    test_ratio: f64,
    seed: u64,
) -> (Vec<HousingRecord>, Vec<HousingRecord>) {
    let mut strata: BTreeMap<usize, Vec<&HousingRecord>> = BTreeMap::new();
    for record in records {
        strata
            .entry(income_category(record.median_income))
            .or_default()
            .push(record);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(records.len());
    let mut test = Vec::new();

    for (_, mut rows) in strata {
        rows.shuffle(&mut rng);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let n_test = ((rows.len() as f64) * test_ratio).round() as usize;
        let (test_rows, train_rows) = rows.split_at(n_test.min(rows.len()));
        test.extend(test_rows.iter().map(|r| (*r).clone()));
        train.extend(train_rows.iter().map(|r| (*r).clone()));
    }

    (train, test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::synthetic_records;

    #[test]
    fn test_income_category_bins() {
        assert_eq!(income_category(Some(0.5)), 1);
        assert_eq!(income_category(Some(1.5)), 1);
        assert_eq!(income_category(Some(1.6)), 2);
        assert_eq!(income_category(Some(4.0)), 3);
        assert_eq!(income_category(Some(5.0)), 4);
        assert_eq!(income_category(Some(8.3252)), 5);
        assert_eq!(income_category(None), 0);
        assert_eq!(income_category(Some(f64::NAN)), 0);
    }

    #[test]
    fn test_split_sizes_and_disjointness() {
        let records = synthetic_records(500, 7);
        let (train, test) = stratified_split(&records, TEST_RATIO, SPLIT_SEED);

        assert_eq!(train.len() + test.len(), records.len());
        let expected_test: usize = {
            let mut counts = BTreeMap::new();
            for r in &records {
                *counts.entry(income_category(r.median_income)).or_insert(0usize) += 1;
            }
            counts
                .values()
                .map(|n| ((*n as f64) * TEST_RATIO).round() as usize)
                .sum()
        };
        assert_eq!(test.len(), expected_test);
        for row in &test {
            assert!(!train.contains(row));
        }
    }

    #[test]
    fn test_split_is_reproducible_for_a_seed() {
        let records = synthetic_records(200, 3);
        let first = stratified_split(&records, TEST_RATIO, SPLIT_SEED);
        let second = stratified_split(&records, TEST_RATIO, SPLIT_SEED);
        assert_eq!(first, second);
    }

    #[test]
    fn test_strata_proportions_are_preserved() {
        let records = synthetic_records(1000, 11);
        let (_, test) = stratified_split(&records, TEST_RATIO, SPLIT_SEED);

        for category in 1..=5 {
            let total = records
                .iter()
                .filter(|r| income_category(r.median_income) == category)
                .count();
            let in_test = test
                .iter()
                .filter(|r| income_category(r.median_income) == category)
                .count();
            let expected = ((total as f64) * TEST_RATIO).round() as usize;
            assert_eq!(in_test, expected, "stratum {category}");
        }
    }
}
