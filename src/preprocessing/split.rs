//! Stratified train/test splitting

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SplitError {
    #[error("test fraction must lie in (0, 1), got {0}")]
    InvalidFraction(f64),

    #[error("class {class} has only {count} member(s); at least 2 are needed to stratify")]
    ClassTooSmall { class: i64, count: usize },

    #[error("{partition} partition of {size} rows cannot hold all {classes} classes")]
    PartitionTooSmall {
        partition: &'static str,
        size: usize,
        classes: usize,
    },
}

/// Row indices of the two partitions, in shuffled order.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Number of test rows for `n` observations.
pub fn test_size(n: usize, test_fraction: f64) -> usize {
    ((n as f64 * test_fraction) - 1e-9).ceil().max(0.0) as usize
}

/// Splits row indices so that every class keeps its proportion in both
/// partitions, up to rounding.
pub fn stratified_split(
    labels: &[i64],
    test_fraction: f64,
    seed: u64,
) -> Result<SplitIndices, SplitError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(SplitError::InvalidFraction(test_fraction));
    }

    // Row indices per class, in label order
    let mut classes: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        classes.entry(label).or_default().push(i);
    }

    for (&class, members) in &classes {
        if members.len() < 2 {
            return Err(SplitError::ClassTooSmall {
                class,
                count: members.len(),
            });
        }
    }

    let n = labels.len();
    let n_test = test_size(n, test_fraction);
    let n_train = n - n_test;
    for (partition, size) in [("test", n_test), ("train", n_train)] {
        if size < classes.len() {
            return Err(SplitError::PartitionTooSmall {
                partition,
                size,
                classes: classes.len(),
            });
        }
    }

    // How many test rows each class contributes
    let counts: Vec<usize> = classes.values().map(Vec::len).collect();
    let allocation = allocate(&counts, n_test);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n_train);
    let mut test = Vec::with_capacity(n_test);

    // Shuffle within each class, first k rows go to test
    for (members, &k) in classes.values_mut().zip(&allocation) {
        members.shuffle(&mut rng);
        test.extend_from_slice(&members[..k]);
        train.extend_from_slice(&members[k..]);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    Ok(SplitIndices { train, test })
}

/// Distributes `n_draws` test rows over classes by largest remainder, then
/// makes sure every class has at least one row on each side.
fn allocate(counts: &[usize], n_draws: usize) -> Vec<usize> {
    let n: usize = counts.iter().sum();
    let exact: Vec<f64> = counts
        .iter()
        .map(|&c| c as f64 * n_draws as f64 / n as f64)
        .collect();
    let mut alloc: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

    // Leftover rows go to the largest fractional parts

    let assigned: usize = alloc.iter().sum();
    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.partial_cmp(&ra)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(alloc[a].cmp(&alloc[b]))
            .then(counts[a].cmp(&counts[b]))
    });
    for &i in order.iter().take(n_draws.saturating_sub(assigned)) {
        alloc[i] += 1;
    }

    // No class may be absent from the test side...
    loop {
        let Some(empty) = alloc.iter().position(|&k| k == 0) else {
            break;
        };
        let donor = (0..alloc.len())
            .filter(|&j| alloc[j] > 1)
            .max_by_key(|&j| alloc[j]);
        match donor {
            Some(j) => {
                alloc[j] -= 1;
                alloc[empty] += 1;
            }
            None => break,
        }
    }

    // ...nor from the train side.
    loop {
        let Some(full) = (0..alloc.len()).find(|&i| alloc[i] == counts[i]) else {
            break;
        };
        let receiver = (0..alloc.len())
            .filter(|&j| counts[j] - alloc[j] > 1)
            .max_by_key(|&j| counts[j] - alloc[j]);
        match receiver {
            Some(j) => {
                alloc[j] += 1;
                alloc[full] -= 1;
            }
            None => break,
        }
    }

    alloc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_count(labels: &[i64], idx: &[usize], class: i64) -> usize {
        idx.iter().filter(|&&i| labels[i] == class).count()
    }

    #[test]
    fn test_small_imbalanced_table() {
        let labels = [1, 1, 0, 1, 1, 0, 1, 1];
        let split = stratified_split(&labels, 0.25, 42).unwrap();

        assert_eq!(split.train.len(), 6);
        assert_eq!(split.test.len(), 2);
        assert!(class_count(&labels, &split.test, 0) >= 1);
        assert!(class_count(&labels, &split.train, 0) >= 1);
    }

    #[test]
    fn test_partitions_cover_all_rows_once() {
        let labels: Vec<i64> = (0..50).map(|i| (i % 3 == 0) as i64).collect();
        let split = stratified_split(&labels, 0.3, 7).unwrap();

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_sizes_and_proportions() {
        for &(n, f) in &[(768usize, 0.2), (569, 0.3), (10, 0.3), (101, 0.5), (37, 0.1)] {
            let labels: Vec<i64> = (0..n).map(|i| (i % 5 < 2) as i64).collect();
            let split = stratified_split(&labels, f, 42).unwrap();

            let expected = (n as f64 * f).round() as i64;
            assert!((split.test.len() as i64 - expected).abs() <= 1, "n={n} f={f}");

            for class in [0, 1] {
                let total = class_count(&labels, &(0..n).collect::<Vec<_>>(), class) as f64;
                let in_test = class_count(&labels, &split.test, class) as f64;
                let ideal = total * split.test.len() as f64 / n as f64;
                assert!((in_test - ideal).abs() <= 1.0, "n={n} f={f} class={class}");
            }
        }
    }

    #[test]
    fn test_same_seed_same_split() {
        let labels: Vec<i64> = (0..40).map(|i| (i % 4 == 0) as i64).collect();
        assert_eq!(
            stratified_split(&labels, 0.25, 1).unwrap(),
            stratified_split(&labels, 0.25, 1).unwrap()
        );
        assert_ne!(
            stratified_split(&labels, 0.25, 1).unwrap(),
            stratified_split(&labels, 0.25, 2).unwrap()
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        let labels = [0, 0, 1, 1];
        assert_eq!(
            stratified_split(&labels, 1.0, 0),
            Err(SplitError::InvalidFraction(1.0))
        );
        assert_eq!(
            stratified_split(&labels, 0.0, 0),
            Err(SplitError::InvalidFraction(0.0))
        );
        assert_eq!(
            stratified_split(&[0, 0, 0, 1], 0.5, 0),
            Err(SplitError::ClassTooSmall { class: 1, count: 1 })
        );
        assert!(matches!(
            stratified_split(&labels, 0.1, 0),
            Err(SplitError::PartitionTooSmall { partition: "test", .. })
        ));
    }

    #[test]
    fn test_allocation_keeps_both_sides_populated() {
        assert_eq!(allocate(&[2, 6], 2), vec![1, 1]);
        assert_eq!(allocate(&[2, 98], 90), vec![1, 89]);
    }
}
