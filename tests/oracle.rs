use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use closed_huim::{mine, Dataset, Options, Pattern, RawTransaction};

const MAX_ITEM: u32 = 6;

fn random_dataset(rng: &mut ChaCha8Rng) -> Dataset {
    let len = rng.gen_range(1..=8);
    let transactions = (0..len)
        .map(|_| {
            let mut pairs: Vec<(u32, u64)> = Vec::new();
            for item in 1..=MAX_ITEM {
                if rng.gen_bool(0.5) {
                    pairs.push((item, rng.gen_range(1..=5)));
                }
            }
            RawTransaction::from_pairs(pairs)
        })
        .filter(|tx| !tx.is_empty())
        .collect();
    Dataset::from_transactions(transactions)
}

/// Every closed itemset with utility at least `min_utility`, by enumeration.
fn brute_force(dataset: &Dataset, min_utility: u64) -> Vec<(Vec<u32>, u64)> {
    let mut found = Vec::new();

    for mask in 1u32..(1 << MAX_ITEM) {
        let itemset: Vec<u32> = (1..=MAX_ITEM)
            .filter(|i| mask & (1 << (i - 1)) != 0)
            .collect();
        let covering: Vec<&RawTransaction> = dataset
            .transactions()
            .iter()
            .filter(|tx| itemset.iter().all(|i| tx.items().contains(i)))
            .collect();
        if covering.is_empty() {
            continue;
        }

        let closed = (1..=MAX_ITEM)
            .filter(|i| !itemset.contains(i))
            .all(|i| !covering.iter().all(|tx| tx.items().contains(&i)));
        if !closed {
            continue;
        }

        let utility: u64 = covering
            .iter()
            .flat_map(|tx| tx.items().iter().zip(tx.utilities()))
            .filter(|(item, _)| itemset.contains(item))
            .map(|(_, &utility)| utility)
            .sum();
        if utility >= min_utility {
            found.push((itemset, utility));
        }
    }

    found.sort();
    found
}

fn normalize(patterns: &[Pattern]) -> Vec<(Vec<u32>, u64)> {
    let mut out: Vec<(Vec<u32>, u64)> = patterns
        .iter()
        .map(|p| (p.sorted_items(), p.utility))
        .collect();
    out.sort();
    out
}

fn strategies() -> Vec<Options> {
    let mut all = Vec::new();
    for merging in [false, true] {
        for pruning in [false, true] {
            for jumping in [false, true] {
                all.push(
                    Options::default()
                        .with_merging(merging)
                        .with_subtree_pruning(pruning)
                        .with_closure_jumping(jumping),
                );
            }
        }
    }
    all.push(Options::default().with_merge_size_cap(1));
    all
}

#[test]
fn agrees_with_enumeration() {
    let mut rng = ChaCha8Rng::seed_from_u64(315);
    let strategies = strategies();

    for round in 0..200 {
        let dataset = random_dataset(&mut rng);
        let max_utility: u64 = dataset.transactions().iter().map(|tx| tx.total()).sum();

        for threshold in [1, 3, 6, 10, 15, 25] {
            if threshold > max_utility + 1 {
                continue;
            }
            let expected = brute_force(&dataset, threshold);
            for options in &strategies {
                let found = mine(&dataset, threshold, options).unwrap();
                assert_eq!(
                    normalize(&found),
                    expected,
                    "round {} threshold {} options {:?}",
                    round,
                    threshold,
                    options
                );
            }
        }
    }
}

#[test]
fn parallel_output_is_identical() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let threaded = Options::default().with_parallel(true);

    for _ in 0..50 {
        let dataset = random_dataset(&mut rng);
        for threshold in [1, 5, 12] {
            let sequential = mine(&dataset, threshold, &Options::default()).unwrap();
            let parallel = mine(&dataset, threshold, &threaded).unwrap();
            assert_eq!(sequential, parallel);
        }
    }
}
