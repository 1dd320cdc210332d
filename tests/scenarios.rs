use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use closed_huim::{mine, run_search, Dataset, Error, Options, Pattern};

const SAMPLE: &str = "\
# items:total:utilities
1 2:5:2 3
2 3:4:2 2
1 2 3:7:2 3 2
";

fn sample() -> Dataset {
    Dataset::from_reader(SAMPLE.as_bytes(), None).unwrap()
}

fn normalize(patterns: &[Pattern]) -> Vec<(Vec<u32>, u64)> {
    let mut out: Vec<(Vec<u32>, u64)> = patterns
        .iter()
        .map(|p| (p.sorted_items(), p.utility))
        .collect();
    out.sort();
    out
}

#[test]
fn closed_itemsets_of_sample() {
    let patterns = mine(&sample(), 6, &Options::default()).unwrap();
    assert_eq!(
        normalize(&patterns),
        vec![
            (vec![1, 2], 10),
            (vec![1, 2, 3], 7),
            (vec![2], 8),
            (vec![2, 3], 9),
        ]
    );
}

#[test]
fn discovery_order() {
    let patterns = mine(&sample(), 6, &Options::default()).unwrap();
    let lines: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
    assert_eq!(
        lines,
        vec![
            "3 1 2 #UTIL: 7",
            "3 2 #UTIL: 9",
            "1 2 #UTIL: 10",
            "2 #UTIL: 8",
        ]
    );
}

#[test]
fn repeated_runs_agree() {
    let dataset = sample();
    let threaded = Options::default().with_parallel(true);
    for options in [Options::default(), threaded] {
        let first = mine(&dataset, 6, &options).unwrap();
        let second = mine(&dataset, 6, &options).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }
}

#[test]
fn empty_database() {
    let dataset = Dataset::from_reader("\n# nothing here\n".as_bytes(), None).unwrap();
    assert!(dataset.is_empty());
    assert!(mine(&dataset, 5, &Options::default()).unwrap().is_empty());
}

#[test]
fn threshold_above_every_utility() {
    let patterns = mine(&sample(), 1000, &Options::default()).unwrap();
    assert!(patterns.is_empty());
}

#[test]
fn merging_does_not_change_results() {
    let dataset = closed_huim::dataset! {
        {1 => 1, 2 => 4, 3 => 5},
        {1 => 2, 2 => 1, 3 => 1},
        {2 => 3, 3 => 2},
        {1 => 1, 2 => 4, 3 => 5},
        {3 => 7},
    };
    let unmerged = Options::default().with_merging(false);
    for threshold in [1, 5, 10, 15, 20] {
        let merged = mine(&dataset, threshold, &Options::default()).unwrap();
        let plain = mine(&dataset, threshold, &unmerged).unwrap();
        assert_eq!(normalize(&merged), normalize(&plain), "{}", threshold);
    }
}

#[test]
fn run_search_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sample.txt");
    let output = dir.path().join("patterns.txt");
    fs::write(&input, SAMPLE).unwrap();

    let result = run_search(6, &input, Some(&output), &Options::default()).unwrap();
    assert!(result.is_none());

    let written: Vec<Pattern> = fs::read_to_string(&output)
        .unwrap()
        .lines()
        .map(|line| line.parse().unwrap())
        .collect();
    assert_eq!(normalize(&written).len(), 4);

    let collected = run_search(6, &input, None, &Options::default())
        .unwrap()
        .unwrap();
    assert_eq!(collected, written);
}

#[test]
fn run_search_respects_transaction_limit() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sample.txt");
    fs::write(&input, SAMPLE).unwrap();

    let options = Options::default().with_max_transactions(1);
    let patterns = run_search(1, &input, None, &options).unwrap().unwrap();
    assert_eq!(normalize(&patterns), vec![(vec![1, 2], 5)]);
}

#[test]
fn missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_search(6, dir.path().join("absent.txt"), None, &Options::default());
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn malformed_line_reports_position() {
    let text = "1 2:5:2 3\n1 2:4:2 3\n";
    match Dataset::from_reader(text.as_bytes(), None) {
        Err(Error::Format { line, .. }) => assert_eq!(line, 2),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn invalid_parameters() {
    assert!(matches!(
        mine(&sample(), 0, &Options::default()),
        Err(Error::InvalidParameter(_))
    ));
    assert!(matches!(
        mine(&sample(), 6, &Options::default().with_max_transactions(0)),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn raised_cancel_flag() {
    let flag = Arc::new(AtomicBool::new(true));
    let options = Options::default().with_cancel_flag(flag);
    assert!(matches!(
        mine(&sample(), 6, &options),
        Err(Error::Cancelled)
    ));
}
