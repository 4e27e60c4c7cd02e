use std::collections::HashSet;

use chrono::{Local, TimeZone, Utc};
use diskogram_core::{
    Histogram, HistogramState, Interval, ScanWarning, TimeBucket, WarningKind,
};

/// Deterministic pseudo-random observations spanning roughly 2015..2025.
fn observations(seed: u64, count: usize) -> Vec<(i64, u64)> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        state >> 33
    };
    (0..count)
        .map(|_| {
            let ts = 1_420_070_400 + (next() % 315_360_000) as i64;
            let size = next() % 10_000_000;
            (ts, size)
        })
        .collect()
}

fn filled(interval: Interval, seed: u64, count: usize) -> Histogram {
    let mut hist = Histogram::new(interval);
    for (ts, size) in observations(seed, count) {
        hist.add_file(ts, size).unwrap();
    }
    hist
}

const ALL: [Interval; 4] = [Interval::Hour, Interval::Day, Interval::Month, Interval::Year];

#[test]
fn test_totals_match_bucket_sums() {
    for interval in ALL {
        for seed in [1, 7, 42] {
            let mut hist = filled(interval, seed, 2_000);
            hist.finalize();

            let bytes: u64 = hist.buckets().iter().map(|b| b.total_bytes).sum();
            let files: u64 = hist.buckets().iter().map(|b| b.file_count).sum();
            assert_eq!(bytes, hist.total_bytes(), "{interval} seed {seed}");
            assert_eq!(files, hist.total_files(), "{interval} seed {seed}");
            assert_eq!(files, 2_000);
        }
    }
}

#[test]
fn test_bucket_keys_are_unique() {
    for interval in ALL {
        let hist = filled(interval, 99, 3_000);
        let keys: HashSet<i64> = hist.buckets().iter().map(|b| b.start_time).collect();
        assert_eq!(keys.len(), hist.buckets().len(), "{interval}");
    }
}

#[test]
fn test_finalized_buckets_are_ascending() {
    for interval in ALL {
        let mut hist = filled(interval, 3, 1_500);
        hist.finalize();
        assert!(
            hist.buckets()
                .windows(2)
                .all(|pair| pair[0].start_time < pair[1].start_time),
            "{interval}"
        );
    }
}

#[test]
fn test_every_bucket_key_is_normalized() {
    for interval in ALL {
        let hist = filled(interval, 5, 500);
        for bucket in hist.buckets() {
            assert_eq!(interval.normalize(bucket.start_time), bucket.start_time);
        }
    }
}

#[test]
fn test_finalize_idempotent() {
    let mut once = filled(Interval::Month, 11, 800);
    once.finalize();
    let snapshot: Vec<TimeBucket> = once.buckets().to_vec();
    let (bytes, files) = (once.total_bytes(), once.total_files());

    once.finalize();
    assert_eq!(once.buckets(), snapshot.as_slice());
    assert_eq!(once.total_bytes(), bytes);
    assert_eq!(once.total_files(), files);
}

#[test]
fn test_day_bucket_boundaries() {
    let mut hist = Histogram::new(Interval::Day);
    let at = |h, m, s, d| Utc.with_ymd_and_hms(2024, 3, d, h, m, s).unwrap().timestamp();

    hist.add_file(at(13, 47, 0, 15), 1).unwrap();
    hist.add_file(at(23, 59, 59, 15), 2).unwrap();
    hist.add_file(at(0, 0, 1, 16), 4).unwrap();
    hist.finalize();

    assert_eq!(hist.buckets().len(), 2);
    assert_eq!(hist.buckets()[0].total_bytes, 3);
    assert_eq!(hist.buckets()[0].file_count, 2);
    assert_eq!(hist.buckets()[1].total_bytes, 4);
}

#[test]
fn test_month_bucket_boundaries() {
    let mut hist = Histogram::new(Interval::Month);
    let noon = |m, d| {
        Local
            .with_ymd_and_hms(2024, m, d, 12, 0, 0)
            .earliest()
            .unwrap()
            .timestamp()
    };

    hist.add_file(noon(1, 31), 10).unwrap();
    hist.add_file(noon(2, 1), 20).unwrap();
    hist.add_file(noon(2, 29), 30).unwrap();
    hist.finalize();

    assert_eq!(hist.buckets().len(), 2);
    assert_eq!(Interval::Month.label(hist.buckets()[0].start_time), "2024-01");
    assert_eq!(Interval::Month.label(hist.buckets()[1].start_time), "2024-02");
    assert_eq!(hist.buckets()[1].total_bytes, 50);
}

#[test]
fn test_state_machine() {
    let mut hist = Histogram::new(Interval::Year);
    assert_eq!(hist.state(), HistogramState::Empty);

    hist.add_file(1_700_000_000, 1).unwrap();
    assert_eq!(hist.state(), HistogramState::Accumulating);

    hist.finalize();
    assert_eq!(hist.state(), HistogramState::Finalized);
    assert!(hist.scan_duration() < std::time::Duration::from_secs(60));
}

#[test]
fn test_warnings_do_not_touch_buckets() {
    let mut hist = filled(Interval::Day, 8, 10);
    let before = hist.buckets().to_vec();

    hist.record_warning(&ScanWarning::new(
        "/locked",
        "cannot open directory '/locked': Permission denied",
        WarningKind::ReadDir,
    ));

    assert_eq!(hist.buckets(), before.as_slice());
    assert_eq!(hist.error_count(), 1);
    assert!(hist.last_error().unwrap().contains("/locked"));
}
