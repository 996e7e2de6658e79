/// End-to-end scanner integration tests.
///
/// These run the real two-pass `jwalk` scanner against temporary trees, both
/// synchronously through `scan` and on the background thread through
/// `Scanner::start`, checking the filter outcome, the progress stream, the
/// busy guard, and cancellation.
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use zipsweep_core::model::{AgeSelector, FileCandidate, FilterCriteria};
use zipsweep_core::scanner::{
    scan, normalize_root, ScanMessage, ScanProgress, Scanner, MAX_TICK_PERCENT,
    PROGRESS_CHANNEL_CAPACITY,
};
use zipsweep_core::{ErrorCategory, ScanError, ValidationError};

// ── Helpers ──────────────────────────────────────────────────────────────────

const DAY: Duration = Duration::from_secs(86_400);

fn write_file(path: &Path, size: usize, age: Duration) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, vec![b'x'; size]).unwrap();
    let mtime = SystemTime::now() - age;
    set_file_mtime(path, FileTime::from_system_time(mtime)).unwrap();
}

/// ```text
/// root/
///   a.txt   (10 bytes, modified now)
///   b.csv   (20 bytes, modified two years and a day ago)
///   c.bin   (5 bytes, modified three years ago)
/// ```
fn build_scenario_tree(root: &Path) {
    write_file(&root.join("a.txt"), 10, Duration::ZERO);
    write_file(&root.join("b.csv"), 20, DAY * (2 * 366 + 1));
    write_file(&root.join("c.bin"), 5, DAY * (3 * 366));
}

fn relative_names(root: &Path, candidates: &[FileCandidate]) -> Vec<String> {
    let root = normalize_root(root).unwrap();
    let mut names: Vec<String> = candidates
        .iter()
        .map(|c| {
            c.relative_to(&root)
                .expect("candidate below root")
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    names.sort();
    names
}

fn scan_sync(root: &Path, criteria: &FilterCriteria) -> (Result<Vec<FileCandidate>, ScanError>, Vec<ScanProgress>) {
    let mut ticks: Vec<ScanProgress> = Vec::new();
    let cancel = AtomicBool::new(false);
    let result = scan(root, criteria, &mut ticks, &cancel);
    (result, ticks)
}

/// Enough files that the bounded channel fills up if nobody drains it.
fn build_wide_tree(root: &Path) {
    for i in 0..(PROGRESS_CHANNEL_CAPACITY + 500) {
        fs::write(root.join(format!("f{i:05}.log")), b"x").unwrap();
    }
}

// ── Filtering ────────────────────────────────────────────────────────────────

#[test]
fn scenario_selects_only_the_old_csv() {
    let tmp = TempDir::new().unwrap();
    build_scenario_tree(tmp.path());

    let criteria = FilterCriteria::new(["txt", "csv"], AgeSelector::TwoYears);
    let (result, _) = scan_sync(tmp.path(), &criteria);
    let candidates = result.unwrap();

    assert_eq!(relative_names(tmp.path(), &candidates), vec!["b.csv"]);
    assert_eq!(candidates[0].size_bytes(), 20);
    assert_eq!(candidates[0].file_name(), "b.csv");
}

#[test]
fn nested_directories_are_walked_at_any_depth() {
    let tmp = TempDir::new().unwrap();
    let old = DAY * 400;
    write_file(&tmp.path().join("l1/l2/l3/l4/deep.log"), 3, old);
    write_file(&tmp.path().join("l1/app.log.7"), 3, old);
    write_file(&tmp.path().join("l1/app.log.old"), 3, old);
    write_file(&tmp.path().join("top.LOG"), 3, old);

    let criteria = FilterCriteria::new(["log"], AgeSelector::OneYear);
    let (result, _) = scan_sync(tmp.path(), &criteria);

    assert_eq!(
        relative_names(tmp.path(), &result.unwrap()),
        vec!["l1/app.log.7", "l1/l2/l3/l4/deep.log", "top.LOG"]
    );
}

#[test]
fn empty_extension_set_matches_nothing() {
    let tmp = TempDir::new().unwrap();
    build_scenario_tree(tmp.path());

    let criteria = FilterCriteria::new(Vec::<String>::new(), AgeSelector::Today);
    let (result, ticks) = scan_sync(tmp.path(), &criteria);
    assert!(result.unwrap().is_empty());
    assert_eq!(ticks.len(), 3, "files are still examined");
}

#[test]
fn repeated_scans_are_idempotent() {
    let tmp = TempDir::new().unwrap();
    for i in 0..20 {
        write_file(&tmp.path().join(format!("d{}/f{i}.txt", i % 4)), i, DAY * 800);
    }
    let criteria = FilterCriteria::new(["txt"], AgeSelector::TwoYears);

    let first = relative_names(tmp.path(), &scan_sync(tmp.path(), &criteria).0.unwrap());
    let second = relative_names(tmp.path(), &scan_sync(tmp.path(), &criteria).0.unwrap());
    assert_eq!(first.len(), 20);
    assert_eq!(first, second);
}

#[test]
fn trailing_separator_on_root_is_ignored() {
    let tmp = TempDir::new().unwrap();
    build_scenario_tree(tmp.path());
    let with_slash = PathBuf::from(format!("{}/", tmp.path().display()));

    let criteria = FilterCriteria::new(["csv"], AgeSelector::OneYear);
    let (result, _) = scan_sync(&with_slash, &criteria);
    let candidates = result.unwrap();
    assert_eq!(relative_names(tmp.path(), &candidates), vec!["b.csv"]);
    assert!(candidates[0].path().starts_with(normalize_root(tmp.path()).unwrap()));
}

// ── Validation ───────────────────────────────────────────────────────────────

#[test]
fn directory_without_files_is_no_files_found() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("a/b")).unwrap();
    let criteria = FilterCriteria::new(["txt"], AgeSelector::Today);

    let (result, ticks) = scan_sync(tmp.path(), &criteria);
    assert!(matches!(
        result,
        Err(ScanError::Validation(ValidationError::NoFilesFound(_)))
    ));
    assert!(ticks.is_empty());
}

#[cfg(unix)]
#[test]
fn volume_root_is_rejected_synchronously() {
    let scanner = Scanner::new();
    let err = scanner
        .start("/", FilterCriteria::new(["txt"], AgeSelector::Today))
        .err()
        .expect("scan of / must be rejected");
    assert!(matches!(
        err,
        ScanError::Validation(ValidationError::RootRejected(_))
    ));
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(!scanner.is_busy(), "a rejected start must not leave the scanner busy");
}

#[test]
fn missing_root_is_rejected_synchronously() {
    let tmp = TempDir::new().unwrap();
    let scanner = Scanner::new();
    let err = scanner
        .start(tmp.path().join("missing"), FilterCriteria::default())
        .err()
        .expect("missing root must be rejected");
    assert!(matches!(
        err,
        ScanError::Validation(ValidationError::NotFound(_))
    ));
}

// ── Progress ─────────────────────────────────────────────────────────────────

#[test]
fn ticks_are_ordered_and_never_reach_100() {
    let tmp = TempDir::new().unwrap();
    for i in 0..37 {
        write_file(&tmp.path().join(format!("f{i}.txt")), 1, Duration::ZERO);
    }
    fs::create_dir(tmp.path().join("only_a_dir")).unwrap();

    let criteria = FilterCriteria::new(["txt"], AgeSelector::Today);
    let (result, ticks) = scan_sync(tmp.path(), &criteria);
    result.unwrap();

    assert_eq!(ticks.len(), 37, "one tick per regular file, none for directories");
    for (i, tick) in ticks.iter().enumerate() {
        assert_eq!(tick.examined, i as u64 + 1);
        assert_eq!(tick.total, 37);
        assert!(tick.percent() <= MAX_TICK_PERCENT);
        assert!(tick.current_path.is_some());
    }
    assert!(ticks.windows(2).all(|w| w[0].percent() <= w[1].percent()));
    assert_eq!(ticks.last().unwrap().percent(), 99);
}

#[test]
fn background_scan_streams_ticks_then_one_terminal_message() {
    let tmp = TempDir::new().unwrap();
    build_scenario_tree(tmp.path());

    let scanner = Scanner::new();
    let handle = scanner
        .start(tmp.path(), FilterCriteria::new(["txt", "csv"], AgeSelector::TwoYears))
        .unwrap();

    let deadline = std::time::Instant::now() + Duration::from_secs(30);
    let mut started_total = None;
    let mut last_examined = 0;
    let mut terminal = None;
    while terminal.is_none() {
        let msg = handle
            .progress_rx
            .recv_deadline(deadline)
            .expect("scanner did not finish within 30 seconds");
        match msg {
            ScanMessage::Started { total } => started_total = Some(total),
            ScanMessage::Tick(tick) => {
                assert!(tick.examined > last_examined);
                last_examined = tick.examined;
            }
            other => terminal = Some(other),
        }
    }

    assert_eq!(started_total, Some(3));
    assert_eq!(last_examined, 3);
    match terminal {
        Some(ScanMessage::Complete {
            candidates,
            examined,
            ..
        }) => {
            assert_eq!(examined, 3);
            assert_eq!(relative_names(tmp.path(), &candidates), vec!["b.csv"]);
        }
        other => panic!("expected Complete, got {other:?}"),
    }

    // The thread drops its sender after the terminal message.
    assert!(handle
        .progress_rx
        .recv_timeout(Duration::from_secs(30))
        .is_err());
}

#[test]
fn background_failure_is_delivered_as_terminal_message() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("empty")).unwrap();

    let handle = Scanner::new()
        .start(tmp.path(), FilterCriteria::new(["txt"], AgeSelector::Today))
        .unwrap();
    let result = handle.wait_timeout(Duration::from_secs(30));
    assert!(matches!(
        result,
        Err(ScanError::Validation(ValidationError::NoFilesFound(_)))
    ));
}

// ── Concurrency ──────────────────────────────────────────────────────────────

#[test]
fn second_scan_is_rejected_while_first_is_running() {
    let tmp = TempDir::new().unwrap();
    build_wide_tree(tmp.path());
    let criteria = FilterCriteria::new(["log"], AgeSelector::Today);

    let scanner = Scanner::new();
    let first = scanner.start(tmp.path(), criteria.clone()).unwrap();
    // Nobody drains `first`, so it blocks on the full channel and stays busy.
    assert!(scanner.is_busy());
    assert!(matches!(
        scanner.start(tmp.path(), criteria.clone()),
        Err(ScanError::AlreadyRunning)
    ));
    // Clones share the guard.
    assert!(matches!(
        scanner.clone().start(tmp.path(), criteria.clone()),
        Err(ScanError::AlreadyRunning)
    ));

    first.cancel();
    let _ = first.wait();
    assert!(!scanner.is_busy());

    let again = scanner.start(tmp.path(), criteria).unwrap();
    assert_eq!(again.wait().unwrap().len(), PROGRESS_CHANNEL_CAPACITY + 500);
}

#[test]
fn cancellation_ends_with_cancelled() {
    let tmp = TempDir::new().unwrap();
    build_wide_tree(tmp.path());

    let handle = Scanner::new()
        .start(tmp.path(), FilterCriteria::new(["log"], AgeSelector::Today))
        .unwrap();
    // The channel cannot hold every tick, so the scan cannot have finished yet.
    handle.cancel();
    assert!(handle.is_cancelled());

    let result = handle.wait_timeout(Duration::from_secs(30));
    assert!(matches!(result, Err(ScanError::Cancelled)));
}

#[test]
fn scanner_is_reusable_after_completion() {
    let tmp = TempDir::new().unwrap();
    build_scenario_tree(tmp.path());
    let scanner = Scanner::new();
    let criteria = FilterCriteria::new(["bin"], AgeSelector::OneYear);

    for _ in 0..3 {
        let handle = scanner.start(tmp.path(), criteria.clone()).unwrap();
        let found = handle.wait_timeout(Duration::from_secs(30)).unwrap();
        assert_eq!(relative_names(tmp.path(), &found), vec!["c.bin"]);
    }
}
