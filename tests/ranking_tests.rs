//! Delta and ranking behavior across consecutive ticks.
//!
//! Records are built directly in a pool so every tick is fully controlled.

use faultstat::pool::{RecordList, RecordPool};
use faultstat::ranking::{rank, DumpMode, Ranking, SortMetric};

/// (pid, major, minor, swap)
type Snapshot<'a> = &'a [(i32, i64, i64, i64)];

fn tick(pool: &mut RecordPool, records: Snapshot) -> RecordList {
    let mut list = RecordList::new();
    for &(pid, major, minor, swap) in records {
        let id = pool.acquire().unwrap();
        let rec = pool.get_mut(id);
        rec.pid = pid;
        rec.major = major;
        rec.minor = minor;
        rec.swap = swap;
        list.push(id);
    }
    list
}

fn find(pool: &RecordPool, ranking: &Ranking, pid: i32) -> faultstat::pool::SampleRecord {
    ranking
        .order
        .iter()
        .map(|&id| pool.get(id))
        .find(|rec| rec.pid == pid)
        .cloned()
        .unwrap_or_else(|| panic!("pid {pid} missing from ranking"))
}

// -----------------------------------------------------------------------------
// Deltas
// -----------------------------------------------------------------------------

#[test]
fn test_surviving_process_reports_difference() {
    let mut pool = RecordPool::new();
    let old = tick(&mut pool, &[(100, 5, 10, 0)]);
    let new = tick(&mut pool, &[(100, 7, 10, 0)]);

    let ranking = rank(&mut pool, &new, &old, SortMetric::Major, DumpMode::Totals);

    let rec = find(&pool, &ranking, 100);
    assert_eq!(rec.delta_major, 2);
    assert_eq!(rec.delta_minor, 0);
    assert_eq!(rec.major, 7);
    assert_eq!(pool.get(ranking.order[0]).pid, 100);
}

#[test]
fn test_exited_process_is_subtracted_out() {
    let mut pool = RecordPool::new();
    let old = tick(&mut pool, &[(200, 3, 1, 8), (300, 1, 1, 0)]);
    let new = tick(&mut pool, &[(300, 1, 1, 0)]);

    let ranking = rank(&mut pool, &new, &old, SortMetric::Major, DumpMode::Changes);

    let rec = find(&pool, &ranking, 200);
    assert_eq!(rec.delta_major, -3);
    assert_eq!(rec.delta_minor, -1);
    assert_eq!(rec.major, 0);
    assert_eq!(rec.minor, 0);
    assert_eq!(rec.swap, 0);
}

#[test]
fn test_new_process_uses_zero_baseline() {
    let mut pool = RecordPool::new();
    let old = tick(&mut pool, &[(1, 10, 10, 0)]);
    let new = tick(&mut pool, &[(1, 10, 10, 0), (2, 4, 6, 0)]);

    let ranking = rank(&mut pool, &new, &old, SortMetric::MajorMinor, DumpMode::Totals);

    let rec = find(&pool, &ranking, 2);
    assert_eq!(rec.delta_major, 4);
    assert_eq!(rec.delta_minor, 6);
}

#[test]
fn test_ranking_leaves_counters_of_live_processes_alone() {
    let mut pool = RecordPool::new();
    let old = tick(&mut pool, &[(1, 3, 4, 5)]);
    let new = tick(&mut pool, &[(1, 6, 8, 9)]);

    for metric in SortMetric::ALL {
        let ranking = rank(&mut pool, &new, &old, metric, DumpMode::Totals);
        let rec = find(&pool, &ranking, 1);
        assert_eq!((rec.major, rec.minor, rec.swap), (6, 8, 9), "{metric:?}");
    }
}

// -----------------------------------------------------------------------------
// Ordering
// -----------------------------------------------------------------------------

#[test]
fn test_adjacent_pairs_are_never_ascending() {
    let old_records = [
        (10, 5, 100, 3),
        (11, 0, 0, 0),
        (12, 50, 2, 7),
        (13, 9, 9, 9),
        (14, 1, 300, 0),
        (15, 70, 70, 1),
    ];
    let new_records = [
        (10, 6, 150, 3),
        (11, 0, 0, 0),
        (12, 50, 2, 7),
        (14, 30, 301, 2),
        (16, 2, 2, 40),
        (17, 0, 500, 0),
    ];

    for metric in SortMetric::ALL {
        for mode in [DumpMode::Full, DumpMode::Totals, DumpMode::Changes] {
            let mut pool = RecordPool::new();
            let old = tick(&mut pool, &old_records);
            let new = tick(&mut pool, &new_records);

            let ranking = rank(&mut pool, &new, &old, metric, mode);
            for pair in ranking.order.windows(2) {
                let (first, second) = (pool.get(pair[0]), pool.get(pair[1]));
                assert!(
                    !metric.less(first, second),
                    "{metric:?}/{mode:?}: pid {} ranked above pid {}",
                    first.pid,
                    second.pid
                );
            }
        }
    }
}

#[test]
fn test_equal_keys_keep_scan_order() {
    let mut pool = RecordPool::new();
    let new = tick(&mut pool, &[(3, 1, 0, 0), (1, 1, 0, 0), (2, 1, 0, 0)]);

    let ranking = rank(&mut pool, &new, &RecordList::new(), SortMetric::Major, DumpMode::Full);
    let pids: Vec<i32> = ranking.order.iter().map(|&id| pool.get(id).pid).collect();
    assert_eq!(pids, vec![3, 1, 2]);
}

// -----------------------------------------------------------------------------
// Dump modes and totals
// -----------------------------------------------------------------------------

#[test]
fn test_changes_mode_suppresses_zero_delta() {
    let mut pool = RecordPool::new();
    let old = tick(&mut pool, &[(1, 5, 5, 0), (2, 5, 5, 0), (3, 0, 0, 0)]);
    let new = tick(&mut pool, &[(1, 5, 5, 0), (2, 5, 9, 0)]);

    let ranking = rank(&mut pool, &new, &old, SortMetric::DeltaMajorMinor, DumpMode::Changes);
    let pids: Vec<i32> = ranking.order.iter().map(|&id| pool.get(id).pid).collect();

    // pid 1 did not change; pid 3 exited with zero counters but is still listed.
    assert_eq!(pids, vec![2, 3]);
}

#[test]
fn test_totals_include_exited_processes() {
    let mut pool = RecordPool::new();
    let old = tick(&mut pool, &[(1, 10, 20, 4), (2, 3, 1, 8)]);
    let new = tick(&mut pool, &[(1, 12, 25, 6)]);

    let ranking = rank(&mut pool, &new, &old, SortMetric::MajorMinor, DumpMode::Totals);

    assert_eq!(ranking.totals.major, 12 + 3);
    assert_eq!(ranking.totals.minor, 25 + 1);
    assert_eq!(ranking.totals.delta_major, 2 - 3);
    assert_eq!(ranking.totals.delta_minor, 5 - 1);
    assert_eq!(ranking.totals.swap, 6);
}

#[test]
fn test_pool_storage_is_reused_across_ticks() {
    let mut pool = RecordPool::new();
    let mut previous = tick(&mut pool, &[(1, 1, 1, 0), (2, 2, 2, 0)]);

    for n in 2..10 {
        let current = tick(&mut pool, &[(1, n, n, 0), (2, n * 2, n, 0)]);
        let _ = rank(&mut pool, &current, &previous, SortMetric::Major, DumpMode::Totals);
        pool.release_list(previous);
        previous = current;
    }

    assert_eq!(pool.capacity(), 4);
    assert_eq!(pool.in_use(), 2);
}
