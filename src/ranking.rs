//! Delta computation and ranking between two consecutive ticks.
//!
//! Each new record is matched with the previous tick's record of the same
//! pid to get its deltas; previous records that found no match belong to
//! processes that exited and are reported with their counters subtracted
//! out. Records are then threaded into one descending order under the
//! active [`SortMetric`].

use serde::{Deserialize, Serialize};

use crate::pool::{RecordId, RecordList, RecordPool, SampleRecord};

/// Key the ranked list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMetric {
    #[default]
    MajorMinor,
    Major,
    Minor,
    DeltaMajorMinor,
    DeltaMajor,
    DeltaMinor,
    Swap,
}

/// Numeric columns of the text table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Major,
    Minor,
    DeltaMajor,
    DeltaMinor,
    Swap,
}

impl SortMetric {
    pub const ALL: [SortMetric; 7] = [
        SortMetric::MajorMinor,
        SortMetric::Major,
        SortMetric::Minor,
        SortMetric::DeltaMajorMinor,
        SortMetric::DeltaMajor,
        SortMetric::DeltaMinor,
        SortMetric::Swap,
    ];

    /// The metric after this one, wrapping to the first.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn key(self, rec: &SampleRecord) -> i64 {
        match self {
            SortMetric::MajorMinor => rec.total_faults(),
            SortMetric::Major => rec.major,
            SortMetric::Minor => rec.minor,
            SortMetric::DeltaMajorMinor => rec.total_delta(),
            SortMetric::DeltaMajor => rec.delta_major,
            SortMetric::DeltaMinor => rec.delta_minor,
            SortMetric::Swap => rec.swap,
        }
    }

    /// Strict less-than on this metric's key.
    pub fn less(self, a: &SampleRecord, b: &SampleRecord) -> bool {
        self.key(a) < self.key(b)
    }

    /// Whether `column` feeds this metric's key.
    pub fn uses(self, column: Column) -> bool {
        matches!(
            (self, column),
            (SortMetric::MajorMinor, Column::Major | Column::Minor)
                | (SortMetric::Major, Column::Major)
                | (SortMetric::Minor, Column::Minor)
                | (
                    SortMetric::DeltaMajorMinor,
                    Column::DeltaMajor | Column::DeltaMinor
                )
                | (SortMetric::DeltaMajor, Column::DeltaMajor)
                | (SortMetric::DeltaMinor, Column::DeltaMinor)
                | (SortMetric::Swap, Column::Swap)
        )
    }
}

/// Which records a dump shows and how exited processes count in the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpMode {
    /// Every record with absolute columns; the single snapshot.
    Full,
    /// Every record, zero deltas included; running totals and JSON output.
    Totals,
    /// Only records whose combined delta is non-zero, plus exited processes.
    Changes,
}

impl DumpMode {
    fn shows(self, rec: &SampleRecord) -> bool {
        self != DumpMode::Changes || rec.total_delta() != 0
    }
}

/// Column sums over the ranked records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub major: i64,
    pub minor: i64,
    pub delta_major: i64,
    pub delta_minor: i64,
    pub swap: i64,
}

impl Totals {
    fn add(&mut self, rec: &SampleRecord) {
        self.major += rec.major;
        self.minor += rec.minor;
        self.delta_major += rec.delta_major;
        self.delta_minor += rec.delta_minor;
        self.swap += rec.swap;
    }
}

/// Ranked view over pool records; highest key first.
#[derive(Debug, Default)]
pub struct Ranking {
    pub order: Vec<RecordId>,
    pub totals: Totals,
}

impl Ranking {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Sets the deltas of `new_id` against the previous tick and flags the
/// matching previous record alive. Unmatched processes grow from zero.
pub fn compute_delta(pool: &mut RecordPool, new_id: RecordId, old: &RecordList) {
    let (pid, major, minor) = {
        let rec = pool.get(new_id);
        (rec.pid, rec.major, rec.minor)
    };

    let previous = old.iter().find(|&id| pool.get(id).pid == pid);

    let (delta_major, delta_minor) = match previous {
        Some(old_id) => {
            let prev = pool.get_mut(old_id);
            prev.alive = true;
            (major - prev.major, minor - prev.minor)
        }
        None => (major, minor),
    };

    let rec = pool.get_mut(new_id);
    rec.delta_major = delta_major;
    rec.delta_minor = delta_minor;
}

/// Turns a previous-tick record of an exited process into its display form:
/// negative deltas, zeroed absolute counters. Returns the last-known
/// `(major, minor)`.
fn retire(rec: &mut SampleRecord) -> (i64, i64) {
    let last = (rec.major, rec.minor);
    rec.delta_major = -rec.major;
    rec.delta_minor = -rec.minor;
    rec.major = 0;
    rec.minor = 0;
    rec.swap = 0;
    last
}

/// Inserts `id` before the first ranked record that is strictly less than
/// it, so equal keys keep insertion order.
fn insert_sorted(order: &mut Vec<RecordId>, pool: &RecordPool, id: RecordId, metric: SortMetric) {
    let rec = pool.get(id);
    let pos = order
        .iter()
        .position(|&other| metric.less(pool.get(other), rec))
        .unwrap_or(order.len());
    order.insert(pos, id);
}

/// Computes deltas for `new` against `old` and ranks the result.
pub fn rank(
    pool: &mut RecordPool,
    new: &RecordList,
    old: &RecordList,
    metric: SortMetric,
    mode: DumpMode,
) -> Ranking {
    let mut ranking = Ranking::default();

    for id in new.iter() {
        compute_delta(pool, id, old);
        let rec = pool.get(id);
        if !mode.shows(rec) {
            continue;
        }
        ranking.totals.add(rec);
        insert_sorted(&mut ranking.order, pool, id, metric);
    }

    for id in old.iter() {
        if pool.get(id).alive {
            continue;
        }

        let (last_major, last_minor) = retire(pool.get_mut(id));
        let rec = pool.get(id);
        ranking.totals.delta_major += rec.delta_major;
        ranking.totals.delta_minor += rec.delta_minor;
        match mode {
            DumpMode::Full | DumpMode::Totals => {
                ranking.totals.major += last_major;
                ranking.totals.minor += last_minor;
            }
            DumpMode::Changes => {
                ranking.totals.major -= last_major;
                ranking.totals.minor -= last_minor;
            }
        }
        insert_sorted(&mut ranking.order, pool, id, metric);
    }

    ranking
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pool: &mut RecordPool, list: &mut RecordList, pid: i32, major: i64, minor: i64) {
        let id = pool.acquire().unwrap();
        let rec = pool.get_mut(id);
        rec.pid = pid;
        rec.major = major;
        rec.minor = minor;
        list.push(id);
    }

    #[test]
    fn test_next_wraps_around() {
        let mut metric = SortMetric::MajorMinor;
        for _ in 0..SortMetric::ALL.len() {
            metric = metric.next();
        }
        assert_eq!(metric, SortMetric::MajorMinor);
        assert_eq!(SortMetric::DeltaMinor.next(), SortMetric::Swap);
        assert_eq!(SortMetric::Swap.next(), SortMetric::MajorMinor);
    }

    #[test]
    fn test_uses_highlights_feeding_columns() {
        assert!(SortMetric::MajorMinor.uses(Column::Major));
        assert!(SortMetric::MajorMinor.uses(Column::Minor));
        assert!(!SortMetric::MajorMinor.uses(Column::DeltaMajor));
        assert!(SortMetric::DeltaMajor.uses(Column::DeltaMajor));
        assert!(!SortMetric::DeltaMajor.uses(Column::DeltaMinor));
        assert!(SortMetric::Swap.uses(Column::Swap));
    }

    #[test]
    fn test_new_process_grows_from_zero() {
        let mut pool = RecordPool::new();
        let mut new = RecordList::new();
        record(&mut pool, &mut new, 10, 4, 9);

        let ranking = rank(&mut pool, &new, &RecordList::new(), SortMetric::Major, DumpMode::Totals);
        let rec = pool.get(ranking.order[0]);
        assert_eq!(rec.delta_major, 4);
        assert_eq!(rec.delta_minor, 9);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut pool = RecordPool::new();
        let mut new = RecordList::new();
        record(&mut pool, &mut new, 1, 5, 0);
        record(&mut pool, &mut new, 2, 5, 0);
        record(&mut pool, &mut new, 3, 9, 0);

        let ranking = rank(&mut pool, &new, &RecordList::new(), SortMetric::Major, DumpMode::Full);
        let pids: Vec<i32> = ranking.order.iter().map(|&id| pool.get(id).pid).collect();
        assert_eq!(pids, vec![3, 1, 2]);
    }

    #[test]
    fn test_changes_mode_hides_idle_processes() {
        let mut pool = RecordPool::new();
        let mut old = RecordList::new();
        record(&mut pool, &mut old, 1, 5, 5);
        record(&mut pool, &mut old, 2, 5, 5);
        let mut new = RecordList::new();
        record(&mut pool, &mut new, 1, 5, 5);
        record(&mut pool, &mut new, 2, 6, 5);

        let ranking = rank(&mut pool, &new, &old, SortMetric::DeltaMajorMinor, DumpMode::Changes);
        let pids: Vec<i32> = ranking.order.iter().map(|&id| pool.get(id).pid).collect();
        assert_eq!(pids, vec![2]);
        assert_eq!(ranking.totals.delta_major, 1);
        assert_eq!(ranking.totals.major, 6);
    }

    #[test]
    fn test_totals_mode_keeps_idle_processes() {
        let mut pool = RecordPool::new();
        let mut old = RecordList::new();
        record(&mut pool, &mut old, 1, 5, 5);
        let mut new = RecordList::new();
        record(&mut pool, &mut new, 1, 5, 5);

        let ranking = rank(&mut pool, &new, &old, SortMetric::MajorMinor, DumpMode::Totals);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking.totals.major, 5);
        assert_eq!(ranking.totals.delta_major, 0);
    }

    #[test]
    fn test_exited_process_folds_into_totals_per_mode() {
        for (mode, expected_major) in [
            (DumpMode::Totals, 3 + 10),
            (DumpMode::Changes, 10 - 3),
        ] {
            let mut pool = RecordPool::new();
            let mut old = RecordList::new();
            record(&mut pool, &mut old, 200, 3, 1);
            record(&mut pool, &mut old, 300, 8, 0);
            let mut new = RecordList::new();
            record(&mut pool, &mut new, 300, 10, 0);

            let ranking = rank(&mut pool, &new, &old, SortMetric::Major, mode);
            assert_eq!(ranking.len(), 2, "{mode:?}");
            assert_eq!(ranking.totals.major, expected_major, "{mode:?}");
            assert_eq!(ranking.totals.delta_major, 2 - 3, "{mode:?}");
            assert_eq!(ranking.totals.delta_minor, -1, "{mode:?}");
        }
    }
}
