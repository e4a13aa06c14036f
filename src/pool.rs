//! Recycling store for per-tick sample records.
//!
//! Records live in one growable slab and are addressed by [`RecordId`].
//! Released slots go onto a free list and are handed out again before the
//! slab grows, so a steady-state run stops allocating after the first few
//! ticks.

use std::rc::Rc;

use tracing::debug;

use crate::cache::{ProcessIdentity, UserIdentity};
use crate::error::{Error, Result};

/// One process's fault snapshot for one tick.
#[derive(Debug, Clone, Default)]
pub struct SampleRecord {
    pub pid: i32,
    pub uid: u32,
    pub process: Option<Rc<ProcessIdentity>>,
    pub user: Option<Rc<UserIdentity>>,

    pub minor: i64,
    pub major: i64,
    /// `VmSwap` in kB.
    pub swap: i64,
    pub delta_minor: i64,
    pub delta_major: i64,

    /// Set on a previous-tick record when its pid shows up again.
    pub alive: bool,
}

impl SampleRecord {
    /// Command shown for this record.
    pub fn command(&self) -> &str {
        self.process
            .as_deref()
            .map(|p| p.command.as_str())
            .unwrap_or("<unknown>")
    }

    /// User name shown for this record.
    pub fn user_name(&self) -> &str {
        self.user
            .as_deref()
            .map(|u| u.name.as_str())
            .unwrap_or("<unknown>")
    }

    pub fn total_faults(&self) -> i64 {
        self.major + self.minor
    }

    pub fn total_delta(&self) -> i64 {
        self.delta_major + self.delta_minor
    }
}

/// Handle to a record owned by a [`RecordPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(usize);

/// The records produced by one scan. Order carries no meaning.
#[derive(Debug, Default)]
pub struct RecordList {
    ids: Vec<RecordId>,
}

impl RecordList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: RecordId) {
        self.ids.push(id);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.ids.iter().copied()
    }
}

/// Free-list allocator for [`SampleRecord`]s.
#[derive(Debug, Default)]
pub struct RecordPool {
    slots: Vec<SampleRecord>,
    free: Vec<RecordId>,
}

impl RecordPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out a zeroed record, reusing a released slot when one exists.
    pub fn acquire(&mut self) -> Result<RecordId> {
        if let Some(id) = self.free.pop() {
            self.slots[id.0] = SampleRecord::default();
            return Ok(id);
        }

        self.slots
            .try_reserve(1)
            .map_err(|_| Error::OutOfMemory("allocating page fault tracking information"))?;
        self.slots.push(SampleRecord::default());
        Ok(RecordId(self.slots.len() - 1))
    }

    /// Returns a record to the free list. Its identity references are dropped
    /// immediately.
    pub fn release(&mut self, id: RecordId) {
        debug_assert!(!self.free.contains(&id), "record {id:?} released twice");
        self.slots[id.0] = SampleRecord::default();
        self.free.push(id);
    }

    pub fn release_list(&mut self, list: RecordList) {
        for id in list.ids {
            self.release(id);
        }
    }

    /// Adds `n` spare records to the free list ahead of the first live tick.
    pub fn reserve(&mut self, n: usize) -> Result<()> {
        self.slots
            .try_reserve(n)
            .map_err(|_| Error::OutOfMemory("pre-allocating page fault records"))?;
        self.free
            .try_reserve(n)
            .map_err(|_| Error::OutOfMemory("pre-allocating page fault records"))?;

        let first = self.slots.len();
        self.slots.resize_with(first + n, SampleRecord::default);
        self.free.extend((first..first + n).map(RecordId));
        debug!("Record pool reserved {} spare records ({} total)", n, self.slots.len());
        Ok(())
    }

    /// Frees all backing storage. Every outstanding [`RecordId`] becomes invalid.
    pub fn drain(&mut self) {
        debug!("Draining record pool of {} records", self.slots.len());
        self.slots = Vec::new();
        self.free = Vec::new();
    }

    pub fn get(&self, id: RecordId) -> &SampleRecord {
        &self.slots[id.0]
    }

    pub fn get_mut(&mut self, id: RecordId) -> &mut SampleRecord {
        &mut self.slots[id.0]
    }

    /// Records ever allocated and still backed by the pool.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Records sitting on the free list.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn in_use(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_returns_zeroed_record() {
        let mut pool = RecordPool::new();
        let id = pool.acquire().unwrap();
        {
            let rec = pool.get_mut(id);
            rec.pid = 42;
            rec.major = 7;
            rec.alive = true;
        }
        pool.release(id);

        let again = pool.acquire().unwrap();
        assert_eq!(again, id);
        let rec = pool.get(again);
        assert_eq!(rec.pid, 0);
        assert_eq!(rec.major, 0);
        assert!(!rec.alive);
    }

    #[test]
    fn test_reuse_does_not_grow_backing_storage() {
        let mut pool = RecordPool::new();
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_eq!(pool.capacity(), 2);

        pool.release(a);
        pool.release(b);
        let _ = pool.acquire().unwrap();
        let _ = pool.acquire().unwrap();

        assert_eq!(pool.capacity(), 2);
        assert_eq!(pool.available(), 0);
        assert_eq!(pool.in_use(), 2);
    }

    #[test]
    fn test_release_list_returns_every_record() {
        let mut pool = RecordPool::new();
        let mut list = RecordList::new();
        for _ in 0..5 {
            list.push(pool.acquire().unwrap());
        }
        assert_eq!(pool.in_use(), 5);

        pool.release_list(list);
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.available(), 5);
    }

    #[test]
    fn test_reserve_prepopulates_free_list() {
        let mut pool = RecordPool::new();
        pool.reserve(10).unwrap();
        assert_eq!(pool.capacity(), 10);
        assert_eq!(pool.available(), 10);

        for _ in 0..10 {
            pool.acquire().unwrap();
        }
        assert_eq!(pool.capacity(), 10);

        pool.acquire().unwrap();
        assert_eq!(pool.capacity(), 11);
    }

    #[test]
    fn test_drain_releases_everything() {
        let mut pool = RecordPool::new();
        pool.reserve(4).unwrap();
        pool.acquire().unwrap();
        pool.drain();
        assert_eq!(pool.capacity(), 0);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_record_without_identity_shows_unknown() {
        let rec = SampleRecord::default();
        assert_eq!(rec.command(), "<unknown>");
        assert_eq!(rec.user_name(), "<unknown>");
    }
}
