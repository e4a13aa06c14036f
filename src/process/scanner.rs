//! Process table scanning.
//!
//! One pass over the numeric entries of the process table produces a fresh
//! [`RecordList`] for the current tick. Processes that exit while being read,
//! kernel threads and processes outside the filter are skipped silently.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::cache::{IdentityCaches, IdentityOptions};
use crate::error::{Error, Result};
use crate::pool::{RecordId, RecordList, RecordPool};
use crate::process::filter::ProcessFilter;
use crate::process::stat::{read_stat, read_status};

/// Default location of the process table.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Lists the numeric entries of the process table.
pub fn collect_pids(root: &Path) -> Result<Vec<i32>> {
    let entries = fs::read_dir(root).map_err(|source| Error::ProcTable {
        path: root.to_path_buf(),
        source,
    })?;

    let mut out = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = match name.to_str() {
            Some(v) => v,
            None => continue,
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if let Ok(pid) = name.parse() {
            out.push(pid);
        }
    }
    Ok(out)
}

/// Produces sample records for every visible, non-kernel process.
#[derive(Debug)]
pub struct Scanner {
    proc_root: PathBuf,
    caches: IdentityCaches,
    filter: Option<ProcessFilter>,
}

impl Scanner {
    pub fn new(
        proc_root: impl Into<PathBuf>,
        options: IdentityOptions,
        filter: Option<ProcessFilter>,
    ) -> Self {
        let proc_root = proc_root.into();
        Self {
            caches: IdentityCaches::new(proc_root.clone(), options),
            proc_root,
            filter: filter.filter(|f| !f.is_empty()),
        }
    }

    pub fn caches(&self) -> &IdentityCaches {
        &self.caches
    }

    /// Scans the whole process table. Only an unreadable table or an
    /// allocation failure is an error.
    pub fn scan(&mut self, pool: &mut RecordPool) -> Result<RecordList> {
        let pids = collect_pids(&self.proc_root)?;
        let mut list = RecordList::new();

        for pid in pids {
            if let Some(id) = self.sample_pid(pid, pool)? {
                list.push(id);
            }
        }

        debug!("Scanned {} processes from {}", list.len(), self.proc_root.display());
        Ok(list)
    }

    fn sample_pid(&mut self, pid: i32, pool: &mut RecordPool) -> Result<Option<RecordId>> {
        let proc_path = self.proc_root.join(pid.to_string());

        let stat = match read_stat(&proc_path) {
            Ok(s) => s,
            Err(e) => {
                trace!("pid {} vanished before stat could be read: {}", pid, e);
                return Ok(None);
            }
        };
        if stat.pgrp == 0 {
            return Ok(None);
        }

        let identity = match self.caches.find_process_identity(pid)? {
            Some(identity) => identity,
            None => return Ok(None),
        };
        if identity.kernel_thread {
            return Ok(None);
        }

        if let Some(filter) = &self.filter {
            if !filter.matches(pid, &identity.command) {
                return Ok(None);
            }
        }

        let status = match read_status(&proc_path) {
            Ok(s) => s,
            Err(e) => {
                trace!("pid {} vanished before status could be read: {}", pid, e);
                return Ok(None);
            }
        };
        let uid = status.uid.unwrap_or(0);
        let user = self.caches.find_user_identity(uid)?;

        let id = pool.acquire()?;
        let record = pool.get_mut(id);
        record.pid = pid;
        record.uid = uid;
        record.minor = stat.minor;
        record.major = stat.major;
        record.swap = status.swap_kb;
        record.process = Some(identity);
        record.user = Some(user);

        Ok(Some(id))
    }
}
