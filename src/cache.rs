//! Identity caches for processes and users.
//!
//! Resolving a command line or a user name costs file reads or a user
//! database lookup, so each pid and uid is resolved once and then shared by
//! every record that refers to it. Entries are never evicted during a run.

use ahash::AHashMap as HashMap;
use nix::unistd::{Uid, User};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::trace;

use crate::error::{Error, Result};
use crate::process::stat::{read_cmdline, read_comm, CommandStyle};

/// Initial bucket counts, sized for a few hundred processes and users.
const PROC_CACHE_CAPACITY: usize = 503;
const USER_CACHE_CAPACITY: usize = 521;

/// Memoized command information for one pid.
#[derive(Debug, PartialEq, Eq)]
pub struct ProcessIdentity {
    pub pid: i32,
    pub command: String,
    pub kernel_thread: bool,
}

/// Memoized display name for one uid.
#[derive(Debug, PartialEq, Eq)]
pub struct UserIdentity {
    pub uid: u32,
    pub name: String,
}

/// How commands are resolved on a cache miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityOptions {
    pub style: CommandStyle,
    pub strip_dirname: bool,
}

/// Both identity tables plus what they need to fill a miss.
#[derive(Debug)]
pub struct IdentityCaches {
    proc_root: PathBuf,
    options: IdentityOptions,
    processes: HashMap<i32, Rc<ProcessIdentity>>,
    users: HashMap<u32, Rc<UserIdentity>>,
}

impl IdentityCaches {
    pub fn new(proc_root: impl Into<PathBuf>, options: IdentityOptions) -> Self {
        Self {
            proc_root: proc_root.into(),
            options,
            processes: HashMap::with_capacity(PROC_CACHE_CAPACITY),
            users: HashMap::with_capacity(USER_CACHE_CAPACITY),
        }
    }

    /// Looks up a pid, resolving and caching it on a miss. `Ok(None)` means the
    /// process no longer exists.
    pub fn find_process_identity(&mut self, pid: i32) -> Result<Option<Rc<ProcessIdentity>>> {
        if let Some(found) = self.processes.get(&pid) {
            return Ok(Some(Rc::clone(found)));
        }

        let proc_path = self.proc_root.join(pid.to_string());
        if !proc_path.exists() {
            return Ok(None);
        }

        let identity = Rc::new(resolve_process(pid, &proc_path, self.options));
        trace!(
            "Cached pid {} as {:?} (kernel thread: {})",
            pid,
            identity.command,
            identity.kernel_thread
        );

        self.processes
            .try_reserve(1)
            .map_err(|_| Error::OutOfMemory("allocating proc cache"))?;
        self.processes.insert(pid, Rc::clone(&identity));
        Ok(Some(identity))
    }

    /// Looks up a uid, resolving and caching it on a miss. Unknown uids are
    /// shown numerically.
    pub fn find_user_identity(&mut self, uid: u32) -> Result<Rc<UserIdentity>> {
        if let Some(found) = self.users.get(&uid) {
            return Ok(Rc::clone(found));
        }

        let name = match User::from_uid(Uid::from_raw(uid)) {
            Ok(Some(user)) => user.name,
            _ => uid.to_string(),
        };
        let identity = Rc::new(UserIdentity { uid, name });

        self.users
            .try_reserve(1)
            .map_err(|_| Error::OutOfMemory("allocating pwd cache item"))?;
        self.users.insert(uid, Rc::clone(&identity));
        Ok(identity)
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

fn resolve_process(pid: i32, proc_path: &Path, options: IdentityOptions) -> ProcessIdentity {
    let cmdline = read_cmdline(proc_path, options.style, options.strip_dirname);
    let kernel_thread = cmdline.is_none();

    let command = match cmdline {
        Some(cmd) if options.style != CommandStyle::Comm => cmd,
        _ => read_comm(proc_path).unwrap_or_else(|| "<unknown>".to_string()),
    };

    ProcessIdentity {
        pid,
        command,
        kernel_thread,
    }
}
