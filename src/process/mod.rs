//! Process-table access.
//!
//! This module provides:
//! - `stat`: parsers for `/proc/<pid>/{stat,status,cmdline,comm}`
//! - `filter`: the operator's pid/name allow-list
//! - `scanner`: one full pass over the process table per tick

pub mod filter;
pub mod scanner;
pub mod stat;

// Re-export commonly used types
pub use filter::{FilterEntry, ProcessFilter};
pub use scanner::{collect_pids, Scanner, DEFAULT_PROC_ROOT};
pub use stat::{parse_stat, parse_status, shape_cmdline, CommandStyle, ProcStat, ProcStatus};
