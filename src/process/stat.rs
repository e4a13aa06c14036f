//! Parsers for the per-process files under the process table.
//!
//! - `stat`: process group and fault counters
//! - `status`: `Uid:` and `VmSwap:`
//! - `cmdline` / `comm`: the command shown for a process

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Largest chunk read from `cmdline` or `comm`.
const MAX_COMMAND_BYTES: usize = 4096;

/// Fields picked out of `/proc/<pid>/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcStat {
    pub pgrp: i64,
    pub minor: i64,
    pub major: i64,
}

/// Fields picked out of `/proc/<pid>/status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcStatus {
    pub uid: Option<u32>,
    /// `VmSwap` in kB; 0 when the kernel omits the line.
    pub swap_kb: i64,
}

/// How the command column is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStyle {
    /// First argument of the command line.
    #[default]
    Default,
    /// First argument, cut at the first space.
    Short,
    /// The whole command line.
    Long,
    /// The kernel's `comm` name.
    Comm,
}

/// Parses one `stat` line. The command name sits in parentheses and may
/// itself contain `)` and spaces, so numeric fields start after the last `)`.
pub fn parse_stat(line: &str) -> Option<ProcStat> {
    let comm_end = line.rfind(')')?;
    let fields: Vec<&str> = line[comm_end + 1..].split_ascii_whitespace().collect();

    // fields[0] is field 3 (state): pgrp is field 5, minflt 10, majflt 12
    if fields.len() < 10 {
        return None;
    }

    Some(ProcStat {
        pgrp: fields[2].parse().ok()?,
        minor: fields[7].parse().ok()?,
        major: fields[9].parse().ok()?,
    })
}

pub fn parse_status(content: &str) -> ProcStatus {
    let mut status = ProcStatus::default();
    let mut found = 0;

    for line in content.lines() {
        if let Some(v) = line.strip_prefix("VmSwap:") {
            status.swap_kb = v
                .split_whitespace()
                .next()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            found += 1;
        } else if let Some(v) = line.strip_prefix("Uid:") {
            // real uid is the first of four
            status.uid = v.split_whitespace().next().and_then(|s| s.parse().ok());
            found += 1;
        }

        if found == 2 {
            break;
        }
    }

    status
}

pub fn read_stat(proc_path: &Path) -> Result<ProcStat, std::io::Error> {
    let content = fs::read_to_string(proc_path.join("stat"))?;
    let line = content.lines().next().unwrap_or("");
    parse_stat(line).ok_or_else(|| std::io::Error::other("Invalid stat format"))
}

pub fn read_status(proc_path: &Path) -> Result<ProcStatus, std::io::Error> {
    let content = fs::read_to_string(proc_path.join("status"))?;
    Ok(parse_status(&content))
}

/// Single bounded read, the way the kernel serves these pseudo-files.
fn read_bounded(path: &Path) -> Option<Vec<u8>> {
    let mut file = fs::File::open(path).ok()?;
    let mut buf = vec![0u8; MAX_COMMAND_BYTES];
    let n = file.read(&mut buf).ok()?;
    if n == 0 {
        return None;
    }
    buf.truncate(n);
    Some(buf)
}

/// Reads `comm`, without its trailing newline.
pub fn read_comm(proc_path: &Path) -> Option<String> {
    let raw = read_bounded(&proc_path.join("comm"))?;
    let text = String::from_utf8_lossy(&raw);
    Some(text.strip_suffix('\n').unwrap_or(&text).to_string())
}

/// Reads `cmdline` shaped by `style`. `None` when the process has no command
/// line, which is how kernel threads present themselves.
pub fn read_cmdline(proc_path: &Path, style: CommandStyle, strip_dirname: bool) -> Option<String> {
    let raw = read_bounded(&proc_path.join("cmdline"))?;
    Some(shape_cmdline(&raw, style, strip_dirname))
}

/// Turns raw NUL-separated `cmdline` bytes into the displayed command.
pub fn shape_cmdline(raw: &[u8], style: CommandStyle, strip_dirname: bool) -> String {
    let mut text = if style == CommandStyle::Long {
        let trimmed = raw.strip_suffix(&[0]).unwrap_or(raw);
        let joined: Vec<u8> = trimmed
            .iter()
            .map(|&b| if b == 0 { b' ' } else { b })
            .collect();
        String::from_utf8_lossy(&joined).into_owned()
    } else {
        let first = raw.split(|&b| b == 0).next().unwrap_or(&[]);
        String::from_utf8_lossy(first).into_owned()
    };

    if style == CommandStyle::Short {
        if let Some(pos) = text.find(' ') {
            text.truncate(pos);
        }
    }

    if strip_dirname {
        let word_end = text
            .find(|c: char| c == ' ' || c == '\t')
            .unwrap_or(text.len());
        if let Some(slash) = text[..word_end].rfind('/') {
            text.drain(..=slash);
        }
    }

    text
}
