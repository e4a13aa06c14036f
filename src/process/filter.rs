//! Operator-supplied allow-list of pids and process names.

use crate::error::{Error, Result};

/// One allow-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEntry {
    Pid(i32),
    Name(String),
}

/// Flat, immutable allow-list. A process passes when any entry matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessFilter {
    entries: Vec<FilterEntry>,
}

impl ProcessFilter {
    /// Parses a comma separated list. Tokens starting with a digit are pids,
    /// everything else is a name. Duplicate pids are kept once.
    pub fn parse(list: &str) -> Result<Self> {
        let mut filter = Self::default();
        for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            filter.add(token)?;
        }
        Ok(filter)
    }

    /// Builds a filter from already split tokens (e.g. a config file list).
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::default();
        for token in tokens {
            let token = token.as_ref().trim();
            if !token.is_empty() {
                filter.add(token)?;
            }
        }
        Ok(filter)
    }

    fn add(&mut self, token: &str) -> Result<()> {
        if token.starts_with(|c: char| c.is_ascii_digit()) {
            let pid: i32 = token
                .parse()
                .map_err(|_| Error::Filter(format!("invalid pid '{token}'")))?;
            if !self.entries.contains(&FilterEntry::Pid(pid)) {
                self.entries.push(FilterEntry::Pid(pid));
            }
        } else {
            self.entries.push(FilterEntry::Name(token.to_string()));
        }
        Ok(())
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when `pid` is listed or `command` matches a listed name.
    pub fn matches(&self, pid: i32, command: &str) -> bool {
        self.entries.iter().any(|entry| match entry {
            FilterEntry::Pid(p) => *p == pid,
            FilterEntry::Name(name) => name_matches(name, command),
        })
    }
}

/// True when the first word of `command` starts with the first word of
/// `pattern`. Patterns without a `/` are compared against the command's base
/// name.
fn name_matches(pattern: &str, command: &str) -> bool {
    let pattern = first_word(pattern);
    let mut candidate = first_word(command);

    if !pattern.contains('/') {
        candidate = candidate.rsplit('/').next().unwrap_or(candidate);
    }

    !pattern.is_empty() && candidate.starts_with(pattern)
}

fn first_word(s: &str) -> &str {
    s.split(' ').next().unwrap_or("")
}
