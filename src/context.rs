//! Mutable run-wide settings.
//!
//! Built once from the resolved configuration and then owned by the
//! sampling loop. Keystrokes and signals change it only at the loop's
//! suspension points.

use serde::{Deserialize, Serialize};

use crate::display::WindowSize;
use crate::format::MIN_PID_WIDTH;
use crate::input::KeyCommand;
use crate::ranking::{DumpMode, SortMetric};

/// Shape of each rendered tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct RunContext {
    /// Show `^`/`v` next to processes whose fault count moved.
    pub arrows: bool,
    /// Show every process with running totals instead of changes only.
    pub totals: bool,
    /// Full-screen dashboard.
    pub top: bool,
    pub sort: SortMetric,
    pub format: OutputFormat,
    pub pid_width: usize,
    pub window: WindowSize,
    /// Set by a quit keystroke or a stop signal.
    pub stop: bool,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            arrows: false,
            totals: false,
            top: false,
            sort: SortMetric::default(),
            format: OutputFormat::default(),
            pid_width: MIN_PID_WIDTH,
            window: WindowSize::UNBOUNDED,
            stop: false,
        }
    }
}

impl RunContext {
    /// Dump mode for a tick that has a predecessor.
    pub fn dump_mode(&self) -> DumpMode {
        if self.totals || self.format == OutputFormat::Json {
            DumpMode::Totals
        } else {
            DumpMode::Changes
        }
    }

    /// Applies one keystroke.
    pub fn apply_key(&mut self, key: KeyCommand) {
        match key {
            KeyCommand::Quit => self.stop = true,
            KeyCommand::ToggleArrows => self.arrows = !self.arrows,
            KeyCommand::ToggleTotals => self.totals = !self.totals,
            KeyCommand::NextSort => self.sort = self.sort.next(),
        }
    }
}
