//! The sampling loop.
//!
//! An explicit state machine drives scan, rank and render on a fixed
//! cadence:
//!
//! ```text
//! Idle -> Waiting -> Sampling -> Rendering -> Waiting -> ... -> Draining -> Stopped
//! Idle -> Draining                                   (single sample)
//! ```
//!
//! Signals and keystrokes are only observed in `Waiting`. Every path ends in
//! `Draining`, which restores the terminal before any error is handed back.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::cadence::Cadence;
use crate::context::{OutputFormat, RunContext};
use crate::display::Display;
use crate::error::{Error, Result};
use crate::input::{KeyCommand, KeySource};
use crate::pool::{RecordList, RecordPool};
use crate::process::Scanner;
use crate::ranking::{rank, DumpMode, Ranking};
use crate::render::{render_json, render_text, Layout, INTERVAL_BANNER};
use crate::signals::LoopEvent;

/// Default pool reserve after the priming sample, in percent of its size.
pub const DEFAULT_PREALLOC_PERCENT: u32 = 125;

/// Shortest accepted sample interval.
pub const MIN_INTERVAL_SECS: f64 = 1.0;

/// How many ticks to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCount {
    /// One absolute snapshot, no loop.
    Once,
    Finite(u64),
    Forever,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Sampling,
    Rendering,
    Waiting,
    Draining,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub interval: Duration,
    pub count: SampleCount,
    pub prealloc_percent: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            count: SampleCount::Once,
            prealloc_percent: DEFAULT_PREALLOC_PERCENT,
        }
    }
}

/// What a finished run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks rendered, the single snapshot included.
    pub ticks: u64,
    /// True when a keystroke or signal ended the run early.
    pub stopped: bool,
}

pub struct Sampler {
    scanner: Scanner,
    pool: RecordPool,
    ctx: RunContext,
    display: Box<dyn Display>,
    keys: Box<dyn KeySource>,
    cadence: Cadence,
    count: SampleCount,
    prealloc_percent: u32,

    previous: Option<RecordList>,
    current: Option<RecordList>,
    started: Instant,
    ticks: u64,
    state: LoopState,
    failure: Option<(LoopState, Error)>,
}

impl Sampler {
    pub fn new(
        scanner: Scanner,
        ctx: RunContext,
        display: Box<dyn Display>,
        keys: Box<dyn KeySource>,
        config: SamplerConfig,
    ) -> Result<Self> {
        let secs = config.interval.as_secs_f64();
        if secs < MIN_INTERVAL_SECS {
            return Err(Error::InvalidInterval(secs));
        }

        Ok(Self {
            scanner,
            pool: RecordPool::new(),
            ctx,
            display,
            keys,
            cadence: Cadence::new(config.interval),
            count: config.count,
            prealloc_percent: config.prealloc_percent,
            previous: None,
            current: None,
            started: Instant::now(),
            ticks: 0,
            state: LoopState::Idle,
            failure: None,
        })
    }

    /// Runs until the sample count is exhausted, a quit key or stop signal
    /// arrives, or a tick fails. The display is torn down in every case.
    pub async fn run(mut self, mut events: mpsc::Receiver<LoopEvent>) -> Result<RunSummary> {
        while self.state != LoopState::Stopped {
            let next = match self.step(&mut events).await {
                Ok(next) => next,
                // Reported only after the display has been torn down.
                Err(e) => {
                    self.failure.get_or_insert((self.state, e));
                    LoopState::Draining
                }
            };
            if next != self.state {
                debug!("Sampling loop {:?} -> {:?}", self.state, next);
            }
            self.state = next;
        }

        match self.failure.take() {
            Some((state, e)) => {
                debug!("Sampling stopped in {:?}: {}", state, e);
                Err(e)
            }
            None => Ok(RunSummary {
                ticks: self.ticks,
                stopped: self.ctx.stop,
            }),
        }
    }

    async fn step(&mut self, events: &mut mpsc::Receiver<LoopEvent>) -> Result<LoopState> {
        match self.state {
            LoopState::Idle => self.prime(),
            LoopState::Waiting => self.wait(events).await,
            LoopState::Sampling => {
                self.current = Some(self.scanner.scan(&mut self.pool)?);
                Ok(LoopState::Rendering)
            }
            LoopState::Rendering => self.render_tick(),
            LoopState::Draining => {
                self.drain();
                Ok(LoopState::Stopped)
            }
            LoopState::Stopped => Ok(LoopState::Stopped),
        }
    }

    /// First sample, taken without a predecessor.
    fn prime(&mut self) -> Result<LoopState> {
        self.display.setup()?;
        self.ctx.window = self.display.window_size(true)?;

        let list = self.scanner.scan(&mut self.pool)?;

        if self.count == SampleCount::Once {
            let ranking = rank(
                &mut self.pool,
                &list,
                &RecordList::new(),
                self.ctx.sort,
                DumpMode::Full,
            );
            self.current = Some(list);
            render_text(
                self.display.as_mut(),
                &self.ctx,
                &self.pool,
                &ranking,
                Layout::Snapshot,
            )?;
            self.display.refresh()?;
            self.ticks = 1;
            return Ok(LoopState::Draining);
        }

        let spare = list.len() * self.prealloc_percent as usize / 100;
        self.pool.reserve(spare)?;
        self.previous = Some(list);

        if !self.display.is_interactive() && self.ctx.format == OutputFormat::Text {
            self.display.print(INTERVAL_BANNER)?;
            self.display.refresh()?;
        }

        self.started = Instant::now();
        Ok(LoopState::Waiting)
    }

    fn exhausted(&self) -> bool {
        match self.count {
            SampleCount::Once => true,
            SampleCount::Finite(n) => self.ticks >= n,
            SampleCount::Forever => false,
        }
    }

    /// Blocks until the next deadline. Resizes are absorbed without ending
    /// the wait; a stop signal ends it and the run.
    async fn wait(&mut self, events: &mut mpsc::Receiver<LoopEvent>) -> Result<LoopState> {
        if self.ctx.stop || self.exhausted() {
            return Ok(LoopState::Draining);
        }

        let offset = self.cadence.next_deadline(self.started.elapsed());
        let deadline = self.started + offset;
        let mut listening = true;

        loop {
            if !listening {
                sleep_until(deadline).await;
                break;
            }
            tokio::select! {
                _ = sleep_until(deadline) => break,
                event = events.recv() => match event {
                    Some(LoopEvent::Resize) => {
                        self.ctx.window = self.display.window_size(true)?;
                        debug!("Window resized to {}x{}", self.ctx.window.cols, self.ctx.window.rows);
                        if Instant::now() >= deadline {
                            break;
                        }
                    }
                    Some(LoopEvent::Stop(name)) => {
                        info!("Received {}, stopping", name);
                        self.ctx.stop = true;
                        return Ok(LoopState::Draining);
                    }
                    None => listening = false,
                },
            }
        }

        if let Some(key) = self.keys.poll_key().and_then(KeyCommand::from_byte) {
            debug!("Key command {:?}", key);
            self.ctx.apply_key(key);
        }

        Ok(LoopState::Sampling)
    }

    fn render_tick(&mut self) -> Result<LoopState> {
        let current = self.current.take().unwrap_or_default();
        let previous = self.previous.take().unwrap_or_default();

        let ranking = rank(
            &mut self.pool,
            &current,
            &previous,
            self.ctx.sort,
            self.ctx.dump_mode(),
        );

        // Exited processes are drawn from the previous list's slots.
        let drawn = self.draw(&ranking);
        self.pool.release_list(previous);
        self.previous = Some(current);
        drawn?;

        self.ticks += 1;
        Ok(LoopState::Waiting)
    }

    fn draw(&mut self, ranking: &Ranking) -> Result<()> {
        self.display.clear()?;
        match self.ctx.format {
            OutputFormat::Json => render_json(
                self.display.as_mut(),
                &self.pool,
                ranking,
                chrono::Utc::now().timestamp(),
            )?,
            OutputFormat::Text => render_text(
                self.display.as_mut(),
                &self.ctx,
                &self.pool,
                ranking,
                Layout::Interval,
            )?,
        }
        self.display.refresh()?;
        Ok(())
    }

    fn drain(&mut self) {
        if let Some(list) = self.previous.take() {
            self.pool.release_list(list);
        }
        if let Some(list) = self.current.take() {
            self.pool.release_list(list);
        }
        self.pool.drain();

        if let Err(e) = self.display.teardown() {
            self.failure.get_or_insert((LoopState::Draining, Error::Display(e)));
        }
    }
}
