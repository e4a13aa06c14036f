//! Tick scheduling.
//!
//! Deadlines are absolute offsets from the loop's start, `tick * interval`,
//! so scan and render time never accumulate as drift. After an overslept
//! deadline the tick index jumps straight to the next future slot.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Cadence {
    interval: Duration,
    tick: u64,
}

impl Cadence {
    pub fn new(interval: Duration) -> Self {
        Self { interval, tick: 1 }
    }

    /// Index of the tick the next call to [`Cadence::next_deadline`] aims for
    /// when nothing is late.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Offset from the start of the run at which the next sample is due,
    /// given `elapsed` since the start. A slot closer than half an interval
    /// after a catch-up is skipped so no sample window degenerates.
    pub fn next_deadline(&mut self, elapsed: Duration) -> Duration {
        let interval = self.interval.as_secs_f64();
        let now = elapsed.as_secs_f64();
        let mut target = self.tick as f64 * interval;

        if target < now {
            self.tick = (now / interval).ceil() as u64;
            target = self.tick as f64 * interval;
            if target - now < interval / 2.0 {
                self.tick += 1;
                target += interval;
            }
        }

        self.tick += 1;
        Duration::from_secs_f64(target)
    }
}
