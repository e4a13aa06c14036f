//! Interactive prompts for the sample interval and count.
//!
//! Only used when faultstat is started from a terminal without any
//! arguments. A blank answer or end of input keeps the current value.

use std::io::{self, BufRead, Write};

use crate::config::Config;
use faultstat::sampler::MIN_INTERVAL_SECS;

/// Asks for the interval until a valid one or a blank line is entered.
pub fn prompt_for_interval<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    current: f64,
) -> io::Result<Option<f64>> {
    loop {
        write!(
            out,
            "Enter sample interval in seconds (>= 1, blank keeps {:.1}): ",
            current
        )?;
        out.flush()?;

        let Some(answer) = read_answer(input)? else {
            return Ok(None);
        };
        match answer.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= MIN_INTERVAL_SECS => return Ok(Some(v)),
            _ => writeln!(out, "Invalid interval. Please enter a number >= 1.")?,
        }
    }
}

/// Asks for the sample count until a valid one or a blank line is entered.
/// 0 means continuous.
pub fn prompt_for_count<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<Option<u64>> {
    loop {
        write!(
            out,
            "Enter number of samples (0 for continuous, blank keeps default): "
        )?;
        out.flush()?;

        let Some(answer) = read_answer(input)? else {
            return Ok(None);
        };
        match answer.parse::<u64>() {
            Ok(v) => return Ok(Some(v)),
            Err(_) => writeln!(out, "Invalid count. Please enter a number >= 0.")?,
        }
    }
}

/// Next trimmed line, or `None` on a blank line or end of input.
fn read_answer<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let line = line.trim();
    Ok((!line.is_empty()).then(|| line.to_string()))
}

/// Runs both prompts and folds the answers into `config`. Any answer turns
/// the run into a periodic one.
pub fn apply_prompts<R: BufRead, W: Write>(
    config: &mut Config,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    if let Some(interval) = prompt_for_interval(input, out, config.interval())? {
        config.interval_seconds = Some(interval);
    }
    if let Some(count) = prompt_for_count(input, out)? {
        config.count = Some(count);
        if config.interval_seconds.is_none() {
            config.interval_seconds = Some(config.interval());
        }
    }
    Ok(())
}
