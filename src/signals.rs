//! Signal delivery as loop events.
//!
//! Each handled signal gets a small task that forwards every delivery into a
//! bounded channel. The sampling loop only looks at that channel while it is
//! waiting for the next tick, so nothing is mutated asynchronously.

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{Error, Result};

/// Event delivered to the sampling loop's wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    /// The terminal changed size.
    Resize,
    /// A signal asked the run to end.
    Stop(&'static str),
}

/// Signals that end the run.
pub const STOP_SIGNALS: &[(libc::c_int, &str)] = &[
    (libc::SIGHUP, "SIGHUP"),
    (libc::SIGINT, "SIGINT"),
    (libc::SIGQUIT, "SIGQUIT"),
    (libc::SIGTERM, "SIGTERM"),
    (libc::SIGUSR1, "SIGUSR1"),
    (libc::SIGUSR2, "SIGUSR2"),
    (libc::SIGXCPU, "SIGXCPU"),
    (libc::SIGXFSZ, "SIGXFSZ"),
    (libc::SIGPWR, "SIGPWR"),
    (libc::SIGVTALRM, "SIGVTALRM"),
];

const EVENT_QUEUE: usize = 16;

/// Forwarding tasks; aborted when dropped.
#[derive(Debug, Default)]
pub struct SignalTasks {
    tasks: Vec<JoinHandle<()>>,
}

impl Drop for SignalTasks {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn forward(
    kind: SignalKind,
    event: LoopEvent,
    tx: mpsc::Sender<LoopEvent>,
) -> Result<JoinHandle<()>> {
    let mut stream = signal(kind).map_err(Error::Signal)?;
    Ok(tokio::spawn(async move {
        while stream.recv().await.is_some() {
            if tx.send(event).await.is_err() {
                break;
            }
        }
    }))
}

/// Registers the stop signals and `SIGWINCH`. Must be called from inside a
/// tokio runtime.
pub fn install() -> Result<(SignalTasks, mpsc::Receiver<LoopEvent>)> {
    let (tx, rx) = mpsc::channel(EVENT_QUEUE);
    let mut tasks = SignalTasks::default();

    tasks.tasks.push(forward(
        SignalKind::window_change(),
        LoopEvent::Resize,
        tx.clone(),
    )?);
    for &(raw, name) in STOP_SIGNALS {
        tasks.tasks.push(forward(
            SignalKind::from_raw(raw),
            LoopEvent::Stop(name),
            tx.clone(),
        )?);
    }

    debug!("Installed {} signal handlers", tasks.tasks.len());
    Ok((tasks, rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sigusr1_arrives_as_stop_event() {
        let (_tasks, mut rx) = install().unwrap();

        // SAFETY: raising a signal that has a registered handler.
        unsafe { libc::raise(libc::SIGUSR1) };

        let event = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .expect("signal not delivered");
        assert_eq!(event, Some(LoopEvent::Stop("SIGUSR1")));
    }

    #[test]
    fn test_stop_signal_names_are_unique() {
        let mut names: Vec<&str> = STOP_SIGNALS.iter().map(|(_, n)| *n).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), STOP_SIGNALS.len());
    }
}
