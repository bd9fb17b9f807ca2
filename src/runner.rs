//! Cancellable periodic tick tasks.
//!
//! The reference implementation runs its simulators as unstoppable
//! sleep-loops; here each simulator is driven by a tokio interval and a
//! watch-channel stop signal, so shutdown is deterministic and testable.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, trace};

use crate::simulators::Simulator;

/// Broadcasts the stop request to every periodic task and the server.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Tell all subscribers to finish their current tick and exit.
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive `sim.tick()` every `period` until the shutdown signal fires.
///
/// Ticks are synchronous and brief; no bank lock is ever held across an
/// await point. A stop request lands between ticks, so a bank is never left
/// mid-write.
pub fn spawn_periodic<S>(
    mut sim: S,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    S: Simulator + 'static,
{
    tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            simulator = sim.name(),
            period_ms = period.as_millis() as u64,
            "simulator started"
        );
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    sim.tick();
                    trace!(simulator = sim.name(), "tick");
                }
                changed = shutdown.changed() => {
                    // A dropped sender counts as a stop request
                    if changed.is_err() || *shutdown.borrow() {
                        info!(simulator = sim.name(), "simulator stopped");
                        return;
                    }
                }
            }
        }
    })
}
