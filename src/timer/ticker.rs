use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use super::{Timer, TimerEvent, TimerStatus};

pub type SharedTimer = Arc<Mutex<Timer>>;

/// What the ticker reports on each wake-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignal {
    /// Remaining time while running or paused.
    Tick(Duration),
    /// The countdown expired; the ticker stops after sending this.
    Finished(TimerEvent),
}

/// Drives `timer` every `period` until it expires or goes back to idle.
pub fn spawn_ticker(
    timer: SharedTimer,
    period: Duration,
    signals: mpsc::UnboundedSender<TimerSignal>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            let signal = {
                let mut guard = timer.lock().await;
                let now = Instant::now();
                match guard.status() {
                    TimerStatus::Running => match guard.tick(now) {
                        Some(event) => TimerSignal::Finished(event),
                        None => TimerSignal::Tick(guard.remaining(now)),
                    },
                    TimerStatus::Paused => TimerSignal::Tick(guard.remaining(now)),
                    TimerStatus::Idle | TimerStatus::Expired => break,
                }
            };

            let finished = matches!(signal, TimerSignal::Finished(_));
            if signals.send(signal).is_err() || finished {
                break;
            }
        }

        tracing::debug!("⏱️ Ticker stopped");
    })
}
