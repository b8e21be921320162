//! Runs the pure status machine against real timers.
//!
//! The machine in `brandassoc-core` only emits [`Action`]s. This driver
//! executes them: it publishes every transition on a `watch` channel and
//! owns the single outstanding reset timer.

use std::sync::Arc;

use brandassoc_core::{Action, ResetDelays, StatusEvent, StatusMachine, TxStatus};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

pub(crate) struct StatusDriver {
    machine: Mutex<StatusMachine>,
    published: watch::Sender<TxStatus>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl StatusDriver {
    pub(crate) fn new(delays: ResetDelays) -> Arc<Self> {
        let (published, _) = watch::channel(TxStatus::Idle);
        Arc::new(Self {
            machine: Mutex::new(StatusMachine::new(delays)),
            published,
            timer: Mutex::new(None),
        })
    }

    pub(crate) fn current(&self) -> TxStatus {
        self.published.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<TxStatus> {
        self.published.subscribe()
    }

    /// Enter `Pending` unless a write is already pending.
    ///
    /// Returns the generation of the new cycle.
    pub(crate) async fn try_submit(self: &Arc<Self>, message: &str) -> Option<u64> {
        let (actions, generation) = {
            let mut machine = self.machine.lock().await;
            if machine.is_pending() {
                return None;
            }
            let actions = self.step(
                &mut machine,
                StatusEvent::Submitted {
                    message: message.to_string(),
                },
            );
            (actions, machine.generation())
        };
        self.run(actions).await;
        Some(generation)
    }

    pub(crate) async fn apply(self: &Arc<Self>, event: StatusEvent) {
        let actions = {
            let mut machine = self.machine.lock().await;
            self.step(&mut machine, event)
        };
        self.run(actions).await;
    }

    fn step(&self, machine: &mut StatusMachine, event: StatusEvent) -> Vec<Action> {
        let (next, actions) = std::mem::take(machine).on_event(event);
        *machine = next;
        self.published.send_replace(machine.status().clone());
        actions
    }

    async fn run(self: &Arc<Self>, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::CancelReset => {
                    if let Some(handle) = self.timer.lock().await.take() {
                        handle.abort();
                    }
                }
                Action::ScheduleReset { delay, generation } => {
                    let driver = Arc::clone(self);
                    let handle = tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        driver.fire_reset(generation).await;
                    });
                    if let Some(previous) = self.timer.lock().await.replace(handle) {
                        previous.abort();
                    }
                }
            }
        }
    }

    async fn fire_reset(&self, generation: u64) {
        let mut machine = self.machine.lock().await;
        // A reset never schedules anything further
        let _ = self.step(&mut machine, StatusEvent::ResetTimerFired { generation });
        tracing::debug!("status reset fired for cycle {}", generation);
    }
}
