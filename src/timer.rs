use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;

use crate::controller::InternalEvent;

/// Tick source for the per-question countdown: one tick per second into the
/// controller's internal channel until cancelled. The seconds-remaining
/// bookkeeping lives in `RunState`; this type only owns the task lifecycle,
/// so at most one tick source exists per timer at any time.
///
/// Ticks are tagged with the controller generation current at start; a tick
/// from an aborted-but-already-queued task fails that check and is dropped.
pub struct QuestionTimer {
    tick_task: Option<AbortHandle>,
}

impl QuestionTimer {
    pub fn new() -> Self {
        Self { tick_task: None }
    }

    /// Begin ticking. An already-running tick source is stopped first, so
    /// starting twice never produces overlapping timers.
    pub fn start(&mut self, internal_tx: UnboundedSender<InternalEvent>, generation: u64) {
        self.cancel();
        let task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                if internal_tx
                    .send(InternalEvent::TimerTick { generation })
                    .is_err()
                {
                    break;
                }
            }
        });
        self.tick_task = Some(task.abort_handle());
    }

    /// Suspend tick delivery. Seconds already elapsed stay spent; ticks that
    /// would have fired while paused are simply never delivered.
    pub fn pause(&mut self) {
        self.cancel();
    }

    /// Continue a paused countdown. The next tick lands a full second after
    /// the resume, there is no catch-up.
    pub fn resume(&mut self, internal_tx: UnboundedSender<InternalEvent>, generation: u64) {
        self.start(internal_tx, generation);
    }

    /// Stop ticking. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.tick_task.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.tick_task.is_some()
    }
}

impl Default for QuestionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for QuestionTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
