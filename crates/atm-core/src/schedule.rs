//! Cancellable scheduled tasks feeding the kiosk event queue
//!
//! Timers never touch kiosk state directly. A task only posts a
//! [`KioskEvent`] tagged with its [`TaskId`]; the kiosk applies the event
//! only if it still holds a task with that id. Dropping a [`ScheduledTask`]
//! aborts it, so a superseded screen's timers stop with it, and any event
//! already queued is discarded by the id check.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Identity of one scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// Timer events delivered to the kiosk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KioskEvent {
    /// One second of the inactivity countdown elapsed
    SessionTick(TaskId),
    /// Success message shown long enough, go back to the menu
    ReturnToMenu(TaskId),
    /// The PIN lockout should have run out
    LockoutExpired(TaskId),
}

impl KioskEvent {
    pub fn task(&self) -> TaskId {
        match self {
            KioskEvent::SessionTick(id)
            | KioskEvent::ReturnToMenu(id)
            | KioskEvent::LockoutExpired(id) => *id,
        }
    }
}

/// Handle to a running timer task; aborts the task when dropped
#[derive(Debug)]
pub struct ScheduledTask {
    id: TaskId,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Whether this handle produced `event`
    pub fn owns(&self, event: &KioskEvent) -> bool {
        event.task() == self.id
    }

    /// Stop the task now
    pub fn cancel(self) {
        // Drop does the work
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns timer tasks on the current tokio runtime
#[derive(Debug)]
pub struct Scheduler {
    sender: mpsc::UnboundedSender<KioskEvent>,
    next_id: u64,
}

impl Scheduler {
    /// Create a scheduler and the receiving end of its event queue
    pub fn new() -> (Self, mpsc::UnboundedReceiver<KioskEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender, next_id: 0 }, receiver)
    }

    fn allocate(&mut self) -> TaskId {
        self.next_id += 1;
        TaskId(self.next_id)
    }

    /// Post `make(id)` every `period`, first after one full period
    ///
    /// Must be called from within a tokio runtime.
    pub fn every(&mut self, period: Duration, make: fn(TaskId) -> KioskEvent) -> ScheduledTask {
        let id = self.allocate();
        let sender = self.sender.clone();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if sender.send(make(id)).is_err() {
                    break;
                }
            }
        });
        ScheduledTask { id, handle }
    }

    /// Post `make(id)` once after `delay`
    ///
    /// Must be called from within a tokio runtime.
    pub fn after(&mut self, delay: Duration, make: fn(TaskId) -> KioskEvent) -> ScheduledTask {
        let id = self.allocate();
        let sender = self.sender.clone();
        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = sender.send(make(id));
        });
        ScheduledTask { id, handle }
    }
}
