use std::collections::VecDeque;
use std::sync::Arc;

use crate::arena::SnapshotArena;
use crate::backend::InputBackend;
use crate::builder::CaptureSettings;
use crate::error::InputError;
use crate::task::{CaptureContext, CaptureTask, CycleReport};

/// The "schedule a task" capability a surrounding task graph provides.
pub trait Schedule {
    fn schedule(&mut self, task: CaptureTask);
}

/// FIFO of pending capture tasks.
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: VecDeque<CaptureTask>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop(&mut self) -> Option<CaptureTask> {
        self.tasks.pop_front()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Schedule for TaskQueue {
    fn schedule(&mut self, task: CaptureTask) {
        self.tasks.push_back(task);
    }
}

/// Minimal single-owner driver: runs one capture task per step, publishes
/// the result, and chains the follow-up cycle when the task asks for one.
///
/// Pacing between steps is left to the caller.
pub struct CaptureLoop<B> {
    ctx: CaptureContext<B>,
    queue: TaskQueue,
    arena: SnapshotArena,
    cycles: u64,
    shutdown: Option<InputError>,
}

impl<B: InputBackend> CaptureLoop<B> {
    /// Queue cycle 0; `history` is how many snapshots the arena keeps.
    pub fn new(backend: B, settings: CaptureSettings, history: usize) -> Self {
        let mut queue = TaskQueue::new();
        queue.schedule(CaptureTask::first());
        Self {
            ctx: CaptureContext::new(backend, settings),
            queue,
            arena: SnapshotArena::new(history),
            cycles: 0,
            shutdown: None,
        }
    }

    /// Run the next queued cycle. `None` once capture has shut down.
    pub fn step(&mut self) -> Option<CycleReport> {
        let task = self.queue.pop()?;
        let report = task.run(&mut self.ctx);
        self.cycles += 1;

        let retired = self.arena.publish(report.cycle, Arc::clone(&report.snapshot));
        if retired > 0 {
            log::trace!("retired {retired} snapshot(s) before cycle {}", report.cycle);
        }

        match &report.next {
            Some(next) => self.queue.schedule(next.clone().into_task()),
            None => self.shutdown = report.shutdown.clone(),
        }
        Some(report)
    }

    /// Step until the backend ends the session. Returns the number of cycles run.
    pub fn run_to_end(&mut self, mut on_cycle: impl FnMut(&CycleReport)) -> u64 {
        while let Some(report) = self.step() {
            on_cycle(&report);
        }
        self.cycles
    }

    pub fn is_running(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn arena(&self) -> &SnapshotArena {
        &self.arena
    }

    pub fn backend(&self) -> &B {
        self.ctx.backend()
    }

    /// Why capture stopped, once it has.
    pub fn shutdown_reason(&self) -> Option<&InputError> {
        self.shutdown.as_ref()
    }
}
