use std::sync::Arc;

use crate::adapter::CallbackAdapter;
use crate::backend::{EventKind, InputBackend, PumpStatus};
use crate::builder::{CaptureSettings, SnapshotBuilder};
use crate::error::InputError;
use crate::snapshot::InputSnapshot;

/// The backend plus the state that outlives individual cycles.
///
/// Capture tasks borrow this mutably while they run, which is what keeps
/// two cycles from ever pumping the backend at once.
pub struct CaptureContext<B> {
    backend: B,
    settings: CaptureSettings,
    registered: bool,
}

impl<B: InputBackend> CaptureContext<B> {
    pub fn new(backend: B, settings: CaptureSettings) -> Self {
        Self {
            backend,
            settings,
            registered: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    fn ensure_registered(&mut self) -> Result<(), InputError> {
        if !self.registered {
            self.backend.register(EventKind::ALL)?;
            self.registered = true;
            log::info!("registered input callbacks ({} kinds)", EventKind::ALL.len());
        }
        Ok(())
    }
}

/// One scheduling cycle of input capture.
///
/// Constructed idle, consumed by [`CaptureTask::run`], and never reused:
/// the follow-up cycle is a new task built from the returned
/// [`NextCycleRequest`].
#[derive(Debug)]
pub struct CaptureTask {
    cycle: u64,
    current: InputSnapshot,
    previous: Option<Arc<InputSnapshot>>,
}

impl CaptureTask {
    /// Cycle 0: empty snapshot, nothing to diff against.
    pub fn first() -> Self {
        Self::new(0, InputSnapshot::new(), None)
    }

    pub fn new(cycle: u64, current: InputSnapshot, previous: Option<Arc<InputSnapshot>>) -> Self {
        Self {
            cycle,
            current,
            previous,
        }
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn previous(&self) -> Option<&InputSnapshot> {
        self.previous.as_deref()
    }

    /// Stamp the clock, pump the backend once, and publish the snapshot.
    ///
    /// A backend that terminates, fails to pump, or fails to register ends
    /// the capture: the report carries no next-cycle request.
    pub fn run<B: InputBackend>(self, ctx: &mut CaptureContext<B>) -> CycleReport {
        let Self {
            cycle,
            mut current,
            previous,
        } = self;

        let registration = ctx.ensure_registered();
        let now = ctx.backend.now();

        let mut builder = SnapshotBuilder::new(&mut current, previous.as_deref(), ctx.settings);
        builder.stamp(now);
        let mut adapter = CallbackAdapter::new(builder);

        let outcome = match registration {
            Ok(()) => ctx.backend.pump_events(&mut adapter),
            Err(e) => Err(e),
        };
        let (applied, rejected) = (adapter.applied(), adapter.rejected());

        let shutdown = match outcome {
            Ok(PumpStatus::Continue) => None,
            Ok(PumpStatus::Terminated) => {
                log::info!("input backend terminated after cycle {cycle}");
                Some(InputError::BackendTerminated {
                    reason: "session ended".into(),
                })
            }
            Err(e) => {
                log::error!("input capture stopped at cycle {cycle}: {e}");
                Some(e)
            }
        };

        let snapshot = Arc::new(current);
        log::debug!("cycle {cycle}: {snapshot} ({applied} applied, {rejected} rejected)");

        let next = shutdown.is_none().then(|| NextCycleRequest {
            cycle: cycle + 1,
            previous: Arc::clone(&snapshot),
        });

        CycleReport {
            cycle,
            snapshot,
            previous,
            applied,
            rejected,
            next,
            shutdown,
        }
    }
}

/// What a finished cycle hands back to the scheduler.
#[derive(Debug)]
pub struct CycleReport {
    pub cycle: u64,
    /// The finalized, now read-only snapshot.
    pub snapshot: Arc<InputSnapshot>,
    /// The snapshot this cycle was diffed against.
    pub previous: Option<Arc<InputSnapshot>>,
    pub applied: usize,
    pub rejected: usize,
    /// Present unless the backend ended the session.
    pub next: Option<NextCycleRequest>,
    /// Why capture stopped, when it did.
    pub shutdown: Option<InputError>,
}

impl CycleReport {
    pub fn is_final(&self) -> bool {
        self.next.is_none()
    }
}

/// Request to run the cycle after this one.
#[derive(Debug, Clone)]
pub struct NextCycleRequest {
    cycle: u64,
    previous: Arc<InputSnapshot>,
}

impl NextCycleRequest {
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn previous(&self) -> &Arc<InputSnapshot> {
        &self.previous
    }

    /// Build the next task: a snapshot derived from the one just published,
    /// which becomes its read-only `previous`.
    pub fn into_task(self) -> CaptureTask {
        let current = InputSnapshot::derive_from(&self.previous);
        CaptureTask::new(self.cycle, current, Some(self.previous))
    }
}
