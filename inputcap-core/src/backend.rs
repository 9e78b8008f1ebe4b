use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Callback kinds a backend can route to the capture core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    KeyDown,
    KeyUp,
    Button,
    Motion,
    PassiveMotion,
    Entry,
    Reshape,
}

impl EventKind {
    pub const ALL: &'static [EventKind] = &[
        EventKind::KeyDown,
        EventKind::KeyUp,
        EventKind::Button,
        EventKind::Motion,
        EventKind::PassiveMotion,
        EventKind::Entry,
        EventKind::Reshape,
    ];
}

/// A single notification as delivered by the windowing layer.
///
/// Values are carried as the backend reports them; range checks happen when
/// the event is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawEvent {
    KeyDown { code: i32 },
    KeyUp { code: i32 },
    Button { button: i32, pressed: bool },
    /// Motion with a button held.
    Motion { x: i32, y: i32 },
    /// Motion with no button held.
    PassiveMotion { x: i32, y: i32 },
    Entry { exited: bool },
    Reshape { w: i32, h: i32 },
}

impl RawEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::KeyDown { .. } => EventKind::KeyDown,
            Self::KeyUp { .. } => EventKind::KeyUp,
            Self::Button { .. } => EventKind::Button,
            Self::Motion { .. } => EventKind::Motion,
            Self::PassiveMotion { .. } => EventKind::PassiveMotion,
            Self::Entry { .. } => EventKind::Entry,
            Self::Reshape { .. } => EventKind::Reshape,
        }
    }
}

/// Outcome of one pump call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    /// All pending events were delivered; the session continues.
    Continue,
    /// The window or session ended. No further cycles should run.
    Terminated,
}

/// Receiver for events delivered during a pump.
///
/// A returned position is a cursor-warp request; the backend honours it
/// before delivering the next event.
pub trait InputHandler {
    fn handle(&mut self, event: RawEvent) -> Option<IVec2>;
}

/// The windowing/input layer the capture core drives.
///
/// The backend is not reentrant: exactly one pump runs at a time, and the
/// handler passed to it is only valid for that call.
pub trait InputBackend {
    /// One-time routing setup for the given callback kinds.
    fn register(&mut self, kinds: &[EventKind]) -> Result<(), InputError>;

    /// Synchronously deliver every pending event to `handler`, in order.
    fn pump_events(&mut self, handler: &mut dyn InputHandler) -> Result<PumpStatus, InputError>;

    fn warp_cursor(&mut self, pos: IVec2);

    /// Monotonic seconds.
    fn now(&self) -> f64;
}

impl<B: InputBackend + ?Sized> InputBackend for Box<B> {
    fn register(&mut self, kinds: &[EventKind]) -> Result<(), InputError> {
        (**self).register(kinds)
    }

    fn pump_events(&mut self, handler: &mut dyn InputHandler) -> Result<PumpStatus, InputError> {
        (**self).pump_events(handler)
    }

    fn warp_cursor(&mut self, pos: IVec2) {
        (**self).warp_cursor(pos)
    }

    fn now(&self) -> f64 {
        (**self).now()
    }
}
