//! inputcap core
//!
//! Turns callback-driven input (keys, mouse, window geometry) into one
//! immutable, time-stamped snapshot per scheduling cycle. A [`CaptureTask`]
//! stamps the clock, pumps the backend once through a [`CallbackAdapter`]
//! bound to its own (current, previous) pair, and hands back a
//! [`CycleReport`] carrying the finished snapshot and an optional
//! [`NextCycleRequest`] for the scheduler.

mod adapter;
mod arena;
mod backend;
mod builder;
mod error;
mod keys;
mod scheduler;
mod scripted;
mod snapshot;
mod task;

pub use adapter::CallbackAdapter;
pub use arena::SnapshotArena;
pub use backend::{EventKind, InputBackend, InputHandler, PumpStatus, RawEvent};
pub use builder::{CaptureSettings, SnapshotBuilder};
pub use error::InputError;
pub use keys::{KeySet, MAX_KEYS};
pub use scheduler::{CaptureLoop, Schedule, TaskQueue};
pub use scripted::{ScriptFrame, ScriptedBackend};
pub use snapshot::{InputSnapshot, MouseButton, MOUSE_BUTTONS};
pub use task::{CaptureContext, CaptureTask, CycleReport, NextCycleRequest};

pub use glam::IVec2;
