use std::collections::VecDeque;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::backend::{EventKind, InputBackend, InputHandler, PumpStatus, RawEvent};
use crate::error::InputError;

/// Everything one pump call delivers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptFrame {
    /// Clock value reported by `now()` right before this frame is pumped.
    pub time: f64,
    #[serde(default)]
    pub events: Vec<RawEvent>,
    /// End the session after delivering this frame's events.
    #[serde(default)]
    pub terminate: bool,
}

impl ScriptFrame {
    pub fn at(time: f64) -> Self {
        Self {
            time,
            ..Default::default()
        }
    }

    pub fn with(mut self, event: RawEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn terminating(mut self) -> Self {
        self.terminate = true;
        self
    }
}

/// Deterministic backend that plays back pre-recorded frames, one per pump.
///
/// Only registered event kinds are delivered. Once the frames run out the
/// next pump reports termination.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    frames: VecDeque<ScriptFrame>,
    clock: f64,
    routes: Vec<EventKind>,
    register_calls: usize,
    pumps: usize,
    delivered: usize,
    warps: Vec<IVec2>,
}

impl ScriptedBackend {
    pub fn new(frames: impl IntoIterator<Item = ScriptFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    pub fn register_calls(&self) -> usize {
        self.register_calls
    }

    pub fn pumps(&self) -> usize {
        self.pumps
    }

    /// Events handed to the handler so far.
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Every cursor warp requested, oldest first.
    pub fn warps(&self) -> &[IVec2] {
        &self.warps
    }
}

impl InputBackend for ScriptedBackend {
    fn register(&mut self, kinds: &[EventKind]) -> Result<(), InputError> {
        self.register_calls += 1;
        self.routes = kinds.to_vec();
        Ok(())
    }

    fn pump_events(&mut self, handler: &mut dyn InputHandler) -> Result<PumpStatus, InputError> {
        self.pumps += 1;
        let Some(frame) = self.frames.pop_front() else {
            return Ok(PumpStatus::Terminated);
        };
        self.clock = frame.time;

        for event in frame.events {
            if !self.routes.contains(&event.kind()) {
                log::trace!("no route for {:?}, skipping", event.kind());
                continue;
            }
            self.delivered += 1;
            if let Some(pos) = handler.handle(event) {
                self.warp_cursor(pos);
            }
        }

        Ok(if frame.terminate {
            PumpStatus::Terminated
        } else {
            PumpStatus::Continue
        })
    }

    fn warp_cursor(&mut self, pos: IVec2) {
        self.warps.push(pos);
    }

    fn now(&self) -> f64 {
        self.frames.front().map_or(self.clock, |f| f.time)
    }
}
