use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::snapshot::{InputSnapshot, MouseButton};

/// Tunables for snapshot building.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Width in pixels of the band along each window edge where motion is
    /// replaced by a re-center.
    #[serde(default = "default_wrap_margin")]
    pub wrap_margin: i32,
}

fn default_wrap_margin() -> i32 {
    2
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            wrap_margin: default_wrap_margin(),
        }
    }
}

/// Applies single input events to the snapshot under construction.
///
/// Relative motion is always measured against `previous`, never against an
/// earlier position written into `current` during the same cycle, so a cycle
/// reports one displacement however many motion events it received.
pub struct SnapshotBuilder<'a> {
    current: &'a mut InputSnapshot,
    previous: Option<&'a InputSnapshot>,
    settings: CaptureSettings,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(
        current: &'a mut InputSnapshot,
        previous: Option<&'a InputSnapshot>,
        settings: CaptureSettings,
    ) -> Self {
        let settings = CaptureSettings {
            wrap_margin: settings.wrap_margin.max(0),
        };
        Self {
            current,
            previous,
            settings,
        }
    }

    pub fn current(&self) -> &InputSnapshot {
        self.current
    }

    /// Record the capture time and the delta against the previous snapshot.
    pub fn stamp(&mut self, now: f64) {
        self.current.time = now;
        self.current.dt = match self.previous {
            Some(prev) => now - prev.time,
            None => 0.0,
        };
    }

    pub fn key(&mut self, code: i32, pressed: bool) -> Result<(), InputError> {
        self.current.set_key(code, pressed)
    }

    pub fn button(&mut self, button: MouseButton, pressed: bool) {
        self.current.buttons[button.index()] = pressed;
    }

    pub fn resize(&mut self, w: i32, h: i32) -> Result<(), InputError> {
        if w <= 0 || h <= 0 {
            return Err(InputError::malformed("reshape", format!("{w}x{h}")));
        }
        self.current.size = IVec2::new(w, h);
        self.current.resized = true;
        Ok(())
    }

    /// Cursor entered or left the window. Leaving re-centers the cursor and
    /// returns the position the backend should warp to.
    pub fn entry(&mut self, exited: bool) -> Option<IVec2> {
        exited.then(|| self.recenter())
    }

    /// Cursor moved to `(x, y)`. Returns a warp target when the position
    /// falls inside the wrap band.
    pub fn motion(&mut self, x: i32, y: i32) -> Option<IVec2> {
        if self.in_wrap_zone(x, y) {
            return Some(self.recenter());
        }

        let pos = IVec2::new(x, y);
        if let Some(prev) = self.previous.filter(|p| p.mouse_init) {
            self.current.mouse_rel = pos - prev.mouse;
        }
        self.current.mouse = pos;
        self.current.mouse_init = true;
        None
    }

    fn in_wrap_zone(&self, x: i32, y: i32) -> bool {
        let margin = self.settings.wrap_margin;
        let size = self.current.size;
        x < margin || y < margin || x >= size.x - margin || y >= size.y - margin
    }

    /// Before the window has a size the center is the origin, which is not
    /// an observed position, so `mouse_init` stays as it was.
    fn recenter(&mut self) -> IVec2 {
        let center = self.current.center();
        self.current.mouse = center;
        if self.current.size.cmpgt(IVec2::ZERO).all() {
            self.current.mouse_init = true;
        }
        self.current.warped = true;
        center
    }
}
