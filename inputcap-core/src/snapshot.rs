use std::fmt;

use glam::IVec2;
use serde::Serialize;

use crate::error::InputError;
use crate::keys::KeySet;

/// Number of tracked mouse buttons.
pub const MOUSE_BUTTONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    pub const ALL: [MouseButton; MOUSE_BUTTONS] =
        [MouseButton::Left, MouseButton::Middle, MouseButton::Right];

    /// Backend button numbering: 0 left, 1 middle, 2 right.
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::Left),
            1 => Some(Self::Middle),
            2 => Some(Self::Right),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Left => 0,
            Self::Middle => 1,
            Self::Right => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Middle => "middle",
            Self::Right => "right",
        }
    }
}

/// One cycle's worth of keyboard, mouse and window state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSnapshot {
    /// Seconds on the backend clock when this snapshot was captured.
    pub time: f64,
    /// `time - previous.time`; zero for the first snapshot.
    pub dt: f64,
    pub keys: KeySet,
    pub buttons: [bool; MOUSE_BUTTONS],
    /// Absolute cursor position in window space.
    pub mouse: IVec2,
    /// Displacement against the previous snapshot's `mouse`.
    pub mouse_rel: IVec2,
    /// Window width and height.
    pub size: IVec2,
    /// A cursor position has been observed (or forced by a re-center).
    pub mouse_init: bool,
    /// The cursor was re-centered this cycle, so `mouse_rel` is stale.
    pub warped: bool,
    pub resized: bool,
}

impl InputSnapshot {
    /// Empty snapshot: no keys, cursor at the origin, zero-sized window.
    pub fn new() -> Self {
        Self {
            time: 0.0,
            dt: 0.0,
            keys: KeySet::new(),
            buttons: [false; MOUSE_BUTTONS],
            mouse: IVec2::ZERO,
            mouse_rel: IVec2::ZERO,
            size: IVec2::ZERO,
            mouse_init: false,
            warped: false,
            resized: false,
        }
    }

    /// Start the next cycle from `previous`: held state (keys, buttons,
    /// cursor, window size) carries over, per-cycle flags and deltas reset.
    pub fn derive_from(previous: &InputSnapshot) -> Self {
        Self {
            time: previous.time,
            dt: 0.0,
            keys: previous.keys,
            buttons: previous.buttons,
            mouse: previous.mouse,
            mouse_rel: IVec2::ZERO,
            size: previous.size,
            mouse_init: previous.mouse_init,
            warped: false,
            resized: false,
        }
    }

    pub fn get_key(&self, code: i32) -> Result<bool, InputError> {
        self.keys.get(code)
    }

    pub fn set_key(&mut self, code: i32, pressed: bool) -> Result<(), InputError> {
        self.keys.set(code, pressed)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons[button.index()]
    }

    pub fn center(&self) -> IVec2 {
        self.size / 2
    }

    /// Whether `mouse_rel` describes real motion this cycle.
    pub fn has_relative_motion(&self) -> bool {
        self.mouse_init && !self.warped
    }
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InputSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:.3} dt={:.3} mouse=({},{}) rel=({},{}) size={}x{} keys={:?}",
            self.time,
            self.dt,
            self.mouse.x,
            self.mouse.y,
            self.mouse_rel.x,
            self.mouse_rel.y,
            self.size.x,
            self.size.y,
            self.keys,
        )?;
        let held: Vec<&str> = MouseButton::ALL
            .iter()
            .filter(|b| self.is_button_down(**b))
            .map(|b| b.label())
            .collect();
        if !held.is_empty() {
            write!(f, " buttons={}", held.join("+"))?;
        }
        if self.resized {
            f.write_str(" resized")?;
        }
        if self.warped {
            f.write_str(" warped")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn busy_snapshot() -> InputSnapshot {
        let mut s = InputSnapshot::new();
        s.time = 3.5;
        s.dt = 0.016;
        s.set_key(97, true).unwrap();
        s.buttons[MouseButton::Right.index()] = true;
        s.mouse = IVec2::new(120, 80);
        s.mouse_rel = IVec2::new(4, -2);
        s.size = IVec2::new(640, 480);
        s.mouse_init = true;
        s.warped = true;
        s.resized = true;
        s
    }

    // ── Construction ──

    #[test]
    fn test_fresh_is_empty() {
        let s = InputSnapshot::new();
        assert_eq!(s.time, 0.0);
        assert_eq!(s.dt, 0.0);
        assert!(s.keys.is_empty());
        assert_eq!(s.mouse, IVec2::ZERO);
        assert_eq!(s.size, IVec2::ZERO);
        assert!(!s.mouse_init);
        assert!(!s.resized);
        assert!(!s.has_relative_motion());
    }

    #[test]
    fn test_derive_carries_held_state() {
        let prev = busy_snapshot();
        let next = InputSnapshot::derive_from(&prev);
        assert!(next.get_key(97).unwrap());
        assert!(next.is_button_down(MouseButton::Right));
        assert_eq!(next.mouse, IVec2::new(120, 80));
        assert_eq!(next.size, IVec2::new(640, 480));
        assert!(next.mouse_init);
    }

    #[test]
    fn test_derive_resets_per_cycle_fields() {
        let next = InputSnapshot::derive_from(&busy_snapshot());
        assert_eq!(next.mouse_rel, IVec2::ZERO);
        assert_eq!(next.dt, 0.0);
        assert!(!next.resized);
        assert!(!next.warped);
        assert!(next.has_relative_motion());
    }

    // ── Accessors ──

    #[test]
    fn test_key_range_contract() {
        let mut s = InputSnapshot::new();
        assert!(s.set_key(256, true).is_err());
        assert!(s.get_key(-1).is_err());
        s.set_key(255, true).unwrap();
        assert!(s.get_key(255).unwrap());
    }

    #[test]
    fn test_center() {
        let mut s = InputSnapshot::new();
        s.size = IVec2::new(801, 600);
        assert_eq!(s.center(), IVec2::new(400, 300));
    }

    #[test]
    fn test_button_index_mapping() {
        for button in MouseButton::ALL {
            assert_eq!(MouseButton::from_index(button.index() as i32), Some(button));
        }
        assert_eq!(MouseButton::from_index(3), None);
        assert_eq!(MouseButton::from_index(-1), None);
    }

    #[test]
    fn test_display_mentions_flags() {
        let line = busy_snapshot().to_string();
        assert!(line.contains("mouse=(120,80)"));
        assert!(line.contains("size=640x480"));
        assert!(line.contains("buttons=right"));
        assert!(line.contains("resized"));
        assert!(line.contains("warped"));
    }
}
