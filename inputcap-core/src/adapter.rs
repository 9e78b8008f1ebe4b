use glam::IVec2;

use crate::backend::{InputHandler, RawEvent};
use crate::builder::SnapshotBuilder;
use crate::error::InputError;
use crate::snapshot::MouseButton;

/// Routes backend notifications onto the snapshot under construction.
///
/// One adapter exists per pump call and borrows the active task's
/// (current, previous) pair, so a callback can never reach a snapshot from
/// another cycle. Events are applied immediately, in delivery order.
/// Malformed events are logged and dropped.
pub struct CallbackAdapter<'a> {
    builder: SnapshotBuilder<'a>,
    applied: usize,
    rejected: usize,
}

impl<'a> CallbackAdapter<'a> {
    pub fn new(builder: SnapshotBuilder<'a>) -> Self {
        Self {
            builder,
            applied: 0,
            rejected: 0,
        }
    }

    pub fn applied(&self) -> usize {
        self.applied
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    fn dispatch(&mut self, event: RawEvent) -> Result<Option<IVec2>, InputError> {
        match event {
            RawEvent::KeyDown { code } => self.key(code, true).map(|_| None),
            RawEvent::KeyUp { code } => self.key(code, false).map(|_| None),
            RawEvent::Button { button, pressed } => {
                let button = MouseButton::from_index(button).ok_or_else(|| {
                    InputError::malformed("button", format!("unknown button {button}"))
                })?;
                self.builder.button(button, pressed);
                Ok(None)
            }
            RawEvent::Motion { x, y } | RawEvent::PassiveMotion { x, y } => {
                Ok(self.builder.motion(x, y))
            }
            RawEvent::Entry { exited } => Ok(self.builder.entry(exited)),
            RawEvent::Reshape { w, h } => self.builder.resize(w, h).map(|_| None),
        }
    }

    /// Out-of-range codes from the backend are bad samples, not API misuse.
    fn key(&mut self, code: i32, pressed: bool) -> Result<(), InputError> {
        self.builder.key(code, pressed).map_err(|e| match e {
            InputError::InvalidArgument { code, max } => {
                InputError::malformed("key", format!("code {code} outside [0, {max})"))
            }
            other => other,
        })
    }
}

impl InputHandler for CallbackAdapter<'_> {
    fn handle(&mut self, event: RawEvent) -> Option<IVec2> {
        match self.dispatch(event) {
            Ok(warp) => {
                self.applied += 1;
                log::trace!("applied {event:?}");
                if let Some(pos) = warp {
                    log::trace!("re-centered cursor to ({}, {})", pos.x, pos.y);
                }
                warp
            }
            Err(e) => {
                self.rejected += 1;
                log::warn!("dropping input event: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CaptureSettings;
    use crate::snapshot::InputSnapshot;

    fn previous() -> InputSnapshot {
        let mut prev = InputSnapshot::new();
        prev.size = IVec2::new(800, 600);
        prev.mouse = IVec2::new(100, 100);
        prev.mouse_init = true;
        prev
    }

    #[test]
    fn test_dispatch_in_delivery_order() {
        let prev = previous();
        let mut cur = InputSnapshot::derive_from(&prev);
        let mut adapter = CallbackAdapter::new(SnapshotBuilder::new(
            &mut cur,
            Some(&prev),
            CaptureSettings::default(),
        ));
        adapter.handle(RawEvent::KeyDown { code: 119 });
        adapter.handle(RawEvent::KeyUp { code: 119 });
        adapter.handle(RawEvent::KeyDown { code: 97 });
        adapter.handle(RawEvent::Button { button: 0, pressed: true });
        adapter.handle(RawEvent::Motion { x: 110, y: 105 });
        adapter.handle(RawEvent::PassiveMotion { x: 130, y: 90 });
        assert_eq!(adapter.applied(), 6);
        assert_eq!(adapter.rejected(), 0);

        assert!(!cur.get_key(119).unwrap());
        assert!(cur.get_key(97).unwrap());
        assert!(cur.is_button_down(MouseButton::Left));
        assert_eq!(cur.mouse, IVec2::new(130, 90));
        assert_eq!(cur.mouse_rel, IVec2::new(30, -10));
    }

    #[test]
    fn test_warp_requests_returned() {
        let prev = previous();
        let mut cur = InputSnapshot::derive_from(&prev);
        let mut adapter = CallbackAdapter::new(SnapshotBuilder::new(
            &mut cur,
            Some(&prev),
            CaptureSettings::default(),
        ));
        assert_eq!(adapter.handle(RawEvent::Entry { exited: true }), Some(IVec2::new(400, 300)));
        assert_eq!(adapter.handle(RawEvent::Entry { exited: false }), None);
        assert_eq!(adapter.handle(RawEvent::Motion { x: 799, y: 10 }), Some(IVec2::new(400, 300)));
    }

    #[test]
    fn test_malformed_events_swallowed() {
        let prev = previous();
        let mut cur = InputSnapshot::derive_from(&prev);
        let mut adapter = CallbackAdapter::new(SnapshotBuilder::new(
            &mut cur,
            Some(&prev),
            CaptureSettings::default(),
        ));
        assert_eq!(adapter.handle(RawEvent::KeyDown { code: 4000 }), None);
        assert_eq!(adapter.handle(RawEvent::KeyUp { code: -3 }), None);
        assert_eq!(adapter.handle(RawEvent::Button { button: 7, pressed: true }), None);
        assert_eq!(adapter.handle(RawEvent::Reshape { w: 0, h: 0 }), None);
        adapter.handle(RawEvent::KeyDown { code: 65 });
        assert_eq!(adapter.rejected(), 4);
        assert_eq!(adapter.applied(), 1);

        assert!(cur.get_key(65).unwrap());
        assert_eq!(cur.size, IVec2::new(800, 600));
        assert!(!cur.resized);
    }

    #[test]
    fn test_key_range_error_reported_as_backend() {
        let prev = previous();
        let mut cur = InputSnapshot::derive_from(&prev);
        let mut adapter = CallbackAdapter::new(SnapshotBuilder::new(
            &mut cur,
            Some(&prev),
            CaptureSettings::default(),
        ));
        assert!(matches!(
            adapter.dispatch(RawEvent::KeyDown { code: 256 }),
            Err(InputError::Backend { kind: "key", .. })
        ));
    }
}
