//! Terminal input backend.
//!
//! Captures keyboard, mouse, focus and resize events from the terminal via
//! crossterm and delivers them to the capture core. Coordinates are in
//! character cells.

use std::io::{self, stdout};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    MouseButton as TermButton, MouseEvent, MouseEventKind, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::{cursor, execute, terminal};
use inputcap_core::{EventKind, IVec2, InputBackend, InputError, InputHandler, PumpStatus, RawEvent, MAX_KEYS};

pub struct TermBackend {
    started: Instant,
    routes: Vec<EventKind>,
    mouse_captured: bool,
    focus_reporting: bool,
    /// Terminal reports key releases.
    enhanced: bool,
    /// Presses still waiting for a synthesized release.
    pending_release: Vec<i32>,
    initial_size: Option<(u16, u16)>,
    last_warp: Option<IVec2>,
}

impl TermBackend {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            routes: Vec::new(),
            mouse_captured: false,
            focus_reporting: false,
            enhanced: false,
            pending_release: Vec::new(),
            initial_size: None,
            last_warp: None,
        }
    }

    pub fn last_warp(&self) -> Option<IVec2> {
        self.last_warp
    }

    pub fn reports_key_release(&self) -> bool {
        self.enhanced
    }

    fn routes_any(&self, kinds: &[EventKind]) -> bool {
        kinds.iter().any(|k| self.routes.contains(k))
    }

    fn deliver(&mut self, handler: &mut dyn InputHandler, event: RawEvent) {
        if !self.routes.contains(&event.kind()) {
            return;
        }
        if let RawEvent::KeyDown { code } = event {
            if !self.enhanced && (0..MAX_KEYS as i32).contains(&code) && !self.pending_release.contains(&code) {
                self.pending_release.push(code);
            }
        }
        if let Some(pos) = handler.handle(event) {
            self.warp_cursor(pos);
        }
    }
}

impl Default for TermBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn backend_io(kind: &'static str) -> impl Fn(io::Error) -> InputError {
    move |e| InputError::Backend {
        kind,
        detail: e.to_string(),
    }
}

impl InputBackend for TermBackend {
    fn register(&mut self, kinds: &[EventKind]) -> Result<(), InputError> {
        self.routes = kinds.to_vec();
        let mut out = stdout();

        if self.routes_any(&[EventKind::Motion, EventKind::PassiveMotion, EventKind::Button]) {
            execute!(out, EnableMouseCapture).map_err(backend_io("register"))?;
            self.mouse_captured = true;
        }
        if self.routes_any(&[EventKind::Entry]) {
            execute!(out, EnableFocusChange).map_err(backend_io("register"))?;
            self.focus_reporting = true;
        }
        if self.routes_any(&[EventKind::KeyUp]) && terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .map_err(backend_io("register"))?;
            self.enhanced = true;
        }
        if self.routes_any(&[EventKind::Reshape]) {
            self.initial_size = Some(terminal::size().map_err(backend_io("register"))?);
        }

        log::info!(
            "terminal backend ready (mouse: {}, focus: {}, key release: {})",
            self.mouse_captured,
            self.focus_reporting,
            if self.enhanced { "reported" } else { "synthesized" },
        );
        Ok(())
    }

    fn pump_events(&mut self, handler: &mut dyn InputHandler) -> Result<PumpStatus, InputError> {
        for code in std::mem::take(&mut self.pending_release) {
            self.deliver(handler, RawEvent::KeyUp { code });
        }
        if let Some((w, h)) = self.initial_size.take() {
            self.deliver(handler, RawEvent::Reshape { w: w as i32, h: h as i32 });
        }

        while event::poll(Duration::ZERO).map_err(backend_io("poll"))? {
            let ev = event::read().map_err(backend_io("read"))?;
            if is_interrupt(&ev) {
                log::info!("interrupt received, ending capture");
                return Ok(PumpStatus::Terminated);
            }
            match translate(&ev) {
                Some(raw) => self.deliver(handler, raw),
                None => log::trace!("ignoring terminal event {ev:?}"),
            }
        }
        Ok(PumpStatus::Continue)
    }

    fn warp_cursor(&mut self, pos: IVec2) {
        self.last_warp = Some(pos);
        let (x, y) = (pos.x.clamp(0, u16::MAX as i32) as u16, pos.y.clamp(0, u16::MAX as i32) as u16);
        if let Err(e) = execute!(stdout(), cursor::MoveTo(x, y)) {
            log::warn!("cursor warp to ({x}, {y}) failed: {e}");
        }
    }

    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

impl Drop for TermBackend {
    fn drop(&mut self) {
        let mut out = stdout();
        if self.enhanced {
            let _ = execute!(out, PopKeyboardEnhancementFlags);
        }
        if self.focus_reporting {
            let _ = execute!(out, DisableFocusChange);
        }
        if self.mouse_captured {
            let _ = execute!(out, DisableMouseCapture);
        }
    }
}

fn is_interrupt(ev: &Event) -> bool {
    matches!(
        ev,
        Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) if modifiers.contains(KeyModifiers::CONTROL)
    )
}

/// Byte-sized key code for a terminal key, ASCII where one exists.
/// Characters past U+00FF are passed through and rejected downstream.
fn key_code(code: KeyCode) -> Option<i32> {
    match code {
        KeyCode::Char(c) => Some(c as i32),
        KeyCode::Backspace => Some(8),
        KeyCode::Tab => Some(9),
        KeyCode::Enter => Some(13),
        KeyCode::Esc => Some(27),
        KeyCode::Delete => Some(127),
        _ => None,
    }
}

fn button_index(button: TermButton) -> i32 {
    match button {
        TermButton::Left => 0,
        TermButton::Middle => 1,
        TermButton::Right => 2,
    }
}

fn translate(ev: &Event) -> Option<RawEvent> {
    match ev {
        Event::Key(key) => {
            let code = key_code(key.code)?;
            Some(match key.kind {
                KeyEventKind::Press | KeyEventKind::Repeat => RawEvent::KeyDown { code },
                KeyEventKind::Release => RawEvent::KeyUp { code },
            })
        }
        Event::Mouse(MouseEvent {
            kind, column, row, ..
        }) => {
            let (x, y) = (*column as i32, *row as i32);
            match kind {
                MouseEventKind::Moved => Some(RawEvent::PassiveMotion { x, y }),
                MouseEventKind::Drag(_) => Some(RawEvent::Motion { x, y }),
                MouseEventKind::Down(b) => Some(RawEvent::Button {
                    button: button_index(*b),
                    pressed: true,
                }),
                MouseEventKind::Up(b) => Some(RawEvent::Button {
                    button: button_index(*b),
                    pressed: false,
                }),
                _ => None,
            }
        }
        Event::Resize(w, h) => Some(RawEvent::Reshape {
            w: *w as i32,
            h: *h as i32,
        }),
        Event::FocusLost => Some(RawEvent::Entry { exited: true }),
        Event::FocusGained => Some(RawEvent::Entry { exited: false }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    // ── Keys ──

    #[test]
    fn test_key_codes() {
        assert_eq!(key_code(KeyCode::Char('a')), Some(97));
        assert_eq!(key_code(KeyCode::Esc), Some(27));
        assert_eq!(key_code(KeyCode::Enter), Some(13));
        assert_eq!(key_code(KeyCode::Up), None);
        assert_eq!(key_code(KeyCode::Char('é')), Some(233));
        assert_eq!(key_code(KeyCode::Char('λ')), Some(955));
    }

    #[test]
    fn test_key_press_and_release() {
        let press = Event::Key(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::NONE));
        assert_eq!(translate(&press), Some(RawEvent::KeyDown { code: 119 }));

        let release = Event::Key(KeyEvent::new_with_kind(
            KeyCode::Char('w'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));
        assert_eq!(translate(&release), Some(RawEvent::KeyUp { code: 119 }));
    }

    #[test]
    fn test_interrupt_detection() {
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(is_interrupt(&ctrl_c));
        let plain_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE));
        assert!(!is_interrupt(&plain_c));
    }

    // ── Mouse ──

    #[test]
    fn test_mouse_translation() {
        assert_eq!(
            translate(&mouse(MouseEventKind::Moved, 10, 4)),
            Some(RawEvent::PassiveMotion { x: 10, y: 4 })
        );
        assert_eq!(
            translate(&mouse(MouseEventKind::Drag(TermButton::Left), 11, 5)),
            Some(RawEvent::Motion { x: 11, y: 5 })
        );
        assert_eq!(
            translate(&mouse(MouseEventKind::Down(TermButton::Right), 0, 0)),
            Some(RawEvent::Button { button: 2, pressed: true })
        );
        assert_eq!(
            translate(&mouse(MouseEventKind::Up(TermButton::Middle), 0, 0)),
            Some(RawEvent::Button { button: 1, pressed: false })
        );
        assert_eq!(translate(&mouse(MouseEventKind::ScrollUp, 0, 0)), None);
    }

    // ── Window ──

    #[test]
    fn test_window_translation() {
        assert_eq!(
            translate(&Event::Resize(120, 40)),
            Some(RawEvent::Reshape { w: 120, h: 40 })
        );
        assert_eq!(translate(&Event::FocusLost), Some(RawEvent::Entry { exited: true }));
        assert_eq!(translate(&Event::FocusGained), Some(RawEvent::Entry { exited: false }));
    }

    // ── Synthesized release ──

    struct Sink(Vec<RawEvent>);

    impl InputHandler for Sink {
        fn handle(&mut self, event: RawEvent) -> Option<IVec2> {
            self.0.push(event);
            None
        }
    }

    #[test]
    fn test_press_queues_release_without_enhancement() {
        let mut backend = TermBackend::new();
        backend.routes = EventKind::ALL.to_vec();
        let mut sink = Sink(Vec::new());
        backend.deliver(&mut sink, RawEvent::KeyDown { code: 97 });
        backend.deliver(&mut sink, RawEvent::KeyDown { code: 97 });
        backend.deliver(&mut sink, RawEvent::KeyDown { code: 955 });
        assert_eq!(backend.pending_release, vec![97]);
        assert_eq!(sink.0.len(), 3);
    }

    #[test]
    fn test_unrouted_events_dropped() {
        let mut backend = TermBackend::new();
        backend.routes = vec![EventKind::KeyDown];
        let mut sink = Sink(Vec::new());
        backend.deliver(&mut sink, RawEvent::PassiveMotion { x: 1, y: 1 });
        assert!(sink.0.is_empty());
    }
}
