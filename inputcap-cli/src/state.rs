use std::sync::Arc;

use chrono::{DateTime, Local};
use inputcap_core::{CycleReport, InputSnapshot, MouseButton, SnapshotArena};

// ─── Log Buffer ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Input,
    Window,
    Warning,
}

#[derive(Debug, Clone)]
pub struct LogLine {
    pub timestamp: DateTime<Local>,
    pub cycle: u64,
    pub text: String,
    pub kind: LineKind,
}

/// Bounded, newest-last list of input changes for the monitor.
pub struct LogBuffer {
    pub lines: Vec<LogLine>,
    max_lines: usize,
}

impl LogBuffer {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: Vec::new(),
            max_lines,
        }
    }

    pub fn push(&mut self, cycle: u64, text: String, kind: LineKind) {
        if self.lines.len() >= self.max_lines {
            self.lines.remove(0);
        }
        self.lines.push(LogLine {
            timestamp: chrono::Local::now(),
            cycle,
            text,
            kind,
        });
    }

    /// The newest `height` lines, oldest first.
    pub fn tail(&self, height: usize) -> &[LogLine] {
        let start = self.lines.len().saturating_sub(height);
        &self.lines[start..]
    }
}

// ─── Change Detection ────────────────────────────────────────────────

/// Printable name for a key code.
pub fn key_label(code: u8) -> String {
    match code {
        8 => "Backspace".into(),
        9 => "Tab".into(),
        13 => "Enter".into(),
        27 => "Esc".into(),
        32 => "Space".into(),
        127 => "Delete".into(),
        c if c.is_ascii_graphic() => format!("'{}'", c as char),
        c => format!("#{c}"),
    }
}

/// Human-readable differences between two consecutive snapshots.
pub fn describe_changes(prev: Option<&InputSnapshot>, cur: &InputSnapshot) -> Vec<(String, LineKind)> {
    let empty = InputSnapshot::new();
    let prev = prev.unwrap_or(&empty);
    let mut changes = Vec::new();

    for code in cur.keys.pressed() {
        if !prev.keys.get(code as i32).unwrap_or(false) {
            changes.push((format!("key down {}", key_label(code)), LineKind::Input));
        }
    }
    for code in prev.keys.pressed() {
        if !cur.keys.get(code as i32).unwrap_or(false) {
            changes.push((format!("key up {}", key_label(code)), LineKind::Input));
        }
    }
    for button in MouseButton::ALL {
        match (prev.is_button_down(button), cur.is_button_down(button)) {
            (false, true) => changes.push((format!("{} button down", button.label()), LineKind::Input)),
            (true, false) => changes.push((format!("{} button up", button.label()), LineKind::Input)),
            _ => {}
        }
    }
    if cur.resized {
        changes.push((format!("resized to {}x{}", cur.size.x, cur.size.y), LineKind::Window));
    }
    if cur.warped {
        changes.push((
            format!("cursor re-centered to ({}, {})", cur.mouse.x, cur.mouse.y),
            LineKind::Window,
        ));
    }
    changes
}

// ─── Monitor State ───────────────────────────────────────────────────

pub struct MonitorState {
    pub latest: Option<Arc<InputSnapshot>>,
    pub cycles: u64,
    pub applied_events: u64,
    pub rejected_events: u64,
    pub warps: u64,
    /// Exponentially smoothed cycles per second, from snapshot dt.
    pub rate: f64,
    /// Snapshots still held by the arena, and how many it keeps.
    pub retained: usize,
    pub history: usize,
    pub event_log: LogBuffer,
}

impl MonitorState {
    pub fn new() -> Self {
        Self {
            latest: None,
            cycles: 0,
            applied_events: 0,
            rejected_events: 0,
            warps: 0,
            rate: 0.0,
            retained: 0,
            history: 0,
            event_log: LogBuffer::new(1000),
        }
    }

    /// Fold one finished cycle into the dashboard. Changes are taken
    /// against the previous cycle as published in `arena`.
    pub fn observe(&mut self, report: &CycleReport, arena: &SnapshotArena) {
        self.cycles += 1;
        self.applied_events += report.applied as u64;
        self.rejected_events += report.rejected as u64;

        let snapshot = &report.snapshot;
        if snapshot.warped {
            self.warps += 1;
        }
        if snapshot.dt > 0.0 {
            let instant = 1.0 / snapshot.dt;
            self.rate = if self.rate == 0.0 {
                instant
            } else {
                self.rate * 0.9 + instant * 0.1
            };
        }

        let previous = report.cycle.checked_sub(1).and_then(|c| arena.get(c));
        for (text, kind) in describe_changes(previous.map(|p| p.as_ref()), snapshot) {
            self.event_log.push(report.cycle, text, kind);
        }
        if report.rejected > 0 {
            self.event_log.push(
                report.cycle,
                format!("{} malformed event(s) dropped", report.rejected),
                LineKind::Warning,
            );
        }
        if let Some(reason) = &report.shutdown {
            self.event_log.push(report.cycle, reason.to_string(), LineKind::Warning);
        }
        self.retained = arena.len();
        self.history = arena.capacity();
        self.latest = Some(Arc::clone(snapshot));
    }
}
