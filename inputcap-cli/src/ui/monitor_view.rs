use inputcap_core::MouseButton;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::state::{key_label, MonitorState};
use crate::term_backend::TermBackend;
use crate::ui::log_panel;

fn field<'a>(name: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{name:<10}"), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

pub fn render(frame: &mut Frame, state: &MonitorState, backend: &TermBackend, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(38), Constraint::Min(0)])
        .split(area);

    let mut info = vec![
        Line::styled("Snapshot", Style::default().bold().fg(Color::Cyan)),
        Line::raw(""),
    ];

    match &state.latest {
        Some(snap) => {
            let buttons: Vec<&str> = MouseButton::ALL
                .into_iter()
                .filter(|b| snap.is_button_down(*b))
                .map(|b| b.label())
                .collect();
            let keys: Vec<String> = snap.keys.pressed().map(key_label).collect();

            info.push(field("time", format!("{:.3}s", snap.time)));
            info.push(field("dt", format!("{:.1}ms", snap.dt * 1000.0)));
            info.push(field("rate", format!("{:.1}/s", state.rate)));
            info.push(field("size", format!("{}x{}", snap.size.x, snap.size.y)));
            info.push(field("mouse", format!("({}, {})", snap.mouse.x, snap.mouse.y)));

            let rel_style = if !snap.has_relative_motion() {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            info.push(Line::from(vec![
                Span::styled(format!("{:<10}", "relative"), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("({}, {})", snap.mouse_rel.x, snap.mouse_rel.y), rel_style),
            ]));
            info.push(field(
                "buttons",
                if buttons.is_empty() { "-".into() } else { buttons.join(" ") },
            ));
            info.push(field(
                "keys",
                if keys.is_empty() {
                    "-".into()
                } else {
                    format!("({}) {}", snap.keys.count(), keys.join(" "))
                },
            ));
        }
        None => info.push(Line::styled("waiting for first cycle", Style::default().fg(Color::DarkGray))),
    }

    info.push(Line::raw(""));
    info.push(Line::styled("Capture", Style::default().bold().fg(Color::Cyan)));
    info.push(Line::raw(""));
    info.push(field("cycles", state.cycles.to_string()));
    info.push(field("applied", state.applied_events.to_string()));
    let rejected_style = if state.rejected_events > 0 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    info.push(Line::from(vec![
        Span::styled(format!("{:<10}", "rejected"), Style::default().fg(Color::DarkGray)),
        Span::styled(state.rejected_events.to_string(), rejected_style),
    ]));
    info.push(field("warps", state.warps.to_string()));
    info.push(field("history", format!("{}/{}", state.retained, state.history)));
    info.push(field(
        "last warp",
        backend
            .last_warp()
            .map(|p| format!("({}, {})", p.x, p.y))
            .unwrap_or_else(|| "-".into()),
    ));
    info.push(field(
        "key up",
        if backend.reports_key_release() { "reported" } else { "synthesized" }.into(),
    ));

    let info_widget = Paragraph::new(info).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Input ")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(info_widget, chunks[0]);

    log_panel::render(frame, &state.event_log, chunks[1], " Changes ");
}
