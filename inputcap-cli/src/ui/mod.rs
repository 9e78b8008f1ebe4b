pub mod log_panel;
pub mod monitor_view;

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::state::MonitorState;
use crate::term_backend::TermBackend;

pub fn render(frame: &mut Frame, state: &MonitorState, backend: &TermBackend) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(frame.area());

    let title = Line::from(vec![
        Span::styled(" inputcap ", Style::default().bold().fg(Color::Black).bg(Color::Cyan)),
        Span::raw("  "),
        Span::styled("[Ctrl-C] Stop", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(title), chunks[0]);

    monitor_view::render(frame, state, backend, chunks[1]);
}
