use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::state::{LineKind, LogBuffer};

pub fn render(frame: &mut Frame, log: &LogBuffer, area: Rect, title: &str) {
    // Borders take two rows.
    let height = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = log
        .tail(height)
        .iter()
        .map(|line| {
            let style = match line.kind {
                LineKind::Input => Style::default(),
                LineKind::Window => Style::default().fg(Color::Cyan),
                LineKind::Warning => Style::default().fg(Color::Yellow),
            };
            Line::from(vec![
                Span::styled(
                    format!("{} ", line.timestamp.format("%H:%M:%S%.3f")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("#{:<6}", line.cycle), Style::default().fg(Color::DarkGray)),
                Span::styled(line.text.clone(), style),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .border_style(Style::default().fg(Color::Blue)),
    );
    frame.render_widget(widget, area);
}
