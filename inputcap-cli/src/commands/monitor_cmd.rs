use std::io;

use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use inputcap_core::CaptureLoop;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::time::MissedTickBehavior;

use crate::config::{CaptureConfig, ResolvedConfig};
use crate::state::MonitorState;
use crate::term_backend::TermBackend;
use crate::ui;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

pub async fn run(resolved: ResolvedConfig) -> anyhow::Result<()> {
    let config = resolved.config;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = monitor_loop(&mut terminal, &config).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let state = result?;
    println!(
        "{} cycles, {} events applied, {} rejected, {} warps",
        state.cycles, state.applied_events, state.rejected_events, state.warps
    );
    Ok(())
}

async fn monitor_loop(terminal: &mut Term, config: &CaptureConfig) -> anyhow::Result<MonitorState> {
    let mut capture = CaptureLoop::new(TermBackend::new(), config.settings(), config.history);
    let mut state = MonitorState::new();

    let mut ticker = tokio::time::interval(config.frame_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let Some(report) = capture.step() else {
            break;
        };
        state.observe(&report, capture.arena());
        terminal.draw(|frame| ui::render(frame, &state, capture.backend()))?;
    }

    if let Some(reason) = capture.shutdown_reason() {
        log::info!("monitor stopped after {} cycles: {reason}", capture.cycles());
    }
    Ok(state)
}
