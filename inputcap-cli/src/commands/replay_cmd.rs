use std::path::Path;

use inputcap_core::{CaptureLoop, CycleReport, InputSnapshot, SnapshotArena};
use serde::Serialize;
use tokio::time::MissedTickBehavior;

use crate::config::ResolvedConfig;
use crate::script::ReplayScript;
use crate::state::describe_changes;

#[derive(Serialize)]
struct CycleRecord<'a> {
    index: u64,
    applied: usize,
    rejected: usize,
    snapshot: &'a InputSnapshot,
}

/// One `[[cycle]]` table; printed per cycle so output streams.
#[derive(Serialize)]
struct Transcript<'a> {
    cycle: Vec<CycleRecord<'a>>,
}

fn print_report(report: &CycleReport, as_toml: bool) -> anyhow::Result<()> {
    if as_toml {
        let transcript = Transcript {
            cycle: vec![CycleRecord {
                index: report.cycle,
                applied: report.applied,
                rejected: report.rejected,
                snapshot: &report.snapshot,
            }],
        };
        println!("{}", toml::to_string(&transcript)?);
    } else {
        println!("cycle {:>4}  {}", report.cycle, report.snapshot);
    }
    Ok(())
}

/// One line per retained snapshot, oldest first. The oldest has no
/// retained predecessor and is printed whole.
fn history_lines(arena: &SnapshotArena) -> Vec<String> {
    arena
        .iter()
        .map(|(&cycle, snapshot)| {
            let previous = cycle.checked_sub(1).and_then(|c| arena.get(c));
            match previous {
                None => format!("cycle {cycle:>4}  {snapshot}"),
                Some(prev) => {
                    let changes: Vec<String> = describe_changes(Some(prev.as_ref()), snapshot)
                        .into_iter()
                        .map(|(text, _)| text)
                        .collect();
                    if changes.is_empty() {
                        format!("cycle {cycle:>4}  unchanged")
                    } else {
                        format!("cycle {cycle:>4}  {}", changes.join(", "))
                    }
                }
            }
        })
        .collect()
}

pub async fn run(
    script_path: &Path,
    realtime: bool,
    as_toml: bool,
    show_history: bool,
    resolved: ResolvedConfig,
) -> anyhow::Result<()> {
    let config = resolved.config;
    let script = ReplayScript::load(script_path)?;
    log::info!(
        "replaying {} ({} frames, {} events)",
        script_path.display(),
        script.frames.len(),
        script.event_count()
    );

    let mut capture = CaptureLoop::new(script.into_backend(), config.settings(), config.history);

    let mut ticker = realtime.then(|| {
        let mut interval = tokio::time::interval(config.frame_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    let mut rejected = 0;
    loop {
        if let Some(ticker) = ticker.as_mut() {
            ticker.tick().await;
        }
        let Some(report) = capture.step() else {
            break;
        };
        rejected += report.rejected;
        print_report(&report, as_toml)?;
    }

    let backend = capture.backend();
    let warps = backend.warps().len();
    let reason = capture
        .shutdown_reason()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "script exhausted".to_string());
    if as_toml {
        println!("# {} cycles, {warps} warps, {rejected} rejected: {reason}", capture.cycles());
    } else {
        println!();
        println!(
            "{} cycles, {} pumps, {} events delivered, {warps} warps, {rejected} rejected events",
            capture.cycles(),
            backend.pumps(),
            backend.delivered()
        );
        println!("stopped: {reason}");
    }

    if show_history {
        let arena = capture.arena();
        if let Some((latest, _)) = arena.latest() {
            let prefix = if as_toml { "# " } else { "" };
            println!();
            println!(
                "{prefix}history: {} of {} retained, latest cycle {latest}",
                arena.len(),
                arena.capacity()
            );
            for line in history_lines(arena) {
                println!("{prefix}{line}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inputcap_core::{CaptureSettings, RawEvent, ScriptFrame, ScriptedBackend};

    #[test]
    fn test_history_covers_retained_window() {
        let script = vec![
            ScriptFrame::at(0.0).with(RawEvent::Reshape { w: 80, h: 24 }),
            ScriptFrame::at(0.1).with(RawEvent::KeyDown { code: 120 }),
            ScriptFrame::at(0.2),
            ScriptFrame::at(0.3).with(RawEvent::KeyUp { code: 120 }),
        ];
        let mut capture = CaptureLoop::new(ScriptedBackend::new(script), CaptureSettings::default(), 3);
        while capture.step().is_some() {}

        let lines = history_lines(capture.arena());
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("cycle    2  t="));
        assert_eq!(lines[1], "cycle    3  key up 'x'");
        assert_eq!(lines[2], "cycle    4  unchanged");
    }
}
