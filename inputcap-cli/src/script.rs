use std::path::Path;

use anyhow::Context;
use inputcap_core::{RawEvent, ScriptFrame, ScriptedBackend};
use serde::Deserialize;

/// A recorded input session: one `[[frame]]` per pump.
///
/// ```toml
/// window = [800, 600]
///
/// [[frame]]
/// time = 0.0
/// events = [{ kind = "passive_motion", x = 400, y = 300 }]
///
/// [[frame]]
/// time = 0.016
/// events = [{ kind = "key_down", code = 119 }]
/// terminate = true
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScript {
    /// Initial window size, delivered as a reshape before the first frame's events.
    #[serde(default)]
    pub window: Option<[i32; 2]>,
    #[serde(default, rename = "frame")]
    pub frames: Vec<ScriptFrame>,
}

impl ReplayScript {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("in script {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let script: ReplayScript = toml::from_str(content)?;
        if script.frames.is_empty() {
            anyhow::bail!("script has no [[frame]] entries");
        }
        if let Some((i, frame)) = script.frames.iter().enumerate().find(|(_, f)| !f.time.is_finite()) {
            anyhow::bail!("frame {i} has a non-finite time ({})", frame.time);
        }
        for (i, pair) in script.frames.windows(2).enumerate() {
            if pair[1].time < pair[0].time {
                anyhow::bail!(
                    "frame {} goes back in time ({} after {})",
                    i + 1,
                    pair[1].time,
                    pair[0].time
                );
            }
        }
        Ok(script)
    }

    pub fn event_count(&self) -> usize {
        self.frames.iter().map(|f| f.events.len()).sum()
    }

    pub fn into_backend(mut self) -> ScriptedBackend {
        if let (Some([w, h]), Some(first)) = (self.window, self.frames.first_mut()) {
            first.events.insert(0, RawEvent::Reshape { w, h });
        }
        ScriptedBackend::new(self.frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inputcap_core::{CaptureLoop, CaptureSettings, IVec2};

    const SAMPLE: &str = r#"
window = [800, 600]

[[frame]]
time = 0.0
events = [{ kind = "passive_motion", x = 100, y = 100 }]

[[frame]]
time = 0.016
events = [
    { kind = "key_down", code = 119 },
    { kind = "motion", x = 150, y = 100 },
    { kind = "button", button = 0, pressed = true },
]

[[frame]]
time = 0.032
events = [{ kind = "entry", exited = true }]
terminate = true
"#;

    #[test]
    fn test_parse_sample() {
        let script = ReplayScript::parse(SAMPLE).unwrap();
        assert_eq!(script.window, Some([800, 600]));
        assert_eq!(script.frames.len(), 3);
        assert_eq!(script.event_count(), 5);
        assert_eq!(
            script.frames[1].events[0],
            RawEvent::KeyDown { code: 119 }
        );
        assert!(script.frames[2].terminate);
        assert!(!script.frames[0].terminate);
    }

    #[test]
    fn test_window_becomes_first_reshape() {
        let script = ReplayScript::parse(SAMPLE).unwrap();
        let mut capture = CaptureLoop::new(script.into_backend(), CaptureSettings::default(), 2);
        let first = capture.step().unwrap();
        assert_eq!(first.snapshot.size, IVec2::new(800, 600));
        assert!(first.snapshot.resized);
        assert_eq!(first.snapshot.mouse, IVec2::new(100, 100));

        let second = capture.step().unwrap();
        assert_eq!(second.snapshot.mouse_rel, IVec2::new(50, 0));
        assert!(second.snapshot.get_key(119).unwrap());

        let third = capture.step().unwrap();
        assert!(third.is_final());
        assert_eq!(third.snapshot.mouse, IVec2::new(400, 300));
        assert!(capture.step().is_none());
    }

    #[test]
    fn test_rejects_empty_script() {
        assert!(ReplayScript::parse("window = [10, 10]\n").is_err());
    }

    #[test]
    fn test_rejects_time_going_backwards() {
        let body = "[[frame]]\ntime = 1.0\n\n[[frame]]\ntime = 0.5\n";
        let err = ReplayScript::parse(body).unwrap_err();
        assert!(err.to_string().contains("back in time"));
    }

    #[test]
    fn test_rejects_non_finite_time() {
        for time in ["nan", "inf", "-inf"] {
            let body = format!("[[frame]]\ntime = 0.0\n\n[[frame]]\ntime = {time}\n");
            let err = ReplayScript::parse(&body).unwrap_err();
            assert!(err.to_string().contains("non-finite"), "{time}: {err}");
        }
    }

    #[test]
    fn test_unknown_event_kind_is_a_parse_error() {
        let body = "[[frame]]\ntime = 0.0\nevents = [{ kind = \"scroll\", dy = 1 }]\n";
        assert!(ReplayScript::parse(body).is_err());
    }
}
