use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use inputcap_core::CaptureSettings;
use serde::{Deserialize, Serialize};

const PROJECT_CONFIG_DIR: &str = ".inputcap";
const CONFIG_FILE: &str = "config.toml";

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Passed with --config
    Explicit(PathBuf),
    /// Nearest .inputcap/config.toml walking up from the working directory
    Project(PathBuf),
    /// <config dir>/inputcap/config.toml
    User(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Explicit(p) => format!("{} (--config)", p.display()),
            Self::Project(p) => format!("{} (project)", p.display()),
            Self::User(p) => format!("{} (user)", p.display()),
            Self::Defaults => "built-in defaults".to_string(),
        }
    }
}

/// Configuration read from config.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Capture cycles per second when pacing is on.
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
    /// Edge band, in pixels/cells, where motion re-centers the cursor.
    #[serde(default = "default_wrap_margin")]
    pub wrap_margin: i32,
    /// Published snapshots kept around for lookup.
    #[serde(default = "default_history")]
    pub history: usize,
    /// Log destination while the monitor owns the terminal.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_target_fps() -> u32 {
    60
}

fn default_wrap_margin() -> i32 {
    CaptureSettings::default().wrap_margin
}

fn default_history() -> usize {
    2
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_fps: default_target_fps(),
            wrap_margin: default_wrap_margin(),
            history: default_history(),
            log_file: None,
        }
    }
}

impl CaptureConfig {
    pub fn settings(&self) -> CaptureSettings {
        CaptureSettings {
            wrap_margin: self.wrap_margin,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }

    /// Explicit log_file, else <data dir>/inputcap/monitor.log.
    pub fn monitor_log_path(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| dirs::data_local_dir().map(|d| d.join("inputcap").join("monitor.log")))
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.target_fps == 0 {
            anyhow::bail!("target_fps must be at least 1");
        }
        if self.wrap_margin < 0 {
            anyhow::bail!("wrap_margin must not be negative (got {})", self.wrap_margin);
        }
        Ok(())
    }
}

/// The configuration in effect and where it was found.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: CaptureConfig,
    pub source: ConfigSource,
}

/// Resolve configuration for the current directory.
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<ResolvedConfig> {
    let user_config = dirs::config_dir().map(|d| d.join("inputcap").join(CONFIG_FILE));
    resolve_config_from(explicit, &std::env::current_dir()?, user_config.as_deref())
}

/// Resolve configuration: explicit path, then project walk-up from `start`,
/// then the user config file, then defaults.
pub fn resolve_config_from(
    explicit: Option<&Path>,
    start: &Path,
    user_config: Option<&Path>,
) -> anyhow::Result<ResolvedConfig> {
    if let Some(path) = explicit {
        return Ok(ResolvedConfig {
            config: load(path)?,
            source: ConfigSource::Explicit(path.to_path_buf()),
        });
    }
    if let Some(path) = find_project_config(start) {
        return Ok(ResolvedConfig {
            config: load(&path)?,
            source: ConfigSource::Project(path),
        });
    }
    if let Some(path) = user_config.filter(|p| p.exists()) {
        return Ok(ResolvedConfig {
            config: load(path)?,
            source: ConfigSource::User(path.to_path_buf()),
        });
    }
    Ok(ResolvedConfig {
        config: CaptureConfig::default(),
        source: ConfigSource::Defaults,
    })
}

fn find_project_config(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(PROJECT_CONFIG_DIR).join(CONFIG_FILE);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

fn load(path: &Path) -> anyhow::Result<CaptureConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: CaptureConfig =
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}
