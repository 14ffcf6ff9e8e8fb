use chrono::{DateTime, TimeZone};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::Cli;
use crate::duration;
use crate::error::{Result, TimerError};
use crate::gradient::Gradient;
use crate::hooks::CompletionAction;
use crate::render::{DisplayOptions, TimeFormat};
use crate::sequence::{CountdownSpec, Loops};

const DEFAULT_NAME: &str = "unnamed";

/// Contents of `config.toml`. Every key is optional; command-line flags
/// take precedence.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub name: Option<String>,
    pub format: Option<TimeFormat>,
    pub gradient: Option<String>,
    pub fullscreen: Option<bool>,
    pub keep: Option<bool>,
    pub notify: Option<bool>,
    pub loops: Option<i64>,
    pub run: Vec<String>,
    pub presets: HashMap<String, String>,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map_or_else(Self::config_path, Path::to_path_buf);
        let mut config = match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents).map_err(|source| TimerError::Config {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file");
                Config::default()
            }
            Err(e) => {
                warn!(path = %path.display(), "failed to read config: {e}");
                Config::default()
            }
        };

        let mut presets = Self::default_presets();
        presets.extend(std::mem::take(&mut config.presets));
        config.presets = presets;
        Ok(config)
    }

    pub fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("timer")
            .join("config.toml")
    }

    fn default_presets() -> HashMap<String, String> {
        HashMap::from([
            ("pomodoro".to_string(), "25m".to_string()),
            ("break".to_string(), "5m".to_string()),
            ("long-break".to_string(), "15m".to_string()),
        ])
    }

    pub fn resolve_preset(&self, name: &str) -> Option<&str> {
        self.presets.get(name).map(|s| s.as_str())
    }
}

/// Everything the timer needs, resolved once at startup from the command
/// line and the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub timers: Vec<CountdownSpec>,
    pub loops: Loops,
    pub actions: Vec<CompletionAction>,
    pub display: DisplayOptions,
    /// Wall-clock target when counting down to a time of day.
    pub ends_at: Option<chrono::NaiveTime>,
}

impl Settings {
    pub fn build<Tz: TimeZone>(cli: &Cli, config: &Config, now: &DateTime<Tz>) -> Result<Self> {
        let default_name = cli
            .name
            .clone()
            .or_else(|| config.name.clone())
            .unwrap_or_else(|| DEFAULT_NAME.to_string());

        let (timers, ends_at) = match &cli.time {
            Some(clock) => {
                let d = duration::until_clock_time(clock, now)?;
                let ends_at = chrono::Duration::from_std(d)
                    .ok()
                    .map(|delta| now.time() + delta);
                (vec![CountdownSpec::new(default_name, d)], ends_at)
            }
            None => {
                let timers = cli
                    .timers
                    .iter()
                    .map(|arg| resolve_timer(arg, &default_name, config))
                    .collect::<Result<Vec<_>>>()?;
                (timers, None)
            }
        };
        if timers.is_empty() {
            return Err(TimerError::InvalidArgument(
                "need a duration, a clock time or timers in the format name=duration, \
                 for example: timer 25m, timer -t 14:30 or timer work=25m rest=5m"
                    .to_string(),
            ));
        }

        let loops = Loops::from_flag(cli.loops.or(config.loops).unwrap_or(1))?;

        let runs = if cli.run.is_empty() { &config.run } else { &cli.run };
        let mut actions: Vec<CompletionAction> =
            runs.iter().cloned().map(CompletionAction::Command).collect();
        if cli.notify || config.notify.unwrap_or(false) {
            actions.push(CompletionAction::Notify);
        }

        let gradient = cli
            .gradient
            .as_deref()
            .or(config.gradient.as_deref())
            .map(Gradient::resolve)
            .unwrap_or_default();

        let display = DisplayOptions {
            time_format: cli.format.or(config.format).unwrap_or_default(),
            fullscreen: cli.fullscreen || config.fullscreen.unwrap_or(false),
            gradient,
            keep: cli.keep || config.keep.unwrap_or(false),
        };

        Ok(Settings {
            timers,
            loops,
            actions,
            display,
            ends_at,
        })
    }
}

/// Resolves one positional timer: `name=duration`, a bare duration named
/// `default_name`, or a preset.
fn resolve_timer(arg: &str, default_name: &str, config: &Config) -> Result<CountdownSpec> {
    if let Some((name, value)) = arg.split_once('=') {
        return Ok(CountdownSpec::new(name, duration::parse(value)?));
    }

    match duration::parse(arg) {
        Ok(d) => Ok(CountdownSpec::new(default_name, d)),
        Err(e) => match config.resolve_preset(arg) {
            Some(preset) => Ok(CountdownSpec::new(arg, duration::parse(preset)?)),
            None => Err(e),
        },
    }
}
