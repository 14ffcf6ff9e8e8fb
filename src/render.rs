use chrono::NaiveTime;
use crossterm::style::{Color, Stylize, style};
use serde::Deserialize;
use std::time::Duration;

use crate::countdown::{Countdown, Status};
use crate::duration::format_duration;
use crate::gradient::Gradient;

pub const PADDING: u16 = 2;
pub const MAX_WIDTH: u16 = 80;
const MIN_BAR_WIDTH: usize = 10;
const FILLED: char = '\u{2588}';
const EMPTY: char = '\u{2591}';
const HINTS: &str = "space pause \u{b7} q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    pub width: u16,
    pub height: u16,
}

impl Default for Dims {
    fn default() -> Self {
        Dims {
            width: 80,
            height: 24,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
pub enum TimeFormat {
    /// 3:04PM
    #[default]
    #[serde(rename = "kitchen")]
    Kitchen,
    /// 15:04
    #[serde(rename = "24h")]
    #[value(name = "24h")]
    TwentyFour,
}

impl TimeFormat {
    pub fn format(self, time: NaiveTime) -> String {
        match self {
            TimeFormat::Kitchen => time.format("%-I:%M%p").to_string(),
            TimeFormat::TwentyFour => time.format("%H:%M").to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DisplayOptions {
    pub time_format: TimeFormat,
    pub fullscreen: bool,
    pub gradient: Gradient,
    /// Keep the final frame on screen instead of clearing it.
    pub keep: bool,
}

/// Everything about the running timer the projector needs to draw a frame.
#[derive(Debug, Clone, Copy)]
pub struct ViewModel<'a> {
    pub countdown: &'a Countdown,
    pub started_at: NaiveTime,
    pub ends_at: Option<NaiveTime>,
    /// `(index, len)` of the active countdown when running a sequence.
    pub position: Option<(usize, usize)>,
}

struct Line {
    width: usize,
    text: String,
}

impl Line {
    fn new() -> Self {
        Line {
            width: 0,
            text: String::new(),
        }
    }

    fn push(&mut self, plain: &str, styled: impl std::fmt::Display) {
        self.width += plain.chars().count();
        self.text.push_str(&styled.to_string());
    }

    fn push_plain(&mut self, plain: &str) {
        self.push(plain, plain);
    }
}

/// Projects the timer state onto the text of one frame.
pub fn project(view: &ViewModel, dims: Dims, options: &DisplayOptions) -> String {
    let countdown = view.countdown;
    if countdown.status().is_terminal() && !options.keep {
        return String::new();
    }

    let mut lines = vec![
        header(view, options.time_format),
        progress_bar(
            countdown.progress(),
            bar_width(dims, options.fullscreen),
            &options.gradient,
        ),
    ];

    if !options.fullscreen {
        return lines
            .into_iter()
            .map(|l| l.text)
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut hints = Line::new();
    hints.push(HINTS, style(HINTS).dim());
    lines.push(Line::new());
    lines.push(hints);
    center(lines, dims)
}

fn header(view: &ViewModel, time_format: TimeFormat) -> Line {
    let countdown = view.countdown;
    let mut line = Line::new();

    let start = time_format.format(view.started_at);
    line.push(&start, style(&start).bold());

    let mut name = countdown.name().to_string();
    if let Some((index, len)) = view.position {
        name = format!("{name} ({}/{len})", index + 1).trim_start().to_string();
    }
    if !name.is_empty() {
        line.push_plain(": ");
        line.push(&name, style(&name).italic());
    }

    line.push_plain(" - ");
    if let Some(ends_at) = view.ends_at {
        let end = time_format.format(ends_at);
        line.push(&end, style(&end).bold());
        line.push_plain(" - ");
    }

    let remaining = format_duration(round_up_to_second(countdown.remaining()));
    line.push(&remaining, style(&remaining).bold());

    if countdown.status() == Status::Stopped {
        line.push(" (paused)", style(" (paused)").dim());
    }
    line
}

fn round_up_to_second(d: Duration) -> Duration {
    Duration::from_secs(d.as_millis().div_ceil(1000) as u64)
}

/// Number of bar cells for the given terminal size, not counting the
/// percentage label.
pub fn bar_width(dims: Dims, fullscreen: bool) -> usize {
    let mut width = dims.width.saturating_sub(PADDING * 2 + 4);
    if !fullscreen {
        width = width.min(MAX_WIDTH);
    }
    (width as usize).max(MIN_BAR_WIDTH)
}

fn progress_bar(fraction: f64, cells: usize, gradient: &Gradient) -> Line {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = ((cells as f64 * fraction).round() as usize).min(cells);
    let mut line = Line::new();
    let cell = FILLED.to_string();

    for i in 0..filled {
        let t = if cells > 1 {
            i as f64 / (cells - 1) as f64
        } else {
            0.0
        };
        line.push(&cell, style(FILLED).with(Color::from(gradient.at(t))));
    }

    let empty: String = std::iter::repeat_n(EMPTY, cells - filled).collect();
    line.push(&empty, style(&empty).with(Color::DarkGrey));

    let percent = format!(" {:3.0}%", fraction * 100.0);
    line.push_plain(&percent);
    line
}

fn center(lines: Vec<Line>, dims: Dims) -> String {
    let block_width = lines.iter().map(|l| l.width).max().unwrap_or(0);
    let left = " ".repeat((dims.width as usize).saturating_sub(block_width) / 2);
    let top = (dims.height as usize).saturating_sub(lines.len()) / 2;

    let mut out = "\n".repeat(top);
    let body: Vec<String> = lines
        .into_iter()
        .map(|l| {
            if l.width == 0 {
                String::new()
            } else {
                format!("{left}{}", l.text)
            }
        })
        .collect();
    out.push_str(&body.join("\n"));
    out
}
