use chrono::NaiveTime;
use std::time::Duration;
use tracing::debug;

use crate::countdown::{Countdown, Status, TickOutcome};
use crate::render::{self, Dims, DisplayOptions, ViewModel};
use crate::sequence::{CountdownSpec, Sequence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Tick,
    Resize { width: u16, height: u16 },
    PauseToggle,
    Quit,
    HookCompleted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Render,
    /// The countdown finished; run its completion hooks, then send
    /// [`Event::HookCompleted`].
    RunHooks(CountdownSpec),
    /// Restart the tick source at a new interval.
    Restart { interval: Duration },
    Exit(Outcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Interrupted,
}

/// The timer as a whole: the active countdown, the sequence feeding it and
/// the terminal size. All mutation goes through [`App::apply`].
#[derive(Debug)]
pub struct App {
    sequence: Sequence,
    countdown: Countdown,
    dims: Dims,
    started_at: NaiveTime,
    ends_at: Option<NaiveTime>,
    awaiting_hooks: bool,
    outcome: Option<Outcome>,
}

impl App {
    pub fn new(sequence: Sequence, started_at: NaiveTime, ends_at: Option<NaiveTime>) -> Self {
        let countdown = sequence.current().start();
        debug!(name = countdown.name(), total = ?countdown.total(), "countdown started");
        App {
            sequence,
            countdown,
            dims: Dims::default(),
            started_at,
            ends_at,
            awaiting_hooks: false,
            outcome: None,
        }
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        if let Event::Resize { width, height } = event {
            self.dims = Dims { width, height };
            return vec![Effect::Render];
        }
        if self.outcome.is_some() {
            return Vec::new();
        }

        match event {
            Event::Tick if !self.awaiting_hooks => match self.countdown.on_tick() {
                TickOutcome::Advanced => vec![Effect::Render],
                TickOutcome::TimedOut => {
                    debug!(name = self.countdown.name(), "countdown timed out");
                    self.awaiting_hooks = true;
                    vec![
                        Effect::Render,
                        Effect::RunHooks(self.sequence.current().clone()),
                    ]
                }
                TickOutcome::Ignored => Vec::new(),
            },
            Event::PauseToggle if !self.awaiting_hooks => {
                if !self.countdown.toggle_pause() {
                    return Vec::new();
                }
                match self.countdown.status() {
                    Status::Running => {
                        debug!("countdown resumed");
                        vec![
                            Effect::Restart {
                                interval: self.countdown.interval(),
                            },
                            Effect::Render,
                        ]
                    }
                    _ => {
                        debug!("countdown paused");
                        vec![Effect::Render]
                    }
                }
            }
            Event::Quit => {
                debug!(name = self.countdown.name(), "countdown interrupted");
                self.countdown.interrupt();
                self.outcome = Some(Outcome::Interrupted);
                vec![Effect::Render, Effect::Exit(Outcome::Interrupted)]
            }
            Event::HookCompleted if self.awaiting_hooks => {
                self.awaiting_hooks = false;
                match self.sequence.advance() {
                    Some(spec) => {
                        self.countdown = spec.start();
                        debug!(name = self.countdown.name(), "countdown started");
                        vec![
                            Effect::Restart {
                                interval: self.countdown.interval(),
                            },
                            Effect::Render,
                        ]
                    }
                    None => {
                        self.outcome = Some(Outcome::Completed);
                        vec![Effect::Render, Effect::Exit(Outcome::Completed)]
                    }
                }
            }
            _ => Vec::new(),
        }
    }

    pub fn view(&self, options: &DisplayOptions) -> String {
        let position = (self.sequence.len() > 1).then(|| (self.sequence.index(), self.sequence.len()));
        let view = ViewModel {
            countdown: &self.countdown,
            started_at: self.started_at,
            ends_at: self.ends_at,
            position,
        };
        render::project(&view, self.dims, options)
    }
}
