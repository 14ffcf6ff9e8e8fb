use std::time::Duration;
use tracing::debug;

use crate::countdown::Countdown;
use crate::error::{Result, TimerError};

#[derive(Debug, Clone, PartialEq)]
pub struct CountdownSpec {
    pub name: String,
    pub duration: Duration,
}

impl CountdownSpec {
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        CountdownSpec {
            name: name.into(),
            duration,
        }
    }

    pub fn start(&self) -> Countdown {
        Countdown::new(self.name.clone(), self.duration)
    }
}

/// Full passes through the timer list still to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loops {
    Infinite,
    Remaining(u32),
}

impl Loops {
    /// `-1` loops forever; any other value must be a positive pass count.
    pub fn from_flag(n: i64) -> Result<Self> {
        match n {
            -1 => Ok(Loops::Infinite),
            n if n >= 1 => u32::try_from(n)
                .map(Loops::Remaining)
                .map_err(|_| TimerError::InvalidArgument(format!("too many loops: {n}"))),
            n => Err(TimerError::InvalidArgument(format!(
                "invalid loop count {n}: use -1 to loop forever or a positive number"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sequence {
    specs: Vec<CountdownSpec>,
    current: usize,
    loops: Loops,
    finished: bool,
}

impl Sequence {
    pub fn new(specs: Vec<CountdownSpec>, loops: Loops) -> Result<Self> {
        if specs.is_empty() {
            return Err(TimerError::InvalidArgument(
                "need at least one timer, for example: timer 25m or timer work=25m rest=5m"
                    .to_string(),
            ));
        }
        Ok(Sequence {
            specs,
            current: 0,
            loops,
            finished: false,
        })
    }

    pub fn current(&self) -> &CountdownSpec {
        &self.specs[self.current]
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Moves to the next countdown, wrapping to the start of the list and
    /// spending one loop when the end is passed. Returns `None` once the
    /// last loop has run.
    pub fn advance(&mut self) -> Option<&CountdownSpec> {
        if self.finished {
            return None;
        }

        let mut next = self.current + 1;
        if next >= self.specs.len() {
            next = 0;
            if let Loops::Remaining(n) = self.loops {
                self.loops = Loops::Remaining(n.saturating_sub(1));
            }
        }

        if self.loops == Loops::Remaining(0) {
            debug!("sequence finished");
            self.finished = true;
            return None;
        }

        self.current = next;
        let spec = &self.specs[self.current];
        debug!(index = self.current, name = %spec.name, loops = ?self.loops, "advancing sequence");
        Some(spec)
    }
}
