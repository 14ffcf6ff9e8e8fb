use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

use crate::error::{Result, TimerError};

static COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*|\.\d+)(ns|us|µs|ms|s|m|h)").unwrap());

const CLOCK_FORMATS: [&str; 4] = ["%H:%M", "%I:%M%p", "%H:%M:%S", "%I:%M:%S%p"];

/// Further back than any DST jump, so the wall time it lands on exists.
const GAP_LOOKBACK: TimeDelta = TimeDelta::hours(3);

/// Parses a duration argument such as `25m`, `1h30m`, `1.5h` or a bare
/// number of seconds (`90`, `2.5`, `1e3`).
pub fn parse(input: &str) -> Result<Duration> {
    let input = input.trim();
    let total = match bare_seconds(input) {
        Some(secs) if secs > 0.0 => Duration::try_from_secs_f64(secs)
            .map_err(|_| TimerError::InvalidDuration(format!("{input:?}: out of range")))?,
        Some(_) => Duration::ZERO,
        None => parse_compound(input)
            .ok_or_else(|| TimerError::InvalidDuration(format!("{input:?}")))?,
    };

    if total.is_zero() {
        return Err(TimerError::InvalidDuration(format!(
            "{input:?}: duration must be greater than zero"
        )));
    }
    Ok(total)
}

/// A unitless real number, read as seconds.
fn bare_seconds(input: &str) -> Option<f64> {
    input.parse::<f64>().ok().filter(|secs| secs.is_finite())
}

fn parse_compound(input: &str) -> Option<Duration> {
    if input.is_empty() {
        return None;
    }

    let mut total = 0f64;
    let mut consumed = 0;
    for caps in COMPONENT.captures_iter(input) {
        let whole = caps.get(0)?;
        if whole.start() != consumed {
            return None;
        }
        consumed = whole.end();

        let value: f64 = caps[1].parse().ok()?;
        let nanos_per_unit = match &caps[2] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };
        total += value * nanos_per_unit;
    }

    if consumed != input.len() || !total.is_finite() || total > u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(total.round() as u64))
}

/// Duration from `now` until the next occurrence of the wall-clock time in
/// `input`. A target at or before `now` resolves to the same time tomorrow.
pub fn until_clock_time<Tz: TimeZone>(input: &str, now: &DateTime<Tz>) -> Result<Duration> {
    let input = input.trim();
    if input.len() == 4 && input.as_bytes()[1] == b':' {
        return Err(TimerError::AmbiguousTimeFormat(input.to_string()));
    }

    let time = CLOCK_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(input, fmt).ok())
        .ok_or_else(|| TimerError::UnsupportedTimeFormat(input.to_string()))?;

    let today = now.date_naive();
    let mut target = localize(now, today.and_time(time))?;
    if target <= *now {
        let tomorrow = today
            .succ_opt()
            .ok_or_else(|| TimerError::InvalidDuration(format!("{input:?}: date out of range")))?;
        target = localize(now, tomorrow.and_time(time))?;
    }

    let remaining = target.signed_duration_since(now.clone());
    match remaining.to_std() {
        Ok(d) if !d.is_zero() => Ok(d),
        _ => Err(TimerError::InvalidDuration(format!(
            "{input:?} is not in the future"
        ))),
    }
}

fn localize<Tz: TimeZone>(now: &DateTime<Tz>, naive: NaiveDateTime) -> Result<DateTime<Tz>> {
    let tz = now.timezone();
    if let Some(local) = tz.from_local_datetime(&naive).earliest() {
        return Ok(local);
    }

    // Skipped by a forward DST jump: 02:30 across a one-hour jump becomes 03:30.
    tz.from_local_datetime(&(naive - GAP_LOOKBACK))
        .earliest()
        .and_then(|before| before.checked_add_signed(GAP_LOOKBACK))
        .ok_or_else(|| TimerError::InvalidDuration(format!("{naive} does not exist locally")))
}

/// Formats whole seconds as `1h30m45s`, `2m30s` or `5s`; anything under a
/// second renders as `0s`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs == 0 {
        return "0s".to_string();
    }

    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{m}m{s}s")
    } else {
        format!("{s}s")
    }
}
