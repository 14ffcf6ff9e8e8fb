use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, Interval};
use tracing::debug;

use crate::app::{App, Effect, Event, Outcome};
use crate::error::Result;
use crate::hooks::HookRunner;
use crate::render::DisplayOptions;
use crate::terminal::Terminal;

const INPUT_POLL: Duration = Duration::from_millis(50);

/// Drives `app` until it exits: ticks at the countdown's interval, forwards
/// key presses and resizes, and runs completion hooks between countdowns.
pub async fn run(mut app: App, display: &DisplayOptions, hooks: &HookRunner) -> Result<Outcome> {
    let mut terminal = Terminal::new(display.fullscreen);
    terminal.setup()?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let (input_paused, paused_rx) = watch::channel(false);
    // crossterm reads block, so input lives on its own thread
    std::thread::spawn(move || read_input(tx, paused_rx));

    let dims = Terminal::size();
    app.apply(Event::Resize {
        width: dims.width,
        height: dims.height,
    });
    terminal.draw(&app.view(display))?;
    let mut ticker = new_ticker(app.countdown().interval());

    loop {
        let event = tokio::select! {
            _ = ticker.tick() => Event::Tick,
            Some(event) = rx.recv() => event,
        };

        let mut pending = VecDeque::from([event]);
        while let Some(event) = pending.pop_front() {
            for effect in app.apply(event) {
                match effect {
                    Effect::Render => terminal.draw(&app.view(display))?,
                    Effect::Restart { interval } => ticker = new_ticker(interval),
                    Effect::RunHooks(spec) => {
                        if !hooks.is_empty() {
                            let _paused = InputPause::new(&input_paused);
                            terminal.suspend()?;
                            tokio::task::block_in_place(|| hooks.run(&spec))?;
                            terminal.resume()?;
                        }
                        pending.push_back(Event::HookCompleted);
                    }
                    Effect::Exit(outcome) => {
                        debug!(?outcome, elapsed = ?app.countdown().elapsed(), "timer exiting");
                        terminal.teardown()?;
                        return Ok(outcome);
                    }
                }
            }
        }
    }
}

fn new_ticker(interval: Duration) -> Interval {
    time::interval_at(Instant::now() + interval, interval)
}

/// Stops the input thread from reading the terminal while hooks own
/// stdin; reading resumes when dropped.
struct InputPause<'a>(&'a watch::Sender<bool>);

impl<'a> InputPause<'a> {
    fn new(paused: &'a watch::Sender<bool>) -> Self {
        paused.send_replace(true);
        InputPause(paused)
    }
}

impl Drop for InputPause<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

fn read_input(tx: mpsc::UnboundedSender<Event>, paused: watch::Receiver<bool>) {
    while !tx.is_closed() {
        if *paused.borrow() {
            std::thread::sleep(INPUT_POLL);
            continue;
        }
        match event::poll(INPUT_POLL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(_) => break,
        }
        // a key that arrived as hooks started stays queued until they finish
        if *paused.borrow() {
            continue;
        }
        let Ok(raw) = event::read() else {
            break;
        };
        if let Some(event) = translate(raw) {
            if tx.send(event).is_err() {
                break;
            }
        }
    }
}

/// Maps a terminal event to a timer event: `q`, `esc` and `ctrl+c` quit,
/// `space` and `p` pause or resume.
pub fn translate(raw: TermEvent) -> Option<Event> {
    match raw {
        TermEvent::Resize(width, height) => Some(Event::Resize { width, height }),
        TermEvent::Key(key) if key.kind != KeyEventKind::Release => translate_key(key),
        _ => None,
    }
}

fn translate_key(key: KeyEvent) -> Option<Event> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Event::Quit),
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(Event::Quit),
        KeyCode::Char(' ' | 'p') => Some(Event::PauseToggle),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> TermEvent {
        TermEvent::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn quit_keys() {
        assert_eq!(translate(key(KeyCode::Char('q'), KeyModifiers::NONE)), Some(Event::Quit));
        assert_eq!(translate(key(KeyCode::Esc, KeyModifiers::NONE)), Some(Event::Quit));
        assert_eq!(
            translate(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Event::Quit)
        );
    }

    #[test]
    fn plain_c_does_nothing() {
        assert_eq!(translate(key(KeyCode::Char('c'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn pause_keys() {
        assert_eq!(
            translate(key(KeyCode::Char(' '), KeyModifiers::NONE)),
            Some(Event::PauseToggle)
        );
        assert_eq!(
            translate(key(KeyCode::Char('p'), KeyModifiers::NONE)),
            Some(Event::PauseToggle)
        );
    }

    #[test]
    fn key_release_is_ignored() {
        let release = KeyEvent::new_with_kind(KeyCode::Char('q'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(translate(TermEvent::Key(release)), None);
    }

    #[test]
    fn resize_is_forwarded() {
        assert_eq!(
            translate(TermEvent::Resize(100, 30)),
            Some(Event::Resize {
                width: 100,
                height: 30
            })
        );
    }

    #[test]
    fn input_pause_lifts_on_drop() {
        let (paused, rx) = watch::channel(false);
        {
            let _pause = InputPause::new(&paused);
            assert!(*rx.borrow());
        }
        assert!(!*rx.borrow());
    }

    #[test]
    fn paused_reader_leaves_terminal_alone_and_exits_on_close() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (_paused, paused_rx) = watch::channel(true);
        let reader = std::thread::spawn(move || read_input(tx, paused_rx));
        std::thread::sleep(INPUT_POLL * 2);
        assert!(!reader.is_finished());
        drop(rx);
        reader.join().unwrap();
    }
}
