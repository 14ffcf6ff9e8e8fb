use crossterm::{
    cursor, execute, queue,
    style::Print,
    terminal::{self, ClearType},
};
use std::io::{self, Write};

use crate::render::Dims;

/// Owns the terminal while a timer is on screen. Raw mode (and the
/// alternate screen in fullscreen mode) is undone on drop, so every exit
/// path leaves the terminal usable.
pub struct Terminal {
    fullscreen: bool,
    active: bool,
    drawn_lines: u16,
}

impl Terminal {
    pub fn new(fullscreen: bool) -> Self {
        Terminal {
            fullscreen,
            active: false,
            drawn_lines: 0,
        }
    }

    pub fn size() -> Dims {
        terminal::size()
            .map(|(width, height)| Dims { width, height })
            .unwrap_or_default()
    }

    pub fn setup(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;
        if self.fullscreen {
            execute!(io::stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
        } else {
            execute!(io::stdout(), cursor::Hide)?;
        }
        Ok(())
    }

    pub fn teardown(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let mut stdout = io::stdout();
        if self.fullscreen {
            execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen)?;
        } else {
            if self.drawn_lines > 0 {
                queue!(stdout, Print("\r\n"))?;
            }
            execute!(stdout, cursor::Show)?;
        }
        self.drawn_lines = 0;
        terminal::disable_raw_mode()
    }

    /// Hands the terminal back in cooked mode, e.g. while completion hooks
    /// write to it.
    pub fn suspend(&mut self) -> io::Result<()> {
        self.teardown()
    }

    pub fn resume(&mut self) -> io::Result<()> {
        self.setup()
    }

    pub fn draw(&mut self, frame: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();

        if self.fullscreen {
            queue!(stdout, cursor::MoveTo(0, 0), terminal::Clear(ClearType::All))?;
        } else {
            queue!(stdout, cursor::MoveToColumn(0))?;
            if self.drawn_lines > 1 {
                queue!(stdout, cursor::MoveUp(self.drawn_lines - 1))?;
            }
            queue!(stdout, terminal::Clear(ClearType::FromCursorDown))?;
        }

        let mut lines = 0u16;
        for (i, line) in frame.split('\n').enumerate() {
            if i > 0 {
                queue!(stdout, Print("\r\n"))?;
            }
            queue!(stdout, Print(line))?;
            lines = lines.saturating_add(1);
        }
        self.drawn_lines = if frame.is_empty() { 0 } else { lines };

        stdout.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.teardown();
    }
}
