use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::{cursor, execute, terminal};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

use crate::error::Result;

/// Full-screen session for the history chart. Raw mode and the alternate screen last until
/// `close` is called or the value is dropped.
pub struct ChartScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    closed: bool,
}

impl ChartScreen {
    pub fn open() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(err.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            closed: false,
        })
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame<'_>)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// Next key press within `timeout`. Releases, repeats and non-key events read as `None`.
    pub fn next_key(&self, timeout: Duration) -> Result<Option<KeyCode>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key.code)),
            _ => Ok(None),
        }
    }

    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        execute!(
            self.terminal.backend_mut(),
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }
}

impl Drop for ChartScreen {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("failed to restore the terminal: {err}");
        }
    }
}
