use std::{
    io::{self, Write},
    time::Duration,
};

use anyhow::{Context, Result};
use boid_core::Flock;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::render::Frame;

/// Delay between ticks when no key is pressed
pub const DEFAULT_TICK_MILLIS: u64 = 100;

pub struct TerminalApp {
    flock: Flock,
    tick_interval: Duration,
}

impl TerminalApp {
    pub fn new(flock: Flock, tick_interval: Duration) -> Self {
        Self {
            flock,
            tick_interval,
        }
    }

    pub fn flock(&self) -> &Flock {
        &self.flock
    }

    /// Takes over the terminal until the user quits; the terminal is restored
    /// even if the loop fails.
    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode().context("failed to enable raw mode")?;
        execute!(stdout, EnterAlternateScreen, cursor::Hide)
            .context("failed to enter alternate screen")?;

        let result = self.event_loop(&mut stdout);

        if let Err(err) = execute!(stdout, cursor::Show, LeaveAlternateScreen) {
            log::error!("failed to leave alternate screen: {}", err);
        }
        if let Err(err) = terminal::disable_raw_mode() {
            log::error!("failed to disable raw mode: {}", err);
        }

        result
    }

    fn event_loop<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let mut surface = None;

        loop {
            // The surface may be resized between ticks
            let (cols, rows) = terminal::size().context("failed to query terminal size")?;
            if surface != Some((rows, cols)) {
                log::debug!("surface is {}x{}", rows, cols);
                surface = Some((rows, cols));
            }

            Frame::from_flock(&self.flock, rows, cols)
                .draw(out)
                .context("failed to draw frame")?;
            self.flock.update(rows as u32, cols as u32);

            if event::poll(self.tick_interval)? {
                if let Event::Key(key) = event::read()? {
                    if is_quit(key) {
                        log::info!("Quit requested after {} ticks", self.flock.tick());
                        break;
                    }
                }
            }
        }

        Ok(())
    }
}

pub fn is_quit(key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    matches!(
        (key.code, key.modifiers),
        (KeyCode::Char('q'), _)
            | (KeyCode::Char('Q'), _)
            | (KeyCode::Esc, _)
            | (KeyCode::Char('c'), KeyModifiers::CONTROL)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use boid_core::BoidConfig;

    #[test]
    fn test_quit_keys() {
        assert!(is_quit(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_other_keys_keep_running() {
        assert!(!is_quit(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE)));

        let mut release = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert!(!is_quit(release));
    }

    #[test]
    fn test_app_owns_flock() {
        let flock = Flock::new(20.0, 10, BoidConfig::default(), 24, 80, 3);
        let app = TerminalApp::new(flock, Duration::from_millis(DEFAULT_TICK_MILLIS));
        assert_eq!(app.flock().len(), 10);
    }
}
