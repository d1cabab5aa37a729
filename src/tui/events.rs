//! Terminal events for the ask page
//!
//! Wraps crossterm's event stream into the few events the page reacts to.

use std::time::Duration;

use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};

/// Events that can occur in the TUI
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed
    Key(KeyEvent),
    /// Mouse moved, pressed, scrolled
    Mouse(MouseEvent),
    /// Terminal was resized
    Resize(u16, u16),
    /// Nothing happened within the tick rate
    Tick,
}

/// Polls the terminal for events
#[derive(Debug)]
pub struct EventHandler {
    tick_rate: Duration,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler {
    /// Default tick rate is well under the hover grace period so closes
    /// fire close to their deadline.
    pub fn new() -> Self {
        Self::with_tick_rate(Duration::from_millis(30))
    }

    pub fn with_tick_rate(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }

    /// Wait up to the tick rate for the next event
    pub fn poll(&self) -> anyhow::Result<Event> {
        if event::poll(self.tick_rate)? {
            Ok(Self::convert_event(event::read()?))
        } else {
            Ok(Event::Tick)
        }
    }

    fn convert_event(event: event::Event) -> Event {
        match event {
            // Windows reports releases too; only presses edit the input
            event::Event::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
            event::Event::Mouse(mouse) => Event::Mouse(mouse),
            event::Event::Resize(cols, rows) => Event::Resize(cols, rows),
            _ => Event::Tick,
        }
    }
}

impl Event {
    /// Ctrl-C or Esc
    pub fn is_quit(&self) -> bool {
        matches!(
            self,
            Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            }) | Event::Key(KeyEvent {
                code: KeyCode::Esc,
                ..
            })
        )
    }

    pub fn is_enter(&self) -> bool {
        matches!(
            self,
            Event::Key(KeyEvent {
                code: KeyCode::Enter,
                ..
            })
        )
    }
}
