//! Terminal session for the app.
//!
//! [`Tui`] owns the ratatui terminal, puts the tty into raw mode on the
//! alternate screen, and feeds a background task's [`Event`]s to the app.

use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::cursor;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, Event as CrosstermEvent, EventStream, KeyCode,
    KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use futures::{FutureExt, StreamExt};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// How long the input task gets to notice cancellation before it is aborted.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

type Backend = CrosstermBackend<Stdout>;

/// Input the app reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Ctrl+C or SIGTERM.
    Quit,
    Error(String),
    Tick,
    Render,
    Paste(String),
    Key(KeyEvent),
    Resize(u16, u16),
}

#[derive(Clone, Copy, Debug)]
struct Rates {
    tick: Duration,
    frame: Duration,
}

pub struct Tui {
    terminal: Terminal<Backend>,
    rates: Rates,
    input: Option<JoinHandle<()>>,
    cancel: CancellationToken,
    event_tx: UnboundedSender<Event>,
    event_rx: UnboundedReceiver<Event>,
}

impl Tui {
    /// `frame_rate` and `tick_rate` are per second.
    pub fn new(frame_rate: f64, tick_rate: f64) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Ok(Self {
            terminal: Terminal::new(Backend::new(io::stdout()))?,
            rates: Rates {
                tick: Duration::from_secs_f64(1.0 / tick_rate),
                frame: Duration::from_secs_f64(1.0 / frame_rate),
            },
            input: None,
            cancel: CancellationToken::new(),
            event_tx,
            event_rx,
        })
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        crossterm::execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableBracketedPaste,
            cursor::Hide
        )?;
        self.spawn_input();
        Ok(())
    }

    /// Stop reading input and give the terminal back to the shell.
    pub fn exit(&mut self) -> Result<()> {
        self.stop_input();
        if terminal::is_raw_mode_enabled()? {
            self.terminal.flush()?;
            let mut stdout = io::stdout();
            crossterm::execute!(
                stdout,
                DisableBracketedPaste,
                LeaveAlternateScreen,
                cursor::Show
            )?;
            stdout.flush()?;
            terminal::disable_raw_mode()?;
        }
        Ok(())
    }

    pub fn suspend(&mut self) -> Result<()> {
        self.exit()?;
        #[cfg(not(windows))]
        signal_hook::low_level::raise(signal_hook::consts::SIGTSTP)?;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.enter()?;
        self.terminal.clear()?;
        Ok(())
    }

    pub async fn next_event(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }

    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        self.terminal.resize(Rect::new(0, 0, width, height))?;
        Ok(())
    }

    fn spawn_input(&mut self) {
        self.stop_input();
        self.cancel = CancellationToken::new();
        self.input = Some(tokio::spawn(read_input(
            self.event_tx.clone(),
            self.cancel.clone(),
            self.rates,
        )));
    }

    fn stop_input(&mut self) {
        self.cancel.cancel();
        let Some(task) = self.input.take() else {
            return;
        };
        let deadline = Instant::now() + SHUTDOWN_GRACE;
        while !task.is_finished() {
            if Instant::now() >= deadline {
                warn!("Input task did not stop in time, aborting it");
                task.abort();
                return;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            error!("Failed to restore terminal: {e}");
        }
    }
}

/// Merge terminal input with the tick and render clocks until cancelled
/// or the app stops listening.
async fn read_input(tx: UnboundedSender<Event>, cancel: CancellationToken, rates: Rates) {
    #[cfg(unix)]
    tokio::spawn(forward_sigterm(tx.clone(), cancel.clone()));

    let mut stream = EventStream::new();
    let mut tick = interval(rates.tick);
    let mut frame = interval(rates.frame);
    debug!("Reading terminal input");

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => break,
            _ = tick.tick() => Event::Tick,
            _ = frame.tick() => Event::Render,
            next = stream.next().fuse() => match next {
                Some(Ok(raw)) => match translate(raw) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(e)) => Event::Error(e.to_string()),
                None => break,
            },
        };
        if tx.send(event).is_err() {
            break;
        }
    }
    cancel.cancel();
}

#[cfg(unix)]
async fn forward_sigterm(tx: UnboundedSender<Event>, cancel: CancellationToken) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {e}");
            return;
        }
    };
    tokio::select! {
        () = cancel.cancelled() => {}
        _ = sigterm.recv() => {
            let _ = tx.send(Event::Quit);
        }
    }
}

/// Map a crossterm event to an app event. Key releases, mouse and focus
/// changes are dropped.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind != KeyEventKind::Press => None,
        CrosstermEvent::Key(key)
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(Event::Quit)
        }
        CrosstermEvent::Key(key) => Some(Event::Key(key)),
        CrosstermEvent::Paste(text) => Some(Event::Paste(text)),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        CrosstermEvent::Mouse(_) | CrosstermEvent::FocusGained | CrosstermEvent::FocusLost => None,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventState, MouseEvent, MouseEventKind};

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn ctrl_c_quits() {
        let event = CrosstermEvent::Key(key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(translate(event), Some(Event::Quit));

        let plain = key(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(
            translate(CrosstermEvent::Key(plain)),
            Some(Event::Key(plain))
        );
    }

    #[test]
    fn key_releases_are_dropped() {
        let release = KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(translate(CrosstermEvent::Key(release)), None);
    }

    #[test]
    fn mouse_and_focus_are_dropped() {
        let mouse = MouseEvent {
            kind: MouseEventKind::Moved,
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(translate(CrosstermEvent::Mouse(mouse)), None);
        assert_eq!(translate(CrosstermEvent::FocusLost), None);
    }

    #[test]
    fn paste_and_resize_pass_through() {
        assert_eq!(
            translate(CrosstermEvent::Paste("Hooks".into())),
            Some(Event::Paste("Hooks".into()))
        );
        assert_eq!(
            translate(CrosstermEvent::Resize(80, 24)),
            Some(Event::Resize(80, 24))
        );
    }
}
