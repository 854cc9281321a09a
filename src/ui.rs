pub mod components;
pub mod widgets;

mod error_dialog;
mod help;
mod status_bar;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

pub use color_eyre::Result;

use crate::Theme;

pub use components::{
    ColumnDef, ConfirmDialog, ConfirmEvent, Table, TableEvent, TableRow, TextInput,
};
pub use error_dialog::{ErrorDialog, ErrorDialogEvent};
pub use help::{HelpEvent, HelpOverlay, Keybinding, KeybindingSection};
pub use status_bar::StatusBar;

/// Result of handling an input event.
///
/// - `Ignored` - the handler didn't handle this input; the parent may
/// - `Consumed` - handled without producing anything
/// - `Event(E)` - handled and produced an event for the parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult<E> {
    Ignored,
    Consumed,
    Event(E),
}

impl<E> EventResult<E> {
    pub const fn is_consumed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

impl EventResult<()> {
    /// Collapse a unit event into plain consumption.
    pub fn into_consumed<E>(self) -> EventResult<E> {
        match self {
            Self::Ignored => EventResult::Ignored,
            Self::Consumed | Self::Event(()) => EventResult::Consumed,
        }
    }
}

impl<E> From<E> for EventResult<E> {
    fn from(event: E) -> Self {
        Self::Event(event)
    }
}

/// Interactive UI building block.
///
/// Components handle input and emit generic outputs. They know nothing
/// about articles or sessions; screens translate their outputs.
pub trait Component {
    type Output;

    /// Handle a key event.
    ///
    /// # Errors
    /// Returns an error if handling the key failed.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        _ = key;
        Ok(EventResult::Ignored)
    }

    /// Called on each tick for animations.
    fn handle_tick(&mut self) {}

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);
}
