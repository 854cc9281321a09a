//! Full-page views.
//!
//! Screens connect component events to the controller: they translate key
//! presses into [`ControllerMsg`] intents and resync their widgets from
//! [`AppState`] when it changes.

mod article_form;
mod articles;
mod login;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::Theme;
use crate::controller::{AppState, ControllerMsg};
use crate::ui::{EventResult, Keybinding, Result};

pub use article_form::{ArticleForm, ArticleFormEvent};
pub use articles::ArticlesScreen;
pub use login::LoginScreen;

pub trait Screen {
    /// Handle a key event, possibly emitting an intent for the controller.
    ///
    /// # Errors
    /// Returns an error if a component failed to handle the key.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<ControllerMsg>> {
        _ = key;
        Ok(EventResult::Ignored)
    }

    /// Bring widgets up to date with the controller state. Called before
    /// every render.
    fn sync(&mut self, state: &AppState) {
        _ = state;
    }

    fn on_tick(&mut self) {}

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Keys for the help overlay and status bar hints.
    fn keybindings(&self) -> Vec<Keybinding>;
}
