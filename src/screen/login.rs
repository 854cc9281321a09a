use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::Theme;
use crate::api::Credentials;
use crate::config::{FormAction, KeyResolver};
use crate::controller::{AppState, ControllerMsg};
use crate::screen::Screen;
use crate::ui::{Component, EventResult, Keybinding, Result, TextInput};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Username,
    Password,
}

pub struct LoginScreen {
    username: TextInput,
    password: TextInput,
    focus: Field,
    signed_in: bool,
    resolver: Arc<KeyResolver>,
}

impl LoginScreen {
    pub fn new(username: Option<&str>, resolver: Arc<KeyResolver>) -> Self {
        let mut screen = Self {
            username: TextInput::new("Username").with_placeholder("Enter username"),
            password: TextInput::new("Password")
                .with_placeholder("Enter password")
                .masked(),
            focus: Field::Username,
            signed_in: false,
            resolver,
        };
        if let Some(username) = username {
            screen.username.set_value(username);
            screen.focus = Field::Password;
        }
        screen.apply_focus();
        screen
    }

    /// Credentials to submit, or `None` while the fields are too short.
    fn credentials(&self) -> Option<Credentials> {
        let username = self.username.value().trim();
        let password = self.password.value().trim();
        let valid = username.chars().count() >= MIN_USERNAME_LEN
            && password.chars().count() >= MIN_PASSWORD_LEN;
        valid.then(|| Credentials::new(username, password))
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Field::Username => Field::Password,
            Field::Password => Field::Username,
        };
        self.apply_focus();
    }

    fn apply_focus(&mut self) {
        self.username.set_focused(self.focus == Field::Username);
        self.password.set_focused(self.focus == Field::Password);
    }

    fn focused_input(&mut self) -> &mut TextInput {
        match self.focus {
            Field::Username => &mut self.username,
            Field::Password => &mut self.password,
        }
    }
}

impl Screen for LoginScreen {
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<ControllerMsg>> {
        if self.resolver.matches_form(&key, FormAction::Submit) {
            let Some(credentials) = self.credentials() else {
                return Ok(EventResult::Consumed);
            };
            self.password.clear();
            return Ok(ControllerMsg::Login(credentials).into());
        }
        if self.resolver.matches_form(&key, FormAction::NextField)
            || self.resolver.matches_form(&key, FormAction::PrevField)
        {
            self.toggle_focus();
            return Ok(EventResult::Consumed);
        }

        Ok(self.focused_input().handle_key(key)?.into_consumed())
    }

    fn sync(&mut self, state: &AppState) {
        self.signed_in = state.is_authenticated();
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup = area.centered(Constraint::Max(60), Constraint::Length(12));
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Login ")
            .title_style(
                Style::default()
                    .fg(theme.primary())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border_focused()));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let [username_area, password_area, submit_area, note_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .areas(inner);

        self.username.render(frame, username_area, theme);
        self.password.render(frame, password_area, theme);

        let submit_key = self.resolver.display_form(FormAction::Submit);
        let submit = if self.credentials().is_some() {
            Line::from(vec![
                Span::styled(
                    format!("[{submit_key}]"),
                    Style::default()
                        .fg(theme.highlight())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    " Submit credentials",
                    Style::default()
                        .fg(theme.success())
                        .add_modifier(Modifier::BOLD),
                ),
            ])
        } else {
            Line::from(Span::styled(
                format!(
                    "Username needs {MIN_USERNAME_LEN}+ and password {MIN_PASSWORD_LEN}+ characters"
                ),
                Style::default().fg(theme.muted()),
            ))
        };
        frame.render_widget(Paragraph::new(submit).centered(), submit_area);

        if self.signed_in {
            let note = Line::from(Span::styled(
                "Already signed in; submitting replaces the session",
                Style::default().fg(theme.info()),
            ));
            frame.render_widget(Paragraph::new(note).centered(), note_area);
        }
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::hint(self.resolver.display_form(FormAction::Submit), "Log in"),
            Keybinding::hint(self.resolver.display_form(FormAction::NextField), "Next field"),
        ]
    }
}
