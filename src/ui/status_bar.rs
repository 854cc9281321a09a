use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::Theme;
use crate::config::{GlobalAction, KeyResolver};
use crate::controller::AppState;
use crate::ui::widgets::Spinner;
use crate::ui::{Component, Keybinding};

const LOADING_LABEL: &str = "Please wait...";

/// Bottom panel: session info, the latest status message (or the spinner
/// while loading) and key hints.
pub struct StatusBar {
    base_url: String,
    spinner: Spinner,
    resolver: Arc<KeyResolver>,
}

impl StatusBar {
    pub fn new(base_url: impl Into<String>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            base_url: base_url.into(),
            spinner: Spinner::new(LOADING_LABEL),
            resolver,
        }
    }

    pub fn handle_tick(&mut self) {
        self.spinner.handle_tick();
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        state: &AppState,
        local_keybindings: &[Keybinding],
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [info_area, message_area, hints_area] = Layout::horizontal([
            Constraint::Length(36),
            Constraint::Min(20),
            Constraint::Length(34),
        ])
        .areas(inner);

        self.render_session_info(frame, info_area, theme, state);

        if state.is_loading() {
            self.spinner.render(frame, message_area, theme);
        } else {
            render_message(frame, message_area, theme, state.message());
        }

        self.render_hints(frame, hints_area, theme, local_keybindings);
    }

    fn render_session_info(&self, frame: &mut Frame, area: Rect, theme: &Theme, state: &AppState) {
        let w = area.width as usize;
        let label_style = Style::default().fg(theme.muted());
        let (session, session_style) = if state.is_authenticated() {
            ("signed in", Style::default().fg(theme.success()))
        } else {
            ("signed out", Style::default().fg(theme.warning()))
        };

        let lines = vec![
            Line::from(Span::styled(
                "lazyarticles",
                Style::default()
                    .fg(theme.primary())
                    .add_modifier(Modifier::BOLD),
            )),
            status_line("screen", state.route().title(), w, label_style, Style::default().fg(theme.text())),
            status_line("session", session, w, label_style, session_style),
            status_line("server", &self.base_url, w, label_style, Style::default().fg(theme.text())),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_hints(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        local_keybindings: &[Keybinding],
    ) {
        let global = self.global_keybindings();
        let hints: Vec<&Keybinding> = local_keybindings
            .iter()
            .chain(global.iter())
            .filter(|kb| kb.hint)
            .take(area.height as usize)
            .collect();

        let key_width = hints.iter().map(|kb| kb.key.len()).max().unwrap_or(1);
        let lines: Vec<Line> = hints
            .iter()
            .map(|kb| {
                Line::from(vec![
                    Span::styled(
                        format!("{:>key_width$}", kb.key),
                        Style::default().fg(theme.highlight()),
                    ),
                    Span::styled(" │ ", Style::default().fg(theme.border())),
                    Span::styled(kb.description.clone(), Style::default().fg(theme.subtext0())),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), area);
    }

    /// Keys available on every screen.
    pub fn global_keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::hint(self.resolver.display_global(GlobalAction::Help), "Help"),
            Keybinding::hint(self.resolver.display_global(GlobalAction::Quit), "Quit"),
            Keybinding::new(
                self.resolver.display_global(GlobalAction::LoginScreen),
                "Login screen",
            ),
            Keybinding::new(
                self.resolver.display_global(GlobalAction::ArticlesScreen),
                "Articles screen",
            ),
            Keybinding::new(self.resolver.display_global(GlobalAction::Logout), "Log out"),
        ]
    }
}

fn render_message(frame: &mut Frame, area: Rect, theme: &Theme, message: &str) {
    if message.is_empty() {
        return;
    }
    let paragraph = Paragraph::new(Line::from(Span::styled(
        message.to_string(),
        Style::default()
            .fg(theme.info())
            .add_modifier(Modifier::BOLD),
    )))
    .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// `  label  value` with a right-aligned label column.
fn status_line<'a>(
    label: &'a str,
    value: &str,
    max_width: usize,
    label_style: Style,
    value_style: Style,
) -> Line<'a> {
    const LABEL_W: usize = 8;
    let available = max_width.saturating_sub(LABEL_W + 1);
    Line::from(vec![
        Span::styled(format!("{label:>LABEL_W$}"), label_style),
        Span::raw(" "),
        Span::styled(truncate_str(value, available), value_style),
    ])
}

/// Truncate to `max_width` chars, ending in "..." when cut.
fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width > 3 {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_width).collect()
    }
}
