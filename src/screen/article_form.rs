use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Theme;
use crate::api::{Article, ArticleDraft, ArticleId};
use crate::config::{FormAction, KeyResolver};
use crate::ui::{Component, EventResult, Keybinding, Result, TextInput};

#[derive(Debug, PartialEq, Eq)]
pub enum ArticleFormEvent {
    /// Create when `id` is `None`, update otherwise.
    Submit {
        id: Option<ArticleId>,
        draft: ArticleDraft,
    },
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Text,
    Topic,
}

impl Field {
    const ORDER: [Self; 3] = [Self::Title, Self::Text, Self::Topic];

    fn step(self, forward: bool) -> Self {
        let index = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let len = Self::ORDER.len();
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        Self::ORDER[next]
    }
}

/// Create/edit form for a single article.
///
/// In edit mode the form carries the id of the article being edited; the
/// topic is picked from a fixed list rather than typed.
pub struct ArticleForm {
    title: TextInput,
    text: TextInput,
    topics: Vec<String>,
    topic: Option<usize>,
    field: Field,
    editing: Option<ArticleId>,
    focused: bool,
    resolver: Arc<KeyResolver>,
}

impl ArticleForm {
    pub fn new(topics: Vec<String>, resolver: Arc<KeyResolver>) -> Self {
        let mut form = Self {
            title: TextInput::new("Title").with_placeholder("Enter title"),
            text: TextInput::new("Text").with_placeholder("Enter text"),
            topics,
            topic: None,
            field: Field::Title,
            editing: None,
            focused: false,
            resolver,
        };
        form.apply_focus();
        form
    }

    pub const fn editing(&self) -> Option<ArticleId> {
        self.editing
    }

    /// Fill the form from `article` and switch to edit mode.
    pub fn load(&mut self, article: &Article) {
        self.title.set_value(&article.title);
        self.text.set_value(&article.text);
        self.topic = self.topic_index(&article.topic);
        self.editing = Some(article.id);
        self.field = Field::Title;
        self.apply_focus();
    }

    /// Empty the form and switch to create mode.
    pub fn reset(&mut self) {
        self.title.clear();
        self.text.clear();
        self.topic = None;
        self.editing = None;
        self.field = Field::Title;
        self.apply_focus();
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        self.apply_focus();
    }

    pub fn draft(&self) -> ArticleDraft {
        ArticleDraft {
            title: self.title.value().trim().to_string(),
            text: self.text.value().trim().to_string(),
            topic: self
                .topic
                .and_then(|i| self.topics.get(i))
                .cloned()
                .unwrap_or_default(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.draft().is_complete()
    }

    pub fn keybindings(&self) -> Vec<Keybinding> {
        let fields = format!(
            "{}/{}",
            self.resolver.display_form(FormAction::NextField),
            self.resolver.display_form(FormAction::PrevField)
        );
        let topics = format!(
            "{}/{}",
            self.resolver.display_form(FormAction::PrevOption),
            self.resolver.display_form(FormAction::NextOption)
        );
        vec![
            Keybinding::hint(self.resolver.display_form(FormAction::Submit), "Submit"),
            Keybinding::hint(self.resolver.display_form(FormAction::Cancel), "Cancel"),
            Keybinding::new(fields, "Next/previous field"),
            Keybinding::new(topics, "Choose topic"),
        ]
    }

    /// Index of `topic`, appending it when the server returned a topic the
    /// configured list does not know.
    fn topic_index(&mut self, topic: &str) -> Option<usize> {
        if topic.is_empty() {
            return None;
        }
        let index = self
            .topics
            .iter()
            .position(|t| t == topic)
            .unwrap_or_else(|| {
                self.topics.push(topic.to_string());
                self.topics.len() - 1
            });
        Some(index)
    }

    fn cycle_topic(&mut self, forward: bool) {
        let len = self.topics.len();
        if len == 0 {
            return;
        }
        self.topic = Some(match (self.topic, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        });
    }

    fn apply_focus(&mut self) {
        self.title
            .set_focused(self.focused && self.field == Field::Title);
        self.text.set_focused(self.focused && self.field == Field::Text);
    }

    fn move_field(&mut self, forward: bool) {
        self.field = self.field.step(forward);
        self.apply_focus();
    }

    fn render_topics(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let active = self.focused && self.field == Field::Topic;
        let mut spans = Vec::new();
        if self.topic.is_none() {
            spans.push(Span::styled(
                "-- Select topic -- ",
                Style::default().fg(theme.muted()),
            ));
        }
        for (i, topic) in self.topics.iter().enumerate() {
            let style = if self.topic == Some(i) {
                Style::default()
                    .fg(theme.base())
                    .bg(if active {
                        theme.primary()
                    } else {
                        theme.secondary()
                    })
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.subtext0())
            };
            spans.push(Span::styled(format!(" {topic} "), style));
            spans.push(Span::raw(" "));
        }

        let border = if active {
            theme.border_focused()
        } else {
            theme.border()
        };
        let block = Block::default()
            .title(" Topic ")
            .title_style(Style::default().fg(if active {
                theme.primary()
            } else {
                theme.subtext0()
            }))
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(border));
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }
}

impl Component for ArticleForm {
    type Output = ArticleFormEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.resolver.matches_form(&key, FormAction::Submit) {
            if !self.is_valid() {
                return Ok(EventResult::Consumed);
            }
            return Ok(ArticleFormEvent::Submit {
                id: self.editing,
                draft: self.draft(),
            }
            .into());
        }
        if self.resolver.matches_form(&key, FormAction::Cancel) {
            return Ok(ArticleFormEvent::Cancel.into());
        }
        if self.resolver.matches_form(&key, FormAction::NextField) {
            self.move_field(true);
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_form(&key, FormAction::PrevField) {
            self.move_field(false);
            return Ok(EventResult::Consumed);
        }

        Ok(match self.field {
            Field::Title => self.title.handle_key(key)?.into_consumed(),
            Field::Text => self.text.handle_key(key)?.into_consumed(),
            Field::Topic => {
                if self.resolver.matches_form(&key, FormAction::NextOption) {
                    self.cycle_topic(true);
                    EventResult::Consumed
                } else if self.resolver.matches_form(&key, FormAction::PrevOption) {
                    self.cycle_topic(false);
                    EventResult::Consumed
                } else {
                    EventResult::Ignored
                }
            }
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let (title, color) = match self.editing {
            Some(id) => (format!(" Edit article #{id} "), theme.warning()),
            None => (" Create article ".to_string(), theme.primary()),
        };
        let block = Block::default()
            .title(title)
            .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(if self.focused {
                theme.border_focused()
            } else {
                theme.border()
            }));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [title_area, text_area, topic_area, submit_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(inner);

        self.title.render(frame, title_area, theme);
        self.text.render(frame, text_area, theme);
        self.render_topics(frame, topic_area, theme);

        let submit = if self.is_valid() {
            Span::styled(
                format!(
                    "[{}] Submit",
                    self.resolver.display_form(FormAction::Submit)
                ),
                Style::default()
                    .fg(theme.success())
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(
                "Fill in title, text and topic to submit",
                Style::default().fg(theme.muted()),
            )
        };
        let mut line = vec![submit];
        if self.editing.is_some() {
            line.push(Span::styled(
                format!(
                    "   [{}] Cancel edit",
                    self.resolver.display_form(FormAction::Cancel)
                ),
                Style::default().fg(theme.subtext0()),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(line)), submit_area);
    }
}
