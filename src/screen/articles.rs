use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Wrap};

use crate::Theme;
use crate::api::{Article, ArticleId};
use crate::config::{ArticlesAction, KeyResolver, NavAction, SearchAction};
use crate::controller::{AppState, ControllerMsg};
use crate::screen::{ArticleForm, ArticleFormEvent, Screen};
use crate::ui::{
    ColumnDef, Component, ConfirmDialog, ConfirmEvent, EventResult, Keybinding, Result, Table,
    TableEvent, TableRow,
};

impl TableRow for Article {
    type Id = ArticleId;

    fn id(&self) -> ArticleId {
        self.id
    }

    fn columns() -> &'static [ColumnDef] {
        const COLUMNS: &[ColumnDef] = &[
            ColumnDef::new("ID", Constraint::Length(6)),
            ColumnDef::new("Title", Constraint::Fill(1)),
            ColumnDef::new("Topic", Constraint::Length(12)),
        ];
        COLUMNS
    }

    fn render_cells(&self, theme: &Theme) -> Vec<Cell<'static>> {
        vec![
            Cell::from(self.id.to_string()).style(Style::default().fg(theme.muted())),
            Cell::from(self.title.clone()),
            Cell::from(self.topic.clone()).style(Style::default().fg(theme.secondary())),
        ]
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.topic, &self.text]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    List,
    Form,
}

struct PendingDelete {
    id: ArticleId,
    dialog: ConfirmDialog,
}

/// Article list with a preview of the highlighted entry and the
/// create/edit form.
pub struct ArticlesScreen {
    table: Table<Article>,
    form: ArticleForm,
    focus: Focus,
    confirm: Option<PendingDelete>,
    seen_revision: Option<u64>,
    seen_saved: u64,
    resolver: Arc<KeyResolver>,
}

impl ArticlesScreen {
    pub fn new(topics: Vec<String>, resolver: Arc<KeyResolver>) -> Self {
        let mut screen = Self {
            table: Table::new("Articles", resolver.clone())
                .with_empty_text("No articles yet. Press n to write one."),
            form: ArticleForm::new(topics, resolver.clone()),
            focus: Focus::List,
            confirm: None,
            seen_revision: None,
            seen_saved: 0,
            resolver,
        };
        screen.apply_focus();
        screen
    }

    fn apply_focus(&mut self) {
        self.table.set_focused(self.focus == Focus::List);
        self.form.set_focused(self.focus == Focus::Form);
    }

    fn focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.apply_focus();
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Result<EventResult<ControllerMsg>> {
        // Search input takes every key until it is closed.
        if self.table.is_searching() {
            return Ok(match self.table.handle_key(key)? {
                EventResult::Ignored => EventResult::Ignored,
                _ => EventResult::Consumed,
            });
        }

        if self.resolver.matches_articles(&key, ArticlesAction::SwitchFocus) {
            self.focus(Focus::Form);
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_articles(&key, ArticlesAction::New) {
            self.form.reset();
            self.focus(Focus::Form);
            return Ok(ControllerMsg::SelectArticle(None).into());
        }
        if self.resolver.matches_articles(&key, ArticlesAction::Reload) {
            return Ok(ControllerMsg::FetchArticles.into());
        }
        if self.resolver.matches_articles(&key, ArticlesAction::Edit) {
            return Ok(self.edit_highlighted());
        }
        if self.resolver.matches_articles(&key, ArticlesAction::Delete) {
            if let Some(article) = self.table.selected_item() {
                let dialog = ConfirmDialog::new(
                    format!("Delete \"{}\"?", article.title),
                    self.resolver.clone(),
                )
                .with_title("Delete article")
                .with_confirm_text("Delete")
                .danger();
                self.confirm = Some(PendingDelete {
                    id: article.id,
                    dialog,
                });
            }
            return Ok(EventResult::Consumed);
        }

        Ok(match self.table.handle_key(key)? {
            EventResult::Event(TableEvent::Activated(_)) => self.edit_highlighted(),
            EventResult::Consumed => EventResult::Consumed,
            EventResult::Ignored => EventResult::Ignored,
        })
    }

    fn edit_highlighted(&mut self) -> EventResult<ControllerMsg> {
        let Some(id) = self.table.selected_item().map(|a| a.id) else {
            return EventResult::Consumed;
        };
        self.focus(Focus::Form);
        ControllerMsg::SelectArticle(Some(id)).into()
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<EventResult<ControllerMsg>> {
        Ok(match self.form.handle_key(key)? {
            // The draft stays in the form until the outcome arrives.
            EventResult::Event(ArticleFormEvent::Submit { id, draft }) => {
                self.focus(Focus::List);
                let msg = match id {
                    Some(id) => ControllerMsg::UpdateArticle { id, draft },
                    None => ControllerMsg::CreateArticle(draft),
                };
                msg.into()
            }
            EventResult::Event(ArticleFormEvent::Cancel) => {
                let was_editing = self.form.editing().is_some();
                self.form.reset();
                self.focus(Focus::List);
                if was_editing {
                    ControllerMsg::SelectArticle(None).into()
                } else {
                    EventResult::Consumed
                }
            }
            EventResult::Consumed => EventResult::Consumed,
            EventResult::Ignored => EventResult::Ignored,
        })
    }

    fn render_preview(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .title(" Preview ")
            .title_style(Style::default().fg(theme.subtext0()))
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border()));

        let lines = self.table.selected_item().map_or_else(
            || {
                vec![Line::from(Span::styled(
                    "No article highlighted",
                    Style::default().fg(theme.muted()),
                ))]
            },
            |article| {
                vec![
                    Line::from(Span::styled(
                        article.title.clone(),
                        Style::default()
                            .fg(theme.text())
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(Span::styled(
                        article.text.clone(),
                        Style::default().fg(theme.text()),
                    )),
                    Line::from(""),
                    Line::from(vec![
                        Span::styled("Topic: ", Style::default().fg(theme.muted())),
                        Span::styled(
                            article.topic.clone(),
                            Style::default().fg(theme.secondary()),
                        ),
                    ]),
                ]
            },
        );

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }
}

impl Screen for ArticlesScreen {
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<ControllerMsg>> {
        if let Some(pending) = &mut self.confirm {
            return Ok(match pending.dialog.handle_key(key)? {
                EventResult::Event(ConfirmEvent::Confirmed) => {
                    let id = pending.id;
                    self.confirm = None;
                    ControllerMsg::DeleteArticle(id).into()
                }
                EventResult::Event(ConfirmEvent::Cancelled) => {
                    self.confirm = None;
                    EventResult::Consumed
                }
                _ => EventResult::Consumed,
            });
        }

        match self.focus {
            Focus::List => self.handle_list_key(key),
            Focus::Form => self.handle_form_key(key),
        }
    }

    fn sync(&mut self, state: &AppState) {
        if self.seen_revision != Some(state.revision()) {
            self.seen_revision = Some(state.revision());
            self.table.set_items(state.articles().to_vec());
        }

        if self.seen_saved != state.saved() {
            self.seen_saved = state.saved();
            self.form.reset();
        }

        match state.selected_article() {
            Some(article) if self.form.editing() != Some(article.id) => {
                self.form.load(article);
                self.table.select_id(article.id);
            }
            None if self.form.editing().is_some() => self.form.reset(),
            _ => {}
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [list_area, side_area] =
            Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                .areas(area);
        let [form_area, preview_area] =
            Layout::vertical([Constraint::Length(13), Constraint::Min(3)]).areas(side_area);

        self.table.render(frame, list_area, theme);
        self.form.render(frame, form_area, theme);
        self.render_preview(frame, preview_area, theme);

        if let Some(pending) = &mut self.confirm {
            pending.dialog.render(frame, area, theme);
        }
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        if self.focus == Focus::Form {
            return self.form.keybindings();
        }

        let r = &self.resolver;
        vec![
            Keybinding::hint(r.display_articles(ArticlesAction::New), "New article"),
            Keybinding::hint(r.display_articles(ArticlesAction::Edit), "Edit"),
            Keybinding::hint(r.display_articles(ArticlesAction::Delete), "Delete"),
            Keybinding::hint(r.display_articles(ArticlesAction::Reload), "Reload"),
            Keybinding::hint(r.display_search(SearchAction::Toggle), "Search"),
            Keybinding::new(r.display_articles(ArticlesAction::SwitchFocus), "Focus form"),
            Keybinding::new(r.display_nav(NavAction::Select), "Edit highlighted"),
            Keybinding::new(
                format!(
                    "{}/{}",
                    r.display_nav(NavAction::Up),
                    r.display_nav(NavAction::Down)
                ),
                "Navigate",
            ),
        ]
    }
}
