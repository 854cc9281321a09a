use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table as TableWidget, TableState};

use crate::Theme;
use crate::config::{KeyResolver, NavAction, SearchAction};
use crate::search::Matcher;
use crate::ui::{Component, EventResult, Result};

const PAGE_STEP: usize = 10;

pub enum TableEvent<T> {
    /// The highlighted row was activated (Enter).
    Activated(T),
}

pub struct ColumnDef {
    pub header: &'static str,
    pub constraint: Constraint,
}

impl ColumnDef {
    pub const fn new(header: &'static str, constraint: Constraint) -> Self {
        Self { header, constraint }
    }
}

pub trait TableRow {
    type Id: PartialEq + Copy;

    fn id(&self) -> Self::Id;
    fn columns() -> &'static [ColumnDef];
    fn render_cells(&self, theme: &Theme) -> Vec<Cell<'static>>;
    /// Texts the search filter matches against.
    fn search_fields(&self) -> Vec<&str>;
}

/// Selectable table with a fuzzy search filter.
pub struct Table<T: TableRow + Clone> {
    items: Vec<T>,
    filtered_indices: Vec<usize>,
    state: TableState,
    title: String,
    empty_text: String,
    focused: bool,
    searching: bool,
    query: String,
    matcher: Matcher,
    resolver: Arc<KeyResolver>,
}

impl<T: TableRow + Clone> Table<T> {
    pub fn new(title: impl Into<String>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            items: Vec::new(),
            filtered_indices: Vec::new(),
            state: TableState::default(),
            title: title.into(),
            empty_text: "Nothing to show".to_string(),
            focused: true,
            searching: false,
            query: String::new(),
            matcher: Matcher::new(),
            resolver,
        }
    }

    pub fn with_empty_text(mut self, text: impl Into<String>) -> Self {
        self.empty_text = text.into();
        self
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// True while the search prompt is taking character input.
    pub const fn is_searching(&self) -> bool {
        self.searching
    }

    /// Replace the rows, keeping the highlight on the same row if it survived.
    pub fn set_items(&mut self, items: Vec<T>) {
        let highlighted = self.selected_item().map(TableRow::id);
        let previous_index = self.state.selected();
        self.items = items;
        self.update_filter();

        let restored = highlighted.and_then(|id| self.position_of(id));
        match (restored, previous_index) {
            (Some(position), _) => self.state.select(Some(position)),
            (None, Some(index)) if !self.filtered_indices.is_empty() => {
                self.state
                    .select(Some(index.min(self.filtered_indices.len() - 1)));
            }
            _ => {}
        }
    }

    /// Highlight the row with `id` if it is visible.
    pub fn select_id(&mut self, id: T::Id) {
        if let Some(position) = self.position_of(id) {
            self.state.select(Some(position));
        }
    }

    pub fn selected_item(&self) -> Option<&T> {
        let selected = self.state.selected()?;
        let &idx = self.filtered_indices.get(selected)?;
        self.items.get(idx)
    }

    fn position_of(&self, id: T::Id) -> Option<usize> {
        self.filtered_indices
            .iter()
            .position(|&idx| self.items[idx].id() == id)
    }

    fn update_filter(&mut self) {
        let query = self.query.trim();
        self.filtered_indices = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                query.is_empty()
                    || self
                        .matcher
                        .best_score(item.search_fields(), query)
                        .is_some()
            })
            .map(|(i, _)| i)
            .collect();

        if self.filtered_indices.is_empty() {
            self.state.select(None);
        } else if self
            .state
            .selected()
            .is_none_or(|i| i >= self.filtered_indices.len())
        {
            self.state.select(Some(0));
        }
    }

    fn move_to(&mut self, index: usize) {
        if !self.filtered_indices.is_empty() {
            self.state
                .select(Some(index.min(self.filtered_indices.len() - 1)));
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> EventResult<TableEvent<T>> {
        if self.resolver.matches_search(&key, SearchAction::Exit) {
            self.searching = false;
            self.query.clear();
            self.update_filter();
            return EventResult::Consumed;
        }

        // Enter leaves the prompt but keeps the filter.
        if self.resolver.matches_nav(&key, NavAction::Select) {
            self.searching = false;
            return EventResult::Consumed;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Backspace, _) => {
                self.query.pop();
                self.update_filter();
                EventResult::Consumed
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.query.push(c);
                self.update_filter();
                EventResult::Consumed
            }
            // Arrow keys still move through the filtered rows.
            (KeyCode::Up | KeyCode::Down, _) => self.handle_navigation_key(key),
            _ => EventResult::Ignored,
        }
    }

    fn handle_navigation_key(&mut self, key: KeyEvent) -> EventResult<TableEvent<T>> {
        let selected = self.state.selected();
        let current = selected.unwrap_or(0);

        if self.resolver.matches_nav(&key, NavAction::Down) {
            self.move_to(selected.map_or(0, |i| i + 1));
        } else if self.resolver.matches_nav(&key, NavAction::Up) {
            self.move_to(current.saturating_sub(1));
        } else if self.resolver.matches_nav(&key, NavAction::Home) {
            self.move_to(0);
        } else if self.resolver.matches_nav(&key, NavAction::End) {
            self.move_to(usize::MAX);
        } else if self.resolver.matches_nav(&key, NavAction::PageDown) {
            self.move_to(current.saturating_add(PAGE_STEP));
        } else if self.resolver.matches_nav(&key, NavAction::PageUp) {
            self.move_to(current.saturating_sub(PAGE_STEP));
        } else if self.resolver.matches_nav(&key, NavAction::Select) {
            return self
                .selected_item()
                .map_or(EventResult::Ignored, |item| {
                    TableEvent::Activated(item.clone()).into()
                });
        } else if self.resolver.matches_search(&key, SearchAction::Toggle) {
            self.searching = true;
            return EventResult::Consumed;
        } else if self.resolver.matches_search(&key, SearchAction::Exit) && !self.query.is_empty()
        {
            self.query.clear();
            self.update_filter();
            return EventResult::Consumed;
        } else {
            return EventResult::Ignored;
        }

        EventResult::Consumed
    }
}

impl<T: TableRow + Clone> Component for Table<T> {
    type Output = TableEvent<T>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        Ok(if self.searching {
            self.handle_search_key(key)
        } else {
            self.handle_navigation_key(key)
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let border_color = if self.focused {
            theme.border_focused()
        } else {
            theme.border()
        };
        let title = format!(" {} ({}) ", self.title, self.items.len());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(border_color))
            .title(title)
            .title_style(
                Style::default()
                    .fg(theme.primary())
                    .add_modifier(Modifier::BOLD),
            );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let has_search_bar = self.searching || !self.query.is_empty();
        let [table_area, search_area] = if has_search_bar {
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner)
        } else {
            [inner, Rect::default()]
        };

        if self.items.is_empty() {
            let empty = Paragraph::new(self.empty_text.as_str())
                .style(Style::default().fg(theme.muted()));
            frame.render_widget(empty, table_area);
        } else {
            let columns = T::columns();
            let header = Row::new(columns.iter().map(|c| {
                Cell::from(c.header).style(
                    Style::default()
                        .fg(theme.header())
                        .add_modifier(Modifier::BOLD),
                )
            }))
            .style(Style::default().bg(theme.surface0()));

            let rows: Vec<Row> = self
                .filtered_indices
                .iter()
                .map(|&idx| {
                    Row::new(self.items[idx].render_cells(theme))
                        .style(Style::default().fg(theme.text()))
                })
                .collect();

            let table = TableWidget::new(rows, columns.iter().map(|c| c.constraint))
                .header(header)
                .row_highlight_style(
                    Style::default()
                        .bg(theme.selection_bg())
                        .fg(theme.lavender())
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("▶ ");

            frame.render_stateful_widget(table, table_area, &mut self.state);
        }

        if has_search_bar {
            let (text, style) = if self.searching {
                (
                    format!("/{}_", self.query),
                    Style::default().fg(theme.warning()),
                )
            } else {
                (
                    format!("/{} ({} matches)", self.query, self.filtered_indices.len()),
                    Style::default().fg(theme.subtext0()),
                )
            };
            frame.render_widget(Paragraph::new(text).style(style), search_area);
        }
    }
}
