use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Theme;
use crate::ui::{Component, EventResult, Result};

const MASK: char = '•';

/// Single-line form field.
///
/// Editing keys are consumed; everything else (Enter, Esc, Tab, arrows
/// up/down, control chords) is left for the form that owns the field.
pub struct TextInput {
    label: String,
    value: String,
    /// Cursor position in chars, not bytes.
    cursor: usize,
    placeholder: Option<String>,
    masked: bool,
    focused: bool,
}

impl TextInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: String::new(),
            cursor: 0,
            placeholder: None,
            masked: false,
            focused: false,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub const fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.char_count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(offset, _)| offset)
    }

    fn insert_char(&mut self, c: char) {
        let offset = self.byte_offset(self.cursor);
        self.value.insert(offset, c);
        self.cursor += 1;
    }

    fn delete_char_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let offset = self.byte_offset(self.cursor);
            self.value.remove(offset);
        }
    }

    fn delete_char_at_cursor(&mut self) {
        if self.cursor < self.char_count() {
            let offset = self.byte_offset(self.cursor);
            self.value.remove(offset);
        }
    }

    fn delete_word_before_cursor(&mut self) {
        let chars: Vec<char> = self.value.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1] == ' ' {
            pos -= 1;
        }
        while pos > 0 && chars[pos - 1] != ' ' {
            pos -= 1;
        }
        let start = self.byte_offset(pos);
        let end = self.byte_offset(self.cursor);
        self.value.drain(start..end);
        self.cursor = pos;
    }

    fn display_value(&self) -> String {
        if self.masked {
            MASK.to_string().repeat(self.char_count())
        } else {
            self.value.clone()
        }
    }
}

impl Component for TextInput {
    type Output = ();

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        match (key.code, key.modifiers) {
            (KeyCode::Backspace, KeyModifiers::ALT)
            | (KeyCode::Char('w'), KeyModifiers::CONTROL) => self.delete_word_before_cursor(),
            (KeyCode::Backspace, _) => self.delete_char_before_cursor(),
            (KeyCode::Delete, _) => self.delete_char_at_cursor(),
            (KeyCode::Left, _) => self.cursor = self.cursor.saturating_sub(1),
            (KeyCode::Right, _) => self.cursor = (self.cursor + 1).min(self.char_count()),
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => self.cursor = 0,
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.char_count();
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => self.clear(),
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => self.insert_char(c),
            _ => return Ok(EventResult::Ignored),
        }
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let border_color = if self.focused {
            theme.border_focused()
        } else {
            theme.border()
        };
        let input_style = Style::default().fg(theme.text());
        let cursor_style = Style::default()
            .fg(theme.base())
            .bg(theme.text())
            .add_modifier(Modifier::BOLD);

        let line = match &self.placeholder {
            Some(placeholder) if self.value.is_empty() => {
                let mut spans = Vec::new();
                if self.focused {
                    spans.push(Span::styled(" ", cursor_style));
                }
                spans.push(Span::styled(
                    placeholder.clone(),
                    Style::default().fg(theme.muted()),
                ));
                Line::from(spans)
            }
            _ if self.focused => {
                let display: Vec<char> = self.display_value().chars().collect();
                let before: String = display[..self.cursor].iter().collect();
                let at = display.get(self.cursor).copied().unwrap_or(' ');
                let after: String = display.iter().skip(self.cursor + 1).collect();
                Line::from(vec![
                    Span::styled(before, input_style),
                    Span::styled(at.to_string(), cursor_style),
                    Span::styled(after, input_style),
                ])
            }
            _ => Line::from(Span::styled(self.display_value(), input_style)),
        };

        let block = Block::default()
            .title(format!(" {} ", self.label))
            .title_style(Style::default().fg(if self.focused {
                theme.primary()
            } else {
                theme.subtext0()
            }))
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(border_color));

        frame.render_widget(Paragraph::new(line).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut TextInput, code: KeyCode, modifiers: KeyModifiers) -> bool {
        input
            .handle_key(KeyEvent::new(code, modifiers))
            .unwrap()
            .is_consumed()
    }

    fn type_text(input: &mut TextInput, text: &str) {
        for c in text.chars() {
            press(input, KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn typing_and_editing() {
        let mut input = TextInput::new("Title");
        type_text(&mut input, "helo");
        press(&mut input, KeyCode::Left, KeyModifiers::NONE);
        type_text(&mut input, "l");
        assert_eq!(input.value(), "hello");

        press(&mut input, KeyCode::Home, KeyModifiers::NONE);
        press(&mut input, KeyCode::Delete, KeyModifiers::NONE);
        assert_eq!(input.value(), "ello");

        press(&mut input, KeyCode::End, KeyModifiers::NONE);
        press(&mut input, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(input.value(), "ell");
    }

    #[test]
    fn multibyte_characters_edit_cleanly() {
        let mut input = TextInput::new("Title");
        type_text(&mut input, "café");
        press(&mut input, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(input.value(), "caf");

        input.set_value("naïve");
        press(&mut input, KeyCode::Left, KeyModifiers::NONE);
        press(&mut input, KeyCode::Left, KeyModifiers::NONE);
        press(&mut input, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(input.value(), "nave");
    }

    #[test]
    fn delete_word() {
        let mut input = TextInput::new("Text");
        input.set_value("react hooks ");
        press(&mut input, KeyCode::Char('w'), KeyModifiers::CONTROL);
        assert_eq!(input.value(), "react ");
    }

    #[test]
    fn form_keys_pass_through() {
        let mut input = TextInput::new("Username");
        assert!(!press(&mut input, KeyCode::Enter, KeyModifiers::NONE));
        assert!(!press(&mut input, KeyCode::Tab, KeyModifiers::NONE));
        assert!(!press(&mut input, KeyCode::Esc, KeyModifiers::NONE));
        assert!(!press(&mut input, KeyCode::Char('o'), KeyModifiers::CONTROL));
        assert!(input.value().is_empty());
    }

    #[test]
    fn masked_display_hides_value() {
        let mut input = TextInput::new("Password").masked();
        input.set_value("secret");
        assert_eq!(input.display_value(), "••••••");
        assert_eq!(input.value(), "secret");
    }
}
