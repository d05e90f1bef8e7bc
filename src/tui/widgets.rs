//! Small shared pieces: a text input buffer with cursor management and the
//! centered-rect helper used by every modal overlay.

use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Layout, Rect};

/// A single-line text input with cursor positioning.
#[derive(Debug, Default, Clone)]
pub struct InputBuffer {
    content: String,
    cursor: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a key to the buffer. Returns true if the key was consumed.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(c) => {
                self.insert_char(c);
                true
            }
            KeyCode::Backspace => {
                self.backspace();
                true
            }
            KeyCode::Delete => {
                self.delete();
                true
            }
            KeyCode::Left => {
                self.move_left();
                true
            }
            KeyCode::Right => {
                self.move_right();
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.content.len();
                true
            }
            _ => false,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.content[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.content.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.content.len() {
            let next = self.content[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.content.len());
            self.content.drain(self.cursor..next);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.content[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.content.len() {
            self.cursor = self.content[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.content.len());
        }
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    pub fn text(&self) -> &str {
        &self.content
    }

    /// Trimmed content, the form every query submission uses.
    pub fn trimmed(&self) -> &str {
        self.content.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Calculate a centered rect using percentages of the parent area.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1])[1]
}

/// Centered rect with a fixed size, clamped to the parent.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_cursor() {
        let mut buf = InputBuffer::new();
        buf.insert_char('h');
        buf.insert_char('i');
        assert_eq!(buf.text(), "hi");
    }

    #[test]
    fn backspace_removes_previous_char() {
        let mut buf = InputBuffer::new();
        buf.insert_char('a');
        buf.insert_char('b');
        buf.backspace();
        assert_eq!(buf.text(), "a");
    }

    #[test]
    fn handle_key_moves_and_edits() {
        let mut buf = InputBuffer::new();
        for c in "abc".chars() {
            assert!(buf.handle_key(KeyCode::Char(c)));
        }
        assert!(buf.handle_key(KeyCode::Home));
        assert!(buf.handle_key(KeyCode::Delete));
        assert_eq!(buf.text(), "bc");
        assert!(!buf.handle_key(KeyCode::Enter));
    }

    #[test]
    fn multibyte_edits_stay_on_char_boundaries() {
        let mut buf = InputBuffer::new();
        buf.insert_char('é');
        buf.insert_char('à');
        buf.move_left();
        buf.backspace();
        assert_eq!(buf.text(), "à");
    }

    #[test]
    fn trimmed_and_blank() {
        let mut buf = InputBuffer::new();
        buf.insert_char(' ');
        assert!(buf.is_blank());
        buf.insert_char('x');
        assert_eq!(buf.trimmed(), "x");
        assert!(!buf.is_blank());
    }

    #[test]
    fn centered_rect_stays_inside_parent() {
        let area = Rect::new(0, 0, 100, 40);
        let modal = centered_rect(60, 50, area);
        assert!(modal.x + modal.width <= area.width);
        assert!(modal.y + modal.height <= area.height);

        let fixed = centered_fixed(200, 10, area);
        assert!(fixed.width <= area.width);
    }
}
