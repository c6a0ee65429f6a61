//! The editable document surface and its plain-text snapshots.

use crate::input::char_to_byte_index;

pub const DEFAULT_TITLE: &str = "Untitled document";

/// Cursor position in the document, in lines and characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Read-only plain text of the document at one moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    text: String,
}

impl DocumentSnapshot {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Line-based text buffer with a title and a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    title: String,
    lines: Vec<String>,
    cursor: Position,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            lines: vec![String::new()],
            cursor: Position::default(),
        }
    }

    pub fn from_text(text: &str) -> Self {
        let lines: Vec<String> = if text.is_empty() {
            vec![String::new()]
        } else {
            text.split('\n').map(|l| l.to_string()).collect()
        };
        Self {
            lines,
            ..Self::new()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Set the title; a blank title reverts to the default.
    pub fn set_title(&mut self, title: &str) {
        let title = title.trim();
        self.title = if title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            title.to_string()
        };
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|l| l.split_whitespace().count()).sum()
    }

    /// Plain text of the whole document, lines joined with `\n`.
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot::new(self.lines.join("\n"))
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map(|l| l.chars().count()).unwrap_or(0)
    }

    pub fn insert_char(&mut self, c: char) {
        if c == '\n' {
            self.insert_newline();
            return;
        }
        let Position { row, col } = self.cursor;
        let line = &mut self.lines[row];
        let byte_pos = char_to_byte_index(line, col);
        line.insert(byte_pos, c);
        self.cursor.col += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert_char(c);
        }
    }

    /// Split the current line at the cursor.
    pub fn insert_newline(&mut self) {
        let Position { row, col } = self.cursor;
        let line = &mut self.lines[row];
        let byte_pos = char_to_byte_index(line, col);
        let rest = line.split_off(byte_pos);
        self.lines.insert(row + 1, rest);
        self.cursor = Position::new(row + 1, 0);
    }

    /// Delete the character before the cursor, joining with the previous
    /// line at column zero.
    pub fn backspace(&mut self) {
        let Position { row, col } = self.cursor;
        if col > 0 {
            let line = &mut self.lines[row];
            let byte_pos = char_to_byte_index(line, col - 1);
            line.remove(byte_pos);
            self.cursor.col -= 1;
        } else if row > 0 {
            let current = self.lines.remove(row);
            let new_col = self.line_len(row - 1);
            self.lines[row - 1].push_str(&current);
            self.cursor = Position::new(row - 1, new_col);
        }
    }

    /// Delete the character under the cursor, joining the next line at end of line.
    pub fn delete(&mut self) {
        let Position { row, col } = self.cursor;
        if col < self.line_len(row) {
            let line = &mut self.lines[row];
            let byte_pos = char_to_byte_index(line, col);
            line.remove(byte_pos);
        } else if row + 1 < self.lines.len() {
            let next = self.lines.remove(row + 1);
            self.lines[row].push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.cursor.col = self.line_len(self.cursor.row);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor.col < self.line_len(self.cursor.row) {
            self.cursor.col += 1;
        } else if self.cursor.row + 1 < self.lines.len() {
            self.cursor = Position::new(self.cursor.row + 1, 0);
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.cursor.col = self.cursor.col.min(self.line_len(self.cursor.row));
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor.row + 1 < self.lines.len() {
            self.cursor.row += 1;
            self.cursor.col = self.cursor.col.min(self.line_len(self.cursor.row));
        }
    }

    pub fn move_home(&mut self) {
        self.cursor.col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor.col = self.line_len(self.cursor.row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document() {
        let doc = Document::new();
        assert_eq!(doc.title(), "Untitled document");
        assert!(doc.is_empty());
        assert_eq!(doc.snapshot().text(), "");
        assert_eq!(Document::default(), doc);
        assert!(doc.snapshot().is_empty());
    }

    #[test]
    fn test_from_text_keeps_blank_lines() {
        let doc = Document::from_text("one\n\nthree");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.snapshot().text(), "one\n\nthree");
        assert_eq!(doc.word_count(), 2);
    }

    #[test]
    fn test_set_title_blank_reverts_to_default() {
        let mut doc = Document::new();
        doc.set_title("  Cover letter ");
        assert_eq!(doc.title(), "Cover letter");
        doc.set_title("   ");
        assert_eq!(doc.title(), DEFAULT_TITLE);
    }

    #[test]
    fn test_typing_and_newline() {
        let mut doc = Document::new();
        doc.insert_str("Hello world");
        for _ in 0..5 {
            doc.move_left();
        }
        doc.insert_newline();
        assert_eq!(doc.lines(), &["Hello ".to_string(), "world".to_string()]);
        assert_eq!(doc.cursor(), Position::new(1, 0));

        doc.backspace();
        assert_eq!(doc.snapshot().text(), "Hello world");
        assert_eq!(doc.cursor(), Position::new(0, 6));
    }

    #[test]
    fn test_delete_joins_next_line() {
        let mut doc = Document::from_text("ab\ncd");
        doc.move_end();
        doc.delete();
        assert_eq!(doc.snapshot().text(), "abcd");
    }

    #[test]
    fn test_multibyte_edits() {
        let mut doc = Document::new();
        doc.insert_str("café au lait");
        doc.move_home();
        for _ in 0..4 {
            doc.move_right();
        }
        doc.backspace();
        assert_eq!(doc.snapshot().text(), "caf au lait");
    }

    #[test]
    fn test_vertical_movement_clamps_column() {
        let mut doc = Document::from_text("a long line\nshort");
        doc.move_end();
        doc.move_down();
        assert_eq!(doc.cursor(), Position::new(1, 5));
        doc.move_up();
        assert_eq!(doc.cursor(), Position::new(0, 5));
    }

    #[test]
    fn test_horizontal_movement_wraps_lines() {
        let mut doc = Document::from_text("ab\ncd");
        doc.move_end();
        doc.move_right();
        assert_eq!(doc.cursor(), Position::new(1, 0));
        doc.move_left();
        assert_eq!(doc.cursor(), Position::new(0, 2));
    }
}
