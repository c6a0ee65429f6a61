use draftpad_core::{AssistSession, Document, InputLine, Position, Submission};
use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Editor,
    Title,
    Assist,
}

/// Number of screen rows a line of `len` chars takes when hard-wrapped at
/// `width`. A trailing row is always reserved for the cursor at end of line.
pub fn wrapped_rows(len: usize, width: usize) -> usize {
    if width == 0 {
        return 1;
    }
    len / width + 1
}

/// Screen position (x, y) of a document position, before scrolling.
pub fn visual_cursor(lines: &[String], cursor: Position, width: usize) -> (usize, usize) {
    let width = width.max(1);
    let rows_above: usize = lines
        .iter()
        .take(cursor.row)
        .map(|l| wrapped_rows(l.chars().count(), width))
        .sum();
    (cursor.col % width, rows_above + cursor.col / width)
}

pub struct App {
    pub should_quit: bool,
    pub focus: Focus,
    pub assist_open: bool,

    // Document
    pub document: Document,
    pub title_input: InputLine,
    pub editor_scroll: u16,
    pub editor_height: u16,
    pub editor_width: u16,

    // Assist panel
    pub session: AssistSession,
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    seen_revision: u64,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub editor_area: Option<Rect>,
    pub chat_area: Option<Rect>,
}

impl App {
    pub fn new(document: Document, session: AssistSession) -> Self {
        Self {
            should_quit: false,
            focus: Focus::Editor,
            assist_open: false,

            document,
            title_input: InputLine::new(),
            editor_scroll: 0,
            editor_height: 0,
            editor_width: 0,

            session,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            seen_revision: 0,

            animation_frame: 0,

            editor_area: None,
            chat_area: None,
        }
    }

    pub fn toggle_assist(&mut self) {
        self.assist_open = !self.assist_open;
        self.focus = if self.assist_open {
            Focus::Assist
        } else {
            Focus::Editor
        };
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Editor if self.assist_open => Focus::Assist,
            Focus::Editor => Focus::Editor,
            Focus::Assist | Focus::Title => Focus::Editor,
        };
    }

    // Title editing
    pub fn begin_title_edit(&mut self) {
        self.title_input.clear();
        self.title_input.insert_str(self.document.title());
        self.focus = Focus::Title;
    }

    pub fn commit_title(&mut self) {
        let title = self.title_input.take();
        self.document.set_title(&title);
        self.focus = Focus::Editor;
    }

    pub fn cancel_title(&mut self) {
        self.title_input.clear();
        self.focus = Focus::Editor;
    }

    /// Send the assist input with a snapshot of the document as it is right now.
    pub fn submit_assist(&mut self) -> Submission {
        let snapshot = self.document.snapshot();
        let submission = self.session.submit_pending(&snapshot);
        if submission.is_accepted() {
            self.animation_frame = 0;
        }
        self.sync_chat_scroll();
        submission
    }

    /// Pick up a finished assist request, if any, and keep the newest message in view.
    pub fn poll_assist(&mut self) {
        self.session.try_settle();
        self.sync_chat_scroll();
    }

    fn sync_chat_scroll(&mut self) {
        let revision = self.session.transcript().revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.scroll_chat_to_bottom();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick(&mut self) {
        if self.session.is_in_flight() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Estimated number of rendered lines in the chat pane, saturating at `u16::MAX`.
    fn chat_line_count(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: usize = 0;
        for msg in self.session.transcript() {
            total_lines += 1; // Role line ("You:" or "AI:")
            for line in msg.content.lines() {
                total_lines += line.chars().count().div_ceil(wrap_width).max(1);
            }
            total_lines += 1; // Blank line after message
        }

        if self.session.is_in_flight() {
            total_lines += 2; // "AI:" + "Checking your text..."
        }

        u16::try_from(total_lines).unwrap_or(u16::MAX)
    }

    fn max_chat_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.chat_line_count().saturating_sub(visible_height)
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.max_chat_scroll();
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_chat_scroll());
    }

    /// Adjust the editor scroll so the cursor row is on screen.
    pub fn ensure_cursor_visible(&mut self) {
        if self.editor_height == 0 {
            return;
        }
        let (_, y) = visual_cursor(
            self.document.lines(),
            self.document.cursor(),
            self.editor_width as usize,
        );
        let y = u16::try_from(y).unwrap_or(u16::MAX);
        if y < self.editor_scroll {
            self.editor_scroll = y;
        } else if y >= self.editor_scroll.saturating_add(self.editor_height) {
            self.editor_scroll = y.saturating_add(1) - self.editor_height;
        }
    }

    pub fn page_up(&mut self) {
        for _ in 0..self.editor_height.max(1) {
            self.document.move_up();
        }
    }

    pub fn page_down(&mut self) {
        for _ in 0..self.editor_height.max(1) {
            self.document.move_down();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use draftpad_core::{AssistError, ChatMessage, TextGenerator};
    use std::sync::Arc;

    /// Replies with the instruction line of the prompt.
    struct EchoGenerator;

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-1"
        }

        async fn generate(&self, prompt: &str) -> Result<String, AssistError> {
            Ok(prompt
                .lines()
                .find(|l| l.starts_with("User request: "))
                .unwrap_or_default()
                .to_string())
        }
    }

    /// Replies with one very long line of text.
    struct VerboseGenerator;

    #[async_trait]
    impl TextGenerator for VerboseGenerator {
        fn name(&self) -> &str {
            "verbose"
        }

        fn model(&self) -> &str {
            "verbose-1"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, AssistError> {
            Ok("word ".repeat(7000))
        }
    }

    fn app() -> App {
        App::new(
            Document::from_text("Their going home."),
            AssistSession::new(Arc::new(EchoGenerator)),
        )
    }

    #[test]
    fn test_wrapped_rows() {
        assert_eq!(wrapped_rows(0, 10), 1);
        assert_eq!(wrapped_rows(9, 10), 1);
        assert_eq!(wrapped_rows(10, 10), 2);
        assert_eq!(wrapped_rows(25, 10), 3);
        assert_eq!(wrapped_rows(5, 0), 1);
    }

    #[test]
    fn test_visual_cursor_accounts_for_wrapped_lines() {
        let lines = vec!["a".repeat(25), "short".to_string()];
        assert_eq!(visual_cursor(&lines, Position::new(0, 12), 10), (2, 1));
        assert_eq!(visual_cursor(&lines, Position::new(1, 3), 10), (3, 3));
    }

    #[test]
    fn test_toggle_assist_moves_focus() {
        let mut app = app();
        app.toggle_assist();
        assert!(app.assist_open);
        assert_eq!(app.focus, Focus::Assist);

        app.cycle_focus();
        assert_eq!(app.focus, Focus::Editor);
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Assist);

        app.toggle_assist();
        assert!(!app.assist_open);
        assert_eq!(app.focus, Focus::Editor);
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Editor);
    }

    #[test]
    fn test_title_edit_commit_and_cancel() {
        let mut app = app();
        app.begin_title_edit();
        assert_eq!(app.title_input.text(), "Untitled document");

        app.title_input.clear();
        app.title_input.insert_str("Essay draft");
        app.commit_title();
        assert_eq!(app.document.title(), "Essay draft");
        assert_eq!(app.focus, Focus::Editor);

        app.begin_title_edit();
        app.title_input.insert_str(" v2");
        app.cancel_title();
        assert_eq!(app.document.title(), "Essay draft");
    }

    #[tokio::test]
    async fn test_submit_uses_current_document_and_settles() {
        let mut app = app();
        app.toggle_assist();
        app.session.input_mut().insert_str("Fix grammar");

        assert!(app.submit_assist().is_accepted());
        assert!(app.session.is_in_flight());
        assert!(app.session.input().is_empty());

        // Edits made while waiting never touch the request already sent
        app.document.insert_str("More text.");

        app.session.settle().await;
        app.poll_assist();
        assert_eq!(
            app.session.transcript().messages(),
            &[
                ChatMessage::user("Fix grammar"),
                ChatMessage::assistant("User request: Fix grammar"),
            ]
        );
    }

    #[tokio::test]
    async fn test_blank_submit_changes_nothing() {
        let mut app = app();
        app.session.input_mut().insert_str("   ");
        assert!(!app.submit_assist().is_accepted());
        assert!(app.session.transcript().is_empty());
        assert!(!app.session.is_in_flight());
    }

    #[tokio::test]
    async fn test_new_messages_scroll_chat_to_bottom() {
        let mut app = app();
        app.chat_height = 3;
        app.chat_width = 40;

        for i in 0..3 {
            app.session.input_mut().insert_str(&format!("question {}", i));
            app.submit_assist();
            app.session.settle().await;
            app.poll_assist();
        }

        // 3 exchanges of (role + 1 line + blank) x 2 = 18 lines
        assert_eq!(app.chat_scroll, 18 - 3);

        app.scroll_chat_up(5);
        assert_eq!(app.chat_scroll, 10);
        app.scroll_chat_down(50);
        assert_eq!(app.chat_scroll, 15);
    }

    #[test]
    fn test_editor_scroll_follows_cursor() {
        let text = (0..30).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        let mut app = App::new(
            Document::from_text(&text),
            AssistSession::new(Arc::new(EchoGenerator)),
        );
        app.editor_height = 10;
        app.editor_width = 40;

        for _ in 0..15 {
            app.document.move_down();
        }
        app.ensure_cursor_visible();
        assert_eq!(app.editor_scroll, 6);

        for _ in 0..15 {
            app.document.move_up();
        }
        app.ensure_cursor_visible();
        assert_eq!(app.editor_scroll, 0);
    }

    #[tokio::test]
    async fn test_chat_scroll_saturates_on_very_long_transcripts() {
        let mut app = App::new(Document::new(), AssistSession::new(Arc::new(VerboseGenerator)));
        app.chat_height = 3;
        app.chat_width = 20;

        // 40 replies of 1750 wrapped rows each go past u16::MAX
        for i in 0..40 {
            app.session.input_mut().insert_str(&format!("check {}", i));
            assert!(app.submit_assist().is_accepted());
            app.session.settle().await;
            app.poll_assist();
        }

        assert_eq!(app.chat_scroll, u16::MAX - 3);
        app.scroll_chat_down(u16::MAX);
        assert_eq!(app.chat_scroll, u16::MAX - 3);
        app.scroll_chat_up(u16::MAX);
        assert_eq!(app.chat_scroll, 0);
    }

    #[test]
    fn test_editor_scroll_clamps_past_u16_rows() {
        let text = vec!["x"; 70_000].join("\n");
        let mut app = App::new(
            Document::from_text(&text),
            AssistSession::new(Arc::new(EchoGenerator)),
        );
        app.editor_height = 10;
        app.editor_width = 40;

        for _ in 0..69_999 {
            app.document.move_down();
        }
        app.ensure_cursor_visible();
        assert_eq!(app.editor_scroll, u16::MAX - 10);
    }
}
