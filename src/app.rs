use std::sync::Arc;
use ratatui::layout::Rect;
use ratatui::text::Line;
use tokio::sync::mpsc::UnboundedSender;

use minichat::{run_turn, ChatSession, FallbackGenerator, Policy, ReplyResolver, TurnEvent, Typewriter};

use crate::tui::AppEvent;

/// Rows the composer may grow to before it scrolls
pub const COMPOSER_MAX_ROWS: u16 = 6;

pub struct App {
    pub should_quit: bool,

    pub session: ChatSession,
    pub policy: Policy,
    pub model: String,

    // Composer
    pub composer: String,
    pub cursor: usize,

    // Message list viewport
    pub scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,
    pub chat_area: Option<Rect>,

    pub animation_frame: u8,

    resolver: Arc<dyn ReplyResolver>,
    fallback: FallbackGenerator,
    typewriter: Typewriter,
    turn_task: Option<tokio::task::JoinHandle<()>>,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        session: ChatSession,
        policy: Policy,
        model: String,
        resolver: Arc<dyn ReplyResolver>,
        typewriter: Typewriter,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        let fallback = FallbackGenerator::new(session.language());
        Self {
            should_quit: false,
            session,
            policy,
            model,
            composer: String::new(),
            cursor: 0,
            scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,
            animation_frame: 0,
            resolver,
            fallback,
            typewriter,
            turn_task: None,
            events,
        }
    }

    /// A reply is being fetched or typed
    pub fn is_busy(&self) -> bool {
        self.turn_task.is_some()
    }

    /// Send the composer contents. Ignored while a turn is in flight or the
    /// input is blank; a blank composer is left as is.
    pub fn submit(&mut self) {
        if self.is_busy() {
            return;
        }
        let Some(pending) = self.session.submit(&self.composer, &self.model) else {
            return;
        };
        self.composer.clear();
        self.cursor = 0;

        let fallback = self.fallback.generate(&pending.request.text);
        let resolver = Arc::clone(&self.resolver);
        let typewriter = self.typewriter;
        let events = self.events.clone();

        self.turn_task = Some(tokio::spawn(async move {
            run_turn(pending, resolver.as_ref(), fallback, typewriter, move |event| {
                let _ = events.send(AppEvent::Turn(event));
            })
            .await;
        }));
    }

    pub fn on_turn_event(&mut self, event: TurnEvent) {
        let finished = matches!(event, TurnEvent::Finished { .. });
        self.session.apply(event);
        if finished {
            self.turn_task = None;
        }
    }

    pub fn tick_animation(&mut self) {
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Total rendered rows of the message list at the current width
    pub fn transcript_rows(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total: usize = 0;
        for bubble in self.session.transcript().bubbles() {
            total += 1; // label line
            for line in bubble.text.lines() {
                total += wrapped_rows(line, wrap_width);
            }
            if bubble.text.is_empty() {
                total += 1;
            }
            total += 1; // blank line after message
        }
        total.min(u16::MAX as usize) as u16
    }

    pub fn max_scroll(&self) -> u16 {
        let visible = if self.chat_height > 0 { self.chat_height } else { 20 };
        self.transcript_rows().saturating_sub(visible)
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.scroll = self.scroll.saturating_sub(rows);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.scroll = self.scroll.saturating_add(rows).min(self.max_scroll());
    }

    pub fn half_page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }

    /// Composer rows to show, grown with content up to the cap
    pub fn composer_rows(&self) -> u16 {
        let lines = self.composer.split('\n').count() as u16;
        lines.clamp(1, COMPOSER_MAX_ROWS)
    }

    /// (line, column) of the cursor in characters
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before: String = self.composer.chars().take(self.cursor).collect();
        let line = before.matches('\n').count();
        let col = before.rsplit('\n').next().map(|s| s.chars().count()).unwrap_or(0);
        (line, col)
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.composer, self.cursor);
        self.composer.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn delete_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.composer, self.cursor);
            self.composer.remove(byte_pos);
        }
    }

    pub fn delete_at_cursor(&mut self) {
        if self.cursor < self.composer.chars().count() {
            let byte_pos = char_to_byte_index(&self.composer, self.cursor);
            self.composer.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.composer.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.composer.chars().count();
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Rows `line` occupies when word-wrapped at `width` columns, breaking
/// words that are wider than a whole row
fn wrapped_rows(line: &str, width: usize) -> usize {
    let width = width.max(1);
    let mut rows = 1;
    let mut current = 0;

    for word in line.split_whitespace() {
        let word_width = Line::from(word).width();
        if current > 0 {
            if current + 1 + word_width <= width {
                current += 1 + word_width;
                continue;
            }
            rows += 1;
        }
        let extra = word_width.saturating_sub(1) / width;
        rows += extra;
        current = word_width - extra * width;
    }
    rows
}
