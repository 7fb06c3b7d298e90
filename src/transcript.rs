//! Renderable message list
//!
//! The transcript is what the screen shows: one bubble per message plus any
//! transient bubbles (the "thinking" placeholder while a reply is pending).
//! Front ends draw it and honour the scroll request; they never mutate it.

use crate::locale::Language;
use crate::state::{ChatMessage, ChatRole};

/// Handle to a bubble, valid until the next [`Transcript::render_all`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BubbleId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleKind {
    Normal,
    /// Waiting for a reply
    Thinking,
    /// Reply failed; the text is a local fallback
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub role: ChatRole,
    pub kind: BubbleKind,
    pub label: String,
    pub text: String,
}

pub struct Transcript {
    language: Language,
    bubbles: Vec<Bubble>,
    scroll_requested: bool,
}

impl Transcript {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            bubbles: Vec::new(),
            scroll_requested: false,
        }
    }

    /// Clear and recreate one bubble per message
    pub fn render_all(&mut self, history: &[ChatMessage]) {
        self.bubbles.clear();
        for message in history {
            let bubble = self.make_bubble(message.role, &message.content);
            self.bubbles.push(bubble);
        }
        self.scroll_to_bottom();
    }

    pub fn append(&mut self, role: ChatRole, text: &str) -> BubbleId {
        let bubble = self.make_bubble(role, text);
        self.bubbles.push(bubble);
        self.scroll_to_bottom();
        BubbleId(self.bubbles.len() - 1)
    }

    pub fn append_thinking(&mut self) -> BubbleId {
        let thinking = self.language.strings().thinking;
        let id = self.append(ChatRole::Assistant, thinking);
        self.bubbles[id.0].kind = BubbleKind::Thinking;
        id
    }

    /// Replace the text; a thinking placeholder becomes a normal bubble
    pub fn set_text(&mut self, id: BubbleId, text: &str) {
        if let Some(bubble) = self.bubbles.get_mut(id.0) {
            bubble.text = text.to_string();
            if bubble.kind == BubbleKind::Thinking {
                bubble.kind = BubbleKind::Normal;
            }
            self.scroll_requested = true;
        }
    }

    pub fn push_text(&mut self, id: BubbleId, text: &str) {
        if let Some(bubble) = self.bubbles.get_mut(id.0) {
            bubble.text.push_str(text);
            self.scroll_requested = true;
        }
    }

    /// Turn the bubble into an empty error-labeled one
    pub fn mark_error(&mut self, id: BubbleId, reason: &str) {
        let label = format!("{} ({})", self.language.strings().error_label, reason);
        if let Some(bubble) = self.bubbles.get_mut(id.0) {
            bubble.kind = BubbleKind::Error;
            bubble.label = label;
            bubble.text.clear();
            self.scroll_requested = true;
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_requested = true;
    }

    /// Returns and clears the pending scroll request
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn get(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.get(id.0)
    }

    fn make_bubble(&self, role: ChatRole, text: &str) -> Bubble {
        let strings = self.language.strings();
        let label = match role {
            ChatRole::User => strings.user_label,
            ChatRole::Assistant => strings.ai_label,
        };
        Bubble {
            role,
            kind: BubbleKind::Normal,
            label: label.to_string(),
            text: text.to_string(),
        }
    }
}
