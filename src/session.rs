use tracing::debug;

use crate::history::{recent, HistoryStore, MAX_CONTEXT};
use crate::locale::Language;
use crate::resolver::ReplyRequest;
use crate::state::{ChatMessage, ChatRole};
use crate::transcript::{BubbleId, Transcript};
use crate::turn::TurnEvent;

/// A submitted turn waiting for its reply
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub request: ReplyRequest,
    pub placeholder: BubbleId,
}

/// Conversation state: in-memory history, its store, and the transcript
/// mirroring it. All mutation goes through this type on the UI task.
pub struct ChatSession {
    history: Vec<ChatMessage>,
    store: HistoryStore,
    transcript: Transcript,
    language: Language,
}

impl ChatSession {
    /// Load persisted history, greet on first run, render everything
    pub fn open(store: HistoryStore, language: Language) -> Self {
        let mut history = store.load();
        let mut session = Self {
            history: Vec::new(),
            store,
            transcript: Transcript::new(language),
            language,
        };

        if history.is_empty() {
            history.push(ChatMessage::assistant(language.strings().welcome));
            session.store.save(&history);
        }

        session.transcript.render_all(&history);
        session.history = history;
        session
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Record the user's turn and show a thinking placeholder. Returns `None`
    /// for blank input, in which case nothing changes.
    pub fn submit(&mut self, input: &str, model: &str) -> Option<PendingTurn> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }

        let context = recent(&self.history, MAX_CONTEXT).to_vec();

        self.history.push(ChatMessage::user(text));
        self.store.save(&self.history);
        self.transcript.append(ChatRole::User, text);

        let placeholder = self.transcript.append_thinking();
        debug!(context = context.len(), "submitted turn");

        Some(PendingTurn {
            request: ReplyRequest {
                text: text.to_string(),
                context,
                model: model.to_string(),
            },
            placeholder,
        })
    }

    pub fn apply(&mut self, event: TurnEvent) {
        match event {
            TurnEvent::Settled { bubble } => {
                self.transcript.set_text(bubble, "");
            }
            TurnEvent::Failed { bubble, reason } => {
                self.transcript.mark_error(bubble, &reason);
            }
            TurnEvent::Chunk { bubble, text } => {
                self.transcript.push_text(bubble, &text);
            }
            TurnEvent::Finished { reply, .. } => {
                self.history.push(ChatMessage::assistant(reply));
                self.store.save(&self.history);
                self.transcript.scroll_to_bottom();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::transcript::BubbleKind;

    fn open_with(history: &[ChatMessage]) -> ChatSession {
        let mut store = HistoryStore::new(MemoryStorage::new());
        store.save(history);
        ChatSession::open(store, Language::English)
    }

    #[test]
    fn test_first_open_greets() {
        let session = ChatSession::open(HistoryStore::new(MemoryStorage::new()), Language::Chinese);
        assert_eq!(session.history(), &[ChatMessage::assistant("准备就绪。")]);
        assert_eq!(session.transcript().bubbles().len(), 1);
    }

    #[test]
    fn test_open_renders_persisted_history() {
        let history = vec![ChatMessage::user("a"), ChatMessage::assistant("b")];
        let session = open_with(&history);
        assert_eq!(session.history(), history.as_slice());
        let texts: Vec<&str> = session.transcript().bubbles().iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_blank_submit_is_noop() {
        let mut session = open_with(&[ChatMessage::assistant("hi")]);
        assert!(session.submit("   \n\t ", "m").is_none());
        assert!(session.submit("", "m").is_none());
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.transcript().bubbles().len(), 1);
    }

    #[test]
    fn test_submit_trims_and_adds_placeholder() {
        let mut session = open_with(&[ChatMessage::assistant("hi")]);
        let pending = session.submit("  hello  ", "gpt-4o").unwrap();

        assert_eq!(pending.request.text, "hello");
        assert_eq!(pending.request.model, "gpt-4o");
        assert_eq!(pending.request.context, vec![ChatMessage::assistant("hi")]);
        assert_eq!(session.history().last(), Some(&ChatMessage::user("hello")));

        let placeholder = session.transcript().get(pending.placeholder).unwrap();
        assert_eq!(placeholder.kind, BubbleKind::Thinking);
    }

    #[test]
    fn test_context_is_capped() {
        let history: Vec<ChatMessage> = (0..30).map(|i| ChatMessage::user(format!("m{}", i))).collect();
        let mut session = open_with(&history);
        let pending = session.submit("new", "m").unwrap();

        assert_eq!(pending.request.context.len(), MAX_CONTEXT);
        assert_eq!(pending.request.context[0].content, "m18");
        assert!(pending.request.context.iter().all(|m| m.content != "new"));
    }
}
