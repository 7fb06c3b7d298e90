use crate::state::ChatMessage;
use crate::storage::Storage;
use tracing::{debug, warn};

pub const HISTORY_KEY: &str = "chat.history";

/// Entries kept on every persist
pub const MAX_PERSISTED: usize = 40;

/// Entries sent as request context
pub const MAX_CONTEXT: usize = 12;

/// Persists conversation history under a single storage key.
///
/// Neither operation ever fails: unreadable or corrupt history loads as an
/// empty list and failed writes are dropped, both with a warning in the log.
pub struct HistoryStore {
    storage: Box<dyn Storage>,
}

impl HistoryStore {
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    pub fn load(&self) -> Vec<ChatMessage> {
        let raw = match self.storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("could not read history, starting empty: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<ChatMessage>>(&raw) {
            Ok(history) => {
                debug!(entries = history.len(), "loaded history");
                history
            }
            Err(e) => {
                warn!("stored history is malformed, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    pub fn save(&mut self, history: &[ChatMessage]) {
        let json = match serde_json::to_string(recent(history, MAX_PERSISTED)) {
            Ok(json) => json,
            Err(e) => {
                warn!("could not serialize history: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.set(HISTORY_KEY, &json) {
            warn!("could not persist history: {}", e);
        }
    }
}

/// The last `n` entries of `history`
pub fn recent(history: &[ChatMessage], n: usize) -> &[ChatMessage] {
    &history[history.len().saturating_sub(n)..]
}
