pub mod config;
pub mod fallback;
pub mod history;
pub mod locale;
pub mod logging;
pub mod policy;
pub mod resolver;
pub mod session;
pub mod settings;
pub mod state;
pub mod storage;
pub mod transcript;
pub mod turn;
pub mod typewriter;

// Re-export main types for convenience
pub use config::Config;
pub use fallback::FallbackGenerator;
pub use history::HistoryStore;
pub use locale::Language;
pub use policy::Policy;
pub use resolver::{DirectResolver, ProxyResolver, Reply, ReplyError, ReplyRequest, ReplyResolver};
pub use session::{ChatSession, PendingTurn};
pub use settings::Settings;
pub use state::{ChatMessage, ChatRole};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use transcript::{Bubble, BubbleId, BubbleKind, Transcript};
pub use turn::{run_turn, TurnEvent};
pub use typewriter::Typewriter;
