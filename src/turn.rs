//! One request/reply cycle, from resolver call to finished animation

use tracing::{info, warn};

use crate::resolver::{Reply, ReplyResolver};
use crate::session::PendingTurn;
use crate::transcript::BubbleId;
use crate::typewriter::Typewriter;

/// Progress of a turn, applied to the session in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    /// Reply available; clear the placeholder before typing into it
    Settled { bubble: BubbleId },
    /// Resolver failed; the placeholder becomes an error bubble
    Failed { bubble: BubbleId, reason: String },
    Chunk { bubble: BubbleId, text: String },
    /// Animation done; `reply` is what goes into history
    Finished { bubble: BubbleId, reply: String },
}

/// Resolve the pending turn and animate the answer into its placeholder.
///
/// `fallback` is used when the resolver has nothing to call or fails. Every
/// path ends with exactly one `Finished` event.
pub async fn run_turn<F>(
    pending: PendingTurn,
    resolver: &dyn ReplyResolver,
    fallback: String,
    typewriter: Typewriter,
    mut emit: F,
) where
    F: FnMut(TurnEvent) + Send,
{
    let bubble = pending.placeholder;

    let reply = match resolver.resolve(&pending.request).await {
        Ok(Reply::Remote(text)) => {
            info!(resolver = resolver.name(), chars = text.chars().count(), "reply received");
            emit(TurnEvent::Settled { bubble });
            text
        }
        Ok(Reply::Offline) => {
            emit(TurnEvent::Settled { bubble });
            fallback
        }
        Err(e) => {
            warn!(resolver = resolver.name(), "reply failed, using local fallback: {}", e);
            emit(TurnEvent::Failed {
                bubble,
                reason: e.to_string(),
            });
            fallback
        }
    };

    typewriter
        .type_text(&reply, |piece| {
            emit(TurnEvent::Chunk {
                bubble,
                text: piece.to_string(),
            })
        })
        .await;

    emit(TurnEvent::Finished { bubble, reply });
}
