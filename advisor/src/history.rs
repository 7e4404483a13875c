//! Short per-sender conversation memory.

use std::collections::{HashMap, VecDeque};
use std::{future::Future, pin::Pin};

use tokio::sync::RwLock;
use tracing::trace;

use crate::prompt::Turn;

/// Where previous turns of a conversation are kept.
pub trait ConversationStore: Send + Sync {
    /// Up to `limit` most recent turns of `sender`, oldest first.
    fn recent<'a>(
        &'a self,
        sender: &'a str,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = Vec<Turn>> + Send + 'a>>;

    fn append<'a>(
        &'a self,
        sender: &'a str,
        turn: Turn,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

    /// Appends a question and its answer as one step, so concurrent messages
    /// of the same sender never interleave inside a pair.
    fn append_exchange<'a>(
        &'a self,
        sender: &'a str,
        user: Turn,
        assistant: Turn,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

/// In-process store; each sender keeps at most `capacity` turns.
///
/// Lost on restart.
pub struct InMemoryHistory {
    capacity: usize,
    inner: RwLock<HashMap<String, VecDeque<Turn>>>,
}

impl InMemoryHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(HashMap::new()),
        }
    }

    async fn push_all(&self, sender: &str, new_turns: impl IntoIterator<Item = Turn>) {
        let mut map = self.inner.write().await;
        let turns = map.entry(sender.to_string()).or_default();
        turns.extend(new_turns);
        while turns.len() > self.capacity {
            turns.pop_front();
        }
        trace!(sender, stored = turns.len(), "history append");
    }
}

impl ConversationStore for InMemoryHistory {
    fn recent<'a>(
        &'a self,
        sender: &'a str,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = Vec<Turn>> + Send + 'a>> {
        Box::pin(async move {
            let map = self.inner.read().await;
            let Some(turns) = map.get(sender) else {
                return Vec::new();
            };
            let skip = turns.len().saturating_sub(limit);
            turns.iter().skip(skip).cloned().collect()
        })
    }

    fn append<'a>(
        &'a self,
        sender: &'a str,
        turn: Turn,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(self.push_all(sender, [turn]))
    }

    fn append_exchange<'a>(
        &'a self,
        sender: &'a str,
        user: Turn,
        assistant: Turn,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(self.push_all(sender, [user, assistant]))
    }
}
