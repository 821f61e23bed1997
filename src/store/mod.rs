//! In-memory document store keyed by session.
//!
//! Every slot holds the full text of the most recently ingested document for that session.
//! Writers replace the whole `Arc<str>` under a short write lock, so readers always observe
//! one complete document and concurrent callers resolve as last-writer-wins. The HTTP surface
//! only uses [`SessionId::shared`], which makes the slot process-wide.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifier of a document slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    const SHARED: &'static str = "shared";

    /// The single session shared by every client of a server instance.
    pub fn shared() -> Self {
        Self(Self::SHARED.to_string())
    }

    /// Build a session identifier from an arbitrary key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::shared()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session-keyed store of extracted document text.
#[derive(Debug, Default)]
pub struct DocumentStore {
    slots: RwLock<HashMap<SessionId, Arc<str>>>,
}

impl DocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the session's text unconditionally.
    pub fn replace(&self, session: &SessionId, text: impl Into<Arc<str>>) {
        let text = text.into();
        let mut slots = self.slots.write();
        slots.insert(session.clone(), text);
    }

    /// Snapshot the session's text, returning `None` when nothing non-empty is resident.
    pub fn get(&self, session: &SessionId) -> Option<Arc<str>> {
        let slots = self.slots.read();
        slots
            .get(session)
            .filter(|text| !text.is_empty())
            .map(Arc::clone)
    }
}
