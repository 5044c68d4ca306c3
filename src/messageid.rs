//! Message identifier generation and duplicate detection.

use crate::message::SoapMessage;
use parking_lot::RwLock;
use std::collections::HashSet;
use uuid::Uuid;

/// Generates identifiers for outbound messages and recognizes identifiers
/// that have already been seen.
///
/// One strategy instance is shared across all concurrent exchanges, so
/// implementations must synchronize internally. The interceptor never asks
/// about a request without a MessageID; that case is rejected before the
/// strategy is consulted.
pub trait MessageIdStrategy: Send + Sync {
    /// Whether this identifier has been observed before.
    fn is_duplicate(&self, message_id: &str) -> bool;

    /// A fresh, globally unique identifier URI for an outbound message.
    fn new_message_id(&self, message: &SoapMessage) -> String;
}

/// Strategy producing `urn:uuid:` identifiers, with no duplicate tracking.
///
/// Suitable when replay protection is handled elsewhere or not required.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidMessageIdStrategy;

impl MessageIdStrategy for UuidMessageIdStrategy {
    fn is_duplicate(&self, _message_id: &str) -> bool {
        false
    }

    fn new_message_id(&self, _message: &SoapMessage) -> String {
        format!("urn:uuid:{}", Uuid::new_v4())
    }
}

/// Strategy that remembers every identifier it is asked about, in memory.
///
/// The first query for an identifier records it and reports "not a
/// duplicate"; every later query for the same identifier reports a
/// duplicate. History is process-local and unbounded.
#[derive(Debug, Default)]
pub struct InMemoryMessageIdStrategy {
    seen: RwLock<HashSet<String>>,
}

impl InMemoryMessageIdStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct identifiers observed so far.
    pub fn seen_count(&self) -> usize {
        self.seen.read().len()
    }
}

impl MessageIdStrategy for InMemoryMessageIdStrategy {
    fn is_duplicate(&self, message_id: &str) -> bool {
        if self.seen.read().contains(message_id) {
            return true;
        }
        // insert returns false when the id was concurrently recorded.
        !self.seen.write().insert(message_id.to_string())
    }

    fn new_message_id(&self, _message: &SoapMessage) -> String {
        format!("urn:uuid:{}", Uuid::new_v4())
    }
}
