use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Per-user session storage owned by the host application.
///
/// The authorization flow keeps the CSRF state here between redirecting the user to Gov.br and
/// handling the callback. Implementations are typically backed by the host's cookie or
/// server-side session mechanism.
pub trait SessionStore {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String);
    /// Removes the value stored under `key`.
    fn clear(&self, key: &str);
}

impl<S> SessionStore for &S
where
    S: SessionStore + ?Sized,
{
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: String) {
        (**self).set(key, value)
    }
    fn clear(&self, key: &str) {
        (**self).clear(key)
    }
}

impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: String) {
        (**self).set(key, value)
    }
    fn clear(&self, key: &str) {
        (**self).clear(key)
    }
}

/// An in-memory [`SessionStore`] holding a single user's session.
///
/// Nothing is persisted; this is intended for tests, demos and single-user tools.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}
impl MemorySessionStore {
    /// Create a new, empty `MemorySessionStore`.
    pub fn new() -> Self {
        Self::default()
    }
}
impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
    fn set(&self, key: &str, value: String) {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value);
    }
    fn clear(&self, key: &str) {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(key);
    }
}
