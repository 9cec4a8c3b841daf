//! Session state and its durable key/value store

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Store key holding the auth token
pub const TOKEN_KEY: &str = "token";

/// Store key holding the serialized user record
pub const USER_KEY: &str = "user";

/// Opaque user record returned by the auth backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord(Value);

impl UserRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Name to show in the header, if the record carries one
    pub fn display_name(&self) -> Option<&str> {
        ["username", "name", "email"]
            .iter()
            .find_map(|key| self.0.get(key).and_then(Value::as_str))
    }

    pub fn to_json(&self) -> String {
        self.0.to_string()
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self)
    }
}

/// Who is signed in
///
/// Authentication is derived from the presence of a user, so the two can
/// never disagree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<UserRecord>,
}

impl Session {
    pub fn signed_in(user: UserRecord) -> Self {
        Self { user: Some(user) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&UserRecord> {
        self.user.as_ref()
    }
}

/// Durable key/value persistence that survives restarts
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// Read a previously persisted token and user
///
/// Both must be present and the user must be valid JSON; anything else is
/// treated as "no session".
pub fn read_session(store: &dyn SessionStore) -> Option<(String, UserRecord)> {
    let read = |key: &str| match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to read '{}' from session store: {:#}", key, e);
            None
        }
    };

    let token = read(TOKEN_KEY)?;
    let user_text = read(USER_KEY)?;

    match UserRecord::from_json(&user_text) {
        Ok(user) => Some((token, user)),
        Err(e) => {
            warn!("Ignoring stored user record that is not JSON: {}", e);
            None
        }
    }
}

/// In-memory store, lost when the process exits
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<AHashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a signed-in session
    pub fn with_session(token: &str, user: &UserRecord) -> Self {
        let store = Self::new();
        {
            let mut entries = store.entries.write();
            entries.insert(TOKEN_KEY.to_string(), token.to_string());
            entries.insert(USER_KEY.to_string(), user.to_json());
        }
        store
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}
