//! Key-value storage seam.
//!
//! The host supplies persistence (it survives app restarts there); the client
//! only needs synchronous get/set/remove by string key.

use papaya::HashMap;
use std::sync::Arc;

/// Process-wide string key-value store. No transactions, no expiry.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// In-memory `Storage` backed by a lock-free map. Clones share contents.
#[derive(Clone)]
pub struct MemoryStorage {
    entries: Arc<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.pin().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries.pin().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.pin().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("token"), None);

        storage.set("token", "t1".to_string());
        storage.set("token", "t2".to_string());
        assert_eq!(storage.get("token").as_deref(), Some("t2"));

        storage.remove("token");
        assert_eq!(storage.get("token"), None);
        storage.remove("token");
    }

    #[test]
    fn clones_share_entries() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.set("userInfo", "{}".to_string());
        assert_eq!(other.get("userInfo").as_deref(), Some("{}"));
    }
}
