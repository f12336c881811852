//! Per-key async mutual exclusion.
//!
//! Vote submission and freezing serialise on the proposal id; the relayer
//! serialises event handling the same way. Different keys never contend.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

pub struct KeyedLocks<K> {
    inner: Arc<Mutex<HashMap<K, Arc<AsyncMutex<()>>>>>,
}

impl<K> Clone for KeyedLocks<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`. Released when the guard drops.
    pub async fn lock(&self, key: &K) -> OwnedMutexGuard<()> {
        let slot = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(map.entry(key.clone()).or_default())
        };
        slot.lock_owned().await
    }

    /// Number of keys that have ever been locked.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks = KeyedLocks::new();
        let guard = locks.lock(&1u32).await;
        let second = tokio::time::timeout(Duration::from_millis(20), locks.lock(&1u32)).await;
        assert!(second.is_err());
        drop(guard);
        assert!(tokio::time::timeout(Duration::from_millis(200), locks.lock(&1u32))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn different_keys_do_not_contend() {
        let locks = KeyedLocks::new();
        let _a = locks.lock(&1u32).await;
        let b = tokio::time::timeout(Duration::from_millis(200), locks.lock(&2u32)).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }
}
