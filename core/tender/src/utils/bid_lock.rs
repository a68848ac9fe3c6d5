use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use tf_model::BidId;

/// Serializes decisions on the same bid within this process.
#[derive(Clone, Default)]
pub struct BidLock {
    lock_map: Arc<RwLock<HashMap<BidId, Arc<Mutex<()>>>>>,
}

impl BidLock {
    pub fn new() -> BidLock {
        BidLock::default()
    }

    pub async fn get_lock(&self, bid_id: &str) -> Arc<Mutex<()>> {
        // The read guard must be dropped before taking the write lock.
        let existing = { self.lock_map.read().await.get(bid_id).cloned() };
        match existing {
            Some(mutex) => mutex,
            None => self
                .lock_map
                .write()
                .await
                .entry(bid_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone(),
        }
    }

    /// Drops the entry of `bid_id` unless another task still holds its mutex.
    /// Callers must drop their own clone first.
    pub async fn release(&self, bid_id: &str) {
        let mut map = self.lock_map.write().await;
        if let Some(mutex) = map.get(bid_id) {
            if Arc::strong_count(mutex) == 1 {
                map.remove(bid_id);
            }
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.lock_map.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_same_bid_shares_lock() {
        let locks = BidLock::new();

        let first = locks.get_lock("bid-1").await;
        let second = locks.get_lock("bid-1").await;
        let other = locks.get_lock("bid-2").await;

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));

        let _guard = first.lock().await;
        assert!(second.try_lock().is_err());
        assert!(other.try_lock().is_ok());
    }

    #[actix_rt::test]
    async fn test_release_idle_lock() {
        let locks = BidLock::new();

        let first = locks.get_lock("bid-1").await;
        drop(first);
        locks.release("bid-1").await;
        assert_eq!(locks.len().await, 0);
    }

    #[actix_rt::test]
    async fn test_release_keeps_lock_while_held() {
        let locks = BidLock::new();

        let first = locks.get_lock("bid-1").await;
        let waiting = locks.get_lock("bid-1").await;
        drop(first);
        locks.release("bid-1").await;
        assert_eq!(locks.len().await, 1);

        // The waiting task still serializes against newcomers.
        let _guard = waiting.lock().await;
        let newcomer = locks.get_lock("bid-1").await;
        assert!(newcomer.try_lock().is_err());

        drop(newcomer);
        drop(_guard);
        drop(waiting);
        locks.release("bid-1").await;
        assert_eq!(locks.len().await, 0);
    }
}
