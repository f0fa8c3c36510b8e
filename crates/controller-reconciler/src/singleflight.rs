use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use controller_domain::ManifestKey;
use tokio::sync::{Mutex, RwLock};

/// Per-key work queue guaranteeing at-most-one concurrent apply per
/// manifest key (§4.5, §9): a `HashMap<ManifestKey, Arc<Mutex<()>>>`
/// behind an outer `RwLock`. The outer lock only ever guards map
/// bookkeeping — the per-key mutex is what's held across the cluster
/// I/O, and only one task holds it at a time.
#[derive(Default)]
pub struct SingleFlight {
    locks: RwLock<HashMap<ManifestKey, Arc<Mutex<()>>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    async fn lock_for(&self, key: &ManifestKey) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(key) {
            return lock.clone();
        }
        self.locks.write().await.entry(key.clone()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Runs `f` with exclusive access for `key`; concurrent calls for the
    /// same key queue behind the per-key mutex, calls for different keys
    /// never block each other.
    pub async fn run<F, Fut, T>(&self, key: &ManifestKey, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let lock = self.lock_for(key).await;
        let _guard = lock.lock().await;
        f().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_runs_for_same_key_are_serialized() {
        let flight = Arc::new(SingleFlight::new());
        let key = ManifestKey::parse("default/Service/svc").unwrap();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for i in 0..5 {
            let flight = flight.clone();
            let key = key.clone();
            let order = order.clone();
            handles.push(tokio::spawn(async move {
                flight
                    .run(&key, || async move {
                        order.lock().unwrap().push(format!("start-{i}"));
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        order.lock().unwrap().push(format!("end-{i}"));
                    })
                    .await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let order = order.lock().unwrap().clone();
        // every start must be immediately followed by its own end — no
        // interleaving of two different keys' start/end pairs.
        for pair in order.chunks(2) {
            let start = pair[0].strip_prefix("start-").unwrap();
            let end = pair[1].strip_prefix("end-").unwrap();
            assert_eq!(start, end);
        }
    }

    #[tokio::test]
    async fn different_keys_do_not_block_each_other() {
        let flight = Arc::new(SingleFlight::new());
        let a = ManifestKey::parse("default/Service/a").unwrap();
        let b = ManifestKey::parse("default/Service/b").unwrap();

        let counter = Arc::new(AtomicUsize::new(0));
        let (flight_a, counter_a) = (flight.clone(), counter.clone());
        let handle_a = tokio::spawn(async move {
            flight_a
                .run(&a, || async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    counter_a.fetch_add(1, Ordering::SeqCst);
                })
                .await;
        });

        // b's lock is independent of a's — this completes well before a does.
        flight.run(&b, || async { counter.fetch_add(10, Ordering::SeqCst) }).await;
        assert_eq!(counter.load(Ordering::SeqCst), 10);

        handle_a.await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }
}
