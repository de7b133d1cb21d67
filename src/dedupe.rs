use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::error::Result;

type SharedPending<T> = Shared<BoxFuture<'static, Result<T>>>;

/// Keyed in-flight request cache. At most one underlying call runs per key;
/// every caller that arrives while the call is pending awaits the same shared
/// future and observes the identical settled result. The entry is evicted as
/// soon as the underlying call settles, so a later call with the same key
/// starts a fresh request.
///
/// Independent operation classes (fetch-by-ssn vs. save) get independent
/// `Deduper` instances since their key spaces differ.
pub struct Deduper<T: Clone> {
    pending: Arc<Mutex<HashMap<String, SharedPending<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> Default for Deduper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deduper<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Run `factory` for `key`, or attach to the call already in flight.
    /// The factory is only invoked when no call is pending for the key.
    pub async fn run<F, Fut>(&self, key: &str, factory: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let shared = {
            let mut pending = self.pending.lock().await;
            if let Some(existing) = pending.get(key) {
                tracing::debug!(key, "joining in-flight request");
                existing.clone()
            } else {
                let map = Arc::clone(&self.pending);
                let owned_key = key.to_string();
                let fut = factory();
                let shared = async move {
                    let result = fut.await;
                    // Evict before delivery so a caller reacting to the
                    // result can immediately issue a fresh request.
                    map.lock().await.remove(&owned_key);
                    result
                }
                .boxed()
                .shared();
                pending.insert(key.to_string(), shared.clone());
                shared
            }
        };
        shared.await
    }

    /// Number of keys currently in flight.
    pub async fn pending_len(&self) -> usize {
        self.pending.lock().await.len()
    }
}

/// Deterministic signature over the outbound save fields that distinguish
/// logically distinct saves. Two save attempts with identical derived fields
/// inside the in-flight window coalesce into one request.
///
/// `serde_json`'s default map is ordered, so the serialized form is stable;
/// the sha256 digest keeps the key compact.
pub fn save_signature(body: &Value) -> String {
    let field = |k: &str| -> Value { body.get(k).cloned().unwrap_or(Value::String(String::new())) };
    let canonical = json!({
        "id": field("id"),
        "ssn": field("ssn"),
        "startDate": field("startDate"),
        "endDate": field("endDate"),
        "routingNumber": field("routingNumber"),
        "accountNumber": field("accountNumber"),
        "cs": field("c_S_Ind"),
        "override": field("overrideSwitch"),
        "processDay": field("processDay"),
    });
    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
