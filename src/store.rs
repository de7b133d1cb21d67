use crate::models::EnrollmentRecord;

/// Records addressable by their backend identifier.
pub trait Identified {
    fn record_id(&self) -> &str;
}

impl Identified for EnrollmentRecord {
    fn record_id(&self) -> &str {
        &self.id
    }
}

pub type SubscriptionId = u64;

type Subscriber<T> = Box<dyn Fn(&[T]) + Send + Sync>;

/// Owner of the current ordered record collection. Consumers only ever see
/// snapshot copies; every mutation publishes a fresh snapshot synchronously
/// to all subscribers. Patches against a stale index or an unknown id are
/// silent no-ops (no publish) — the UI may legitimately be one interaction
/// behind the store.
pub struct RecordStore<T: Clone> {
    records: Vec<T>,
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
    next_subscription: SubscriptionId,
}

impl<T: Clone> Default for RecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> RecordStore<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Snapshot copy of the current collection.
    pub fn get_all(&self) -> Vec<T> {
        self.records.clone()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn set_all(&mut self, records: Vec<T>) {
        self.records = records;
        self.publish();
    }

    /// Apply `patch` to the record at `index`. Out-of-bounds is a no-op.
    pub fn patch_at(&mut self, index: usize, patch: impl FnOnce(&mut T)) {
        let Some(record) = self.records.get_mut(index) else {
            return;
        };
        patch(record);
        self.publish();
    }

    /// Register `callback` and immediately deliver the current snapshot.
    pub fn subscribe(&mut self, callback: impl Fn(&[T]) + Send + Sync + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        callback(&self.records);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    fn publish(&self) {
        for (_, callback) in &self.subscribers {
            callback(&self.records);
        }
    }
}

impl<T: Clone + Identified> RecordStore<T> {
    /// Apply `patch` to the record whose id matches. Unknown id is a no-op.
    pub fn patch_by_id(&mut self, id: &str, patch: impl FnOnce(&mut T)) {
        let Some(record) = self.records.iter_mut().find(|r| r.record_id() == id) else {
            return;
        };
        patch(record);
        self.publish();
    }
}
