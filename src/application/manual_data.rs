//! ManualDataChannel - keeps one serialized payload per section, ready to
//! ride along with the next extraction request.
//!
//! Stores push into the channel through their change listener, so the
//! payloads always match the latest committed record.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::domain::foundation::SectionName;
use crate::domain::record::{SectionRecord, SectionRecordStore};

type Payloads = BTreeMap<SectionName, String>;

/// Shared map of section payloads. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct ManualDataChannel {
    payloads: Arc<Mutex<Payloads>>,
}

impl ManualDataChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes `record` and stores it as its section's payload.
    pub fn publish(&self, record: &SectionRecord) -> Result<(), serde_json::Error> {
        let payload = record.to_json_string()?;
        debug!(section = %record.section(), bytes = payload.len(), "Manual data published");
        self.lock().insert(record.section(), payload);
        Ok(())
    }

    /// Closure for [`SectionRecordStore::set_listener`] that republishes
    /// every committed record.
    pub fn listener(&self) -> impl FnMut(&SectionRecord) + Send + 'static {
        let channel = self.clone();
        move |record: &SectionRecord| {
            if let Err(e) = channel.publish(record) {
                warn!(section = %record.section(), error = %e, "Failed to serialize manual data");
            }
        }
    }

    /// Publishes the store's current record and keeps following it.
    pub fn attach(&self, store: &mut SectionRecordStore) -> Result<(), serde_json::Error> {
        self.publish(store.record())?;
        store.set_listener(self.listener());
        Ok(())
    }

    /// Drops a section's payload so it is omitted from the next request.
    pub fn clear(&self, section: SectionName) {
        self.lock().remove(&section);
    }

    pub fn payload(&self, section: SectionName) -> Option<String> {
        self.lock().get(&section).cloned()
    }

    /// Copy of every payload, in report order.
    pub fn snapshot(&self) -> Payloads {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Payloads> {
        self.payloads.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
