use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::record::{Fields, ListQuery, Record};
use crate::RecordStore;

/// A call received by a [`MemoryStore`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List(ListQuery),
    Create(Fields),
    Update { id: String, fields: Fields },
    Delete(String),
}

#[derive(Default)]
struct MemoryState {
    records: Vec<Record>,
    next_id: u64,
    calls: Vec<StoreCall>,
}

/// In-process record table with the same semantics as the hosted one.
/// Every call is journaled so callers can assert on what was sent.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `fields`, bypassing the call journal.
    pub fn with_records(fields: impl IntoIterator<Item = Fields>) -> Self {
        let store = Self::new();
        {
            let mut state = store.lock();
            for fields in fields {
                let record = state.insert(fields);
                tracing::trace!(id = %record.id, "seeded record");
            }
        }
        store
    }

    pub fn records(&self) -> Vec<Record> {
        self.lock().records.clone()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panic while holding the lock cannot leave the vectors half-written.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MemoryState {
    fn insert(&mut self, fields: Fields) -> Record {
        self.next_id += 1;
        let record = Record {
            id: format!("rec{:014}", self.next_id),
            created_time: None,
            fields,
        };
        self.records.push(record.clone());
        record
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Record>, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::List(query.clone()));

        let limit = query.max_records.map_or(usize::MAX, |max| max as usize);
        Ok(state
            .records
            .iter()
            .filter(|record| {
                query
                    .filter
                    .as_ref()
                    .map_or(true, |filter| filter.matches(&record.fields))
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn create(&self, fields: &Fields) -> Result<Record, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Create(fields.clone()));
        Ok(state.insert(fields.clone()))
    }

    async fn update(&self, id: &str, fields: &Fields) -> Result<Record, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Update {
            id: id.to_string(),
            fields: fields.clone(),
        });

        let record = state
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| StoreError::RecordNotFound(id.to_string()))?;
        record.fields.merge(fields);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Delete(id.to_string()));

        let index = state
            .records
            .iter()
            .position(|record| record.id == id)
            .ok_or_else(|| StoreError::RecordNotFound(id.to_string()))?;
        state.records.remove(index);
        Ok(())
    }
}
