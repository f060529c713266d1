//! Record store access for sharenote.
//!
//! [`RecordStore`] is the four-operation surface (list, create, update,
//! delete) the publisher and the site are written against. [`AirtableStore`]
//! talks to the Airtable REST API. With the `test-util` feature,
//! `MemoryStore` keeps records in process.

use async_trait::async_trait;

pub mod airtable;
pub mod error;
pub mod filter;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod record;

pub use airtable::AirtableStore;
pub use error::StoreError;
pub use filter::{Field, Filter};
#[cfg(any(test, feature = "test-util"))]
pub use memory::{MemoryStore, StoreCall};
pub use record::{Fields, ListQuery, Record};

/// Access to one table of records.
///
/// Abstracted as a trait so orchestration can be tested without a network.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Records on the first page matching `query`. Never an error when
    /// nothing matches.
    async fn list(&self, query: &ListQuery) -> Result<Vec<Record>, StoreError>;

    /// Insert one record and return it as stored.
    async fn create(&self, fields: &Fields) -> Result<Record, StoreError>;

    /// Overwrite the given fields of record `id`; absent fields are untouched.
    async fn update(&self, id: &str, fields: &Fields) -> Result<Record, StoreError>;

    /// Remove record `id`. An unknown id is an error.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
