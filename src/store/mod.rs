//! Document store - atomic single-document persistence.
//!
//! The backing store guarantees atomicity per document and nothing more:
//! no multi-document transactions, no global lock. Every multi-step
//! procedure in the service layer is built as an idempotent, order-biased
//! sequence on top of these primitives.

mod in_memory;

use std::fmt;

use crate::domain::Document;

/// A versioned wrapper around document data for optimistic concurrency
/// control.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

/// Error type for document store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Optimistic concurrency conflict, or an insert over an existing id.
    Conflict {
        collection: String,
        id: String,
        expected: u64,
        actual: u64,
    },
    /// Document not found.
    NotFound { collection: String, id: String },
    /// Serialization/deserialization error.
    Serde(String),
    /// Storage-level error.
    Storage(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict {
                collection,
                id,
                expected,
                actual,
            } => write!(
                f,
                "write conflict on {}:{} (expected version {}, actual {})",
                collection, id, expected, actual
            ),
            StoreError::NotFound { collection, id } => {
                write!(f, "document not found: {}:{}", collection, id)
            }
            StoreError::Serde(msg) => write!(f, "document serialization error: {}", msg),
            StoreError::Storage(msg) => write!(f, "document storage error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Abstract atomic single-document storage.
///
/// Each method is one atomic round-trip against one document; the store
/// never coordinates across documents.
pub trait DocumentStore: Send + Sync {
    /// Get a document by id. Returns None if not found.
    fn get<D: Document>(&self, id: &str) -> Result<Option<Versioned<D>>, StoreError>;

    /// Insert a new document. Fails with `Conflict` if the id exists.
    fn insert<D: Document>(&self, doc: &D) -> Result<Versioned<D>, StoreError>;

    /// Upsert a document (insert or overwrite, no version check).
    fn put<D: Document>(&self, doc: &D) -> Result<Versioned<D>, StoreError>;

    /// Update an existing document with optimistic concurrency control.
    fn update<D: Document>(
        &self,
        doc: &D,
        expected_version: u64,
    ) -> Result<Versioned<D>, StoreError>;

    /// Filtered conditional update: load the document, and only if `filter`
    /// accepts it apply `apply` and write the result back, all under one
    /// document-level critical section. Returns None when the document is
    /// absent or the filter rejects it.
    fn update_where<D: Document>(
        &self,
        id: &str,
        filter: &dyn Fn(&D) -> bool,
        apply: &dyn Fn(&mut D),
    ) -> Result<Option<Versioned<D>>, StoreError>;

    /// Delete a document by id. Returns true if it existed.
    fn delete<D: Document>(&self, id: &str) -> Result<bool, StoreError>;

    /// Find documents matching a predicate.
    fn find<D: Document>(
        &self,
        predicate: &dyn Fn(&D) -> bool,
    ) -> Result<Vec<Versioned<D>>, StoreError>;
}

pub use in_memory::InMemoryStore;
