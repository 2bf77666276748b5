//! InMemoryStore - HashMap-backed document store for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{DocumentStore, StoreError, Versioned};
use crate::domain::Document;

/// Internal stored representation of a document.
struct StoredDocument {
    bytes: Vec<u8>,
    version: u64,
}

/// In-memory document store backed by a HashMap.
///
/// Storage key is `"collection:id"`; the whole map sits behind one RwLock,
/// so every operation is atomic at document granularity. Clone-friendly
/// via Arc.
#[derive(Clone)]
pub struct InMemoryStore {
    storage: Arc<RwLock<HashMap<String, StoredDocument>>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn make_key(collection: &str, id: &str) -> String {
        format!("{}:{}", collection, id)
    }

    fn encode<D: Document>(doc: &D) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(doc).map_err(|e| StoreError::Serde(e.to_string()))
    }

    fn decode<D: Document>(bytes: &[u8]) -> Result<D, StoreError> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Serde(e.to_string()))
    }
}

impl DocumentStore for InMemoryStore {
    fn get<D: Document>(&self, id: &str) -> Result<Option<Versioned<D>>, StoreError> {
        let key = Self::make_key(D::COLLECTION, id);
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        match storage.get(&key) {
            Some(stored) => Ok(Some(Versioned {
                data: Self::decode(&stored.bytes)?,
                version: stored.version,
            })),
            None => Ok(None),
        }
    }

    fn insert<D: Document>(&self, doc: &D) -> Result<Versioned<D>, StoreError> {
        let key = Self::make_key(D::COLLECTION, doc.id());
        let bytes = Self::encode(doc)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        if let Some(existing) = storage.get(&key) {
            return Err(StoreError::Conflict {
                collection: D::COLLECTION.to_string(),
                id: doc.id().to_string(),
                expected: 0,
                actual: existing.version,
            });
        }

        storage.insert(key, StoredDocument { bytes, version: 1 });

        Ok(Versioned {
            data: doc.clone(),
            version: 1,
        })
    }

    fn put<D: Document>(&self, doc: &D) -> Result<Versioned<D>, StoreError> {
        let key = Self::make_key(D::COLLECTION, doc.id());
        let bytes = Self::encode(doc)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let new_version = storage.get(&key).map(|s| s.version + 1).unwrap_or(1);
        storage.insert(
            key,
            StoredDocument {
                bytes,
                version: new_version,
            },
        );

        Ok(Versioned {
            data: doc.clone(),
            version: new_version,
        })
    }

    fn update<D: Document>(
        &self,
        doc: &D,
        expected_version: u64,
    ) -> Result<Versioned<D>, StoreError> {
        let key = Self::make_key(D::COLLECTION, doc.id());
        let bytes = Self::encode(doc)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let actual_version = storage
            .get(&key)
            .map(|s| s.version)
            .ok_or_else(|| StoreError::NotFound {
                collection: D::COLLECTION.to_string(),
                id: doc.id().to_string(),
            })?;

        if actual_version != expected_version {
            return Err(StoreError::Conflict {
                collection: D::COLLECTION.to_string(),
                id: doc.id().to_string(),
                expected: expected_version,
                actual: actual_version,
            });
        }

        let new_version = actual_version + 1;
        storage.insert(
            key,
            StoredDocument {
                bytes,
                version: new_version,
            },
        );

        Ok(Versioned {
            data: doc.clone(),
            version: new_version,
        })
    }

    fn update_where<D: Document>(
        &self,
        id: &str,
        filter: &dyn Fn(&D) -> bool,
        apply: &dyn Fn(&mut D),
    ) -> Result<Option<Versioned<D>>, StoreError> {
        let key = Self::make_key(D::COLLECTION, id);

        // Write lock for the whole read-check-modify-write: this is the
        // single-document atomic update the store contract promises.
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let stored = match storage.get(&key) {
            Some(stored) => stored,
            None => return Ok(None),
        };

        let mut data: D = Self::decode(&stored.bytes)?;
        if !filter(&data) {
            return Ok(None);
        }

        apply(&mut data);

        let new_version = stored.version + 1;
        let bytes = Self::encode(&data)?;
        storage.insert(
            key,
            StoredDocument {
                bytes,
                version: new_version,
            },
        );

        Ok(Some(Versioned {
            data,
            version: new_version,
        }))
    }

    fn delete<D: Document>(&self, id: &str) -> Result<bool, StoreError> {
        let key = Self::make_key(D::COLLECTION, id);
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        Ok(storage.remove(&key).is_some())
    }

    fn find<D: Document>(
        &self,
        predicate: &dyn Fn(&D) -> bool,
    ) -> Result<Vec<Versioned<D>>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let prefix = format!("{}:", D::COLLECTION);
        let mut results = Vec::new();

        for (key, stored) in storage.iter() {
            if key.starts_with(&prefix) {
                if let Ok(data) = serde_json::from_slice::<D>(&stored.bytes) {
                    if predicate(&data) {
                        results.push(Versioned {
                            data,
                            version: stored.version,
                        });
                    }
                }
            }
        }

        Ok(results)
    }
}
