use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::adapters::object_store::{ObjectStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

/// Object store held entirely in memory, keyed by `(bucket, key)`.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<BTreeMap<(String, String), StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn objects(&self) -> MutexGuard<'_, BTreeMap<(String, String), StoredObject>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn seed_object(&self, bucket: &str, key: &str, body: &[u8]) {
        self.objects().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: body.to_vec(),
                content_type: None,
            },
        );
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects()
            .keys()
            .filter(|(owner, _)| owner == bucket)
            .map(|(_, key)| key.clone())
            .collect()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        self.object(bucket, key)
            .map(|object| object.body)
            .ok_or_else(|| StoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), StoreError> {
        self.objects().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: body.to_vec(),
                content_type: Some(content_type.to_string()),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_object_is_not_found() {
        let store = InMemoryObjectStore::new();
        let error = store
            .get_object("bucket1", "data.csv")
            .expect_err("empty store should miss");

        assert_eq!(
            error,
            StoreError::NotFound {
                bucket: "bucket1".to_string(),
                key: "data.csv".to_string(),
            }
        );
        assert_eq!(error.to_string(), "object s3://bucket1/data.csv does not exist");
    }

    #[test]
    fn put_overwrites_and_scopes_by_bucket() {
        let store = InMemoryObjectStore::new();
        store.seed_object("bucket1", "a.csv", b"old");
        store.seed_object("bucket2", "b.csv", b"other");

        store
            .put_object("bucket1", "a.csv", b"new", "text/csv")
            .expect("put should succeed");

        assert_eq!(
            store.get_object("bucket1", "a.csv").expect("object exists"),
            b"new".to_vec()
        );
        assert_eq!(store.keys("bucket1"), vec!["a.csv".to_string()]);
        assert_eq!(
            store
                .object("bucket1", "a.csv")
                .and_then(|object| object.content_type)
                .as_deref(),
            Some("text/csv")
        );
    }
}
