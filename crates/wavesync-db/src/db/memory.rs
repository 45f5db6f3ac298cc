//! Process-local document store for development and tests.

use super::document::{
    compare_json, new_document_id, Document, DocumentResult, DocumentStore, DocumentStoreError,
    Fields, Filter, OrderBy, SortDirection,
};
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use tokio::sync::RwLock;

/// In-memory document store. Documents keep insertion order per collection.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    writes: AtomicUsize,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful inserts and updates since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(AtomicOrdering::SeqCst)
    }

    /// Number of documents currently in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

fn sort_documents(documents: &mut [Document], order: &OrderBy) {
    documents.sort_by(|a, b| {
        let ordering = if order.is_created_at() {
            a.created_at.cmp(&b.created_at)
        } else {
            match (a.data.get(&order.field), b.data.get(&order.field)) {
                (Some(x), Some(y)) => compare_json(x, y).unwrap_or(Ordering::Equal),
                // Missing fields sort first under ascending order
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        };
        match order.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: &str, fields: Fields) -> DocumentResult<String> {
        let now = Utc::now();
        let id = new_document_id();
        let document = Document {
            id: id.clone(),
            data: fields,
            created_at: now,
            updated_at: now,
        };

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);

        tracing::debug!(collection = %collection, document_id = %id, "Document inserted");
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> DocumentResult<Option<Document>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn query(
        &self,
        collection: &str,
        filter: Option<&Filter>,
        order: Option<&OrderBy>,
    ) -> DocumentResult<Vec<Document>> {
        if let Some(filter) = filter {
            filter.validate()?;
        }

        let mut documents: Vec<Document> = self
            .collections
            .read()
            .await
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filter.map_or(true, |f| f.matches(&d.data)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = order {
            sort_documents(&mut documents, order);
        }

        Ok(documents)
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> DocumentResult<()> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| DocumentStoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        document.data.extend(patch);
        document.updated_at = Utc::now();
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);

        tracing::debug!(collection = %collection, document_id = %id, "Document updated");
        Ok(())
    }
}
