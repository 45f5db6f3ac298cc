//! Catalog repository: typed access to the `tracks` and `podcasts` collections.

use super::document::{DocumentResult, DocumentStore, OrderBy};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use wavesync_core::models::{
    duration_patch, CatalogEntry, CatalogKind, DurationProbeResult, NewCatalogEntry,
};

/// Repository for catalog entries.
#[derive(Clone)]
pub struct CatalogRepository {
    store: Arc<dyn DocumentStore>,
}

impl CatalogRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Insert a new entry and return its generated id.
    #[tracing::instrument(skip(self, entry), fields(collection = entry.kind().collection()))]
    pub async fn create(&self, entry: &NewCatalogEntry) -> DocumentResult<String> {
        let collection = entry.kind().collection();
        let id = self.store.insert(collection, entry.to_fields()).await?;

        tracing::info!(
            entry_id = %id,
            duration_secs = entry.duration_seconds,
            has_accurate_duration = entry.has_accurate_duration,
            "Catalog entry created"
        );

        Ok(id)
    }

    #[tracing::instrument(skip(self), fields(collection = kind.collection()))]
    pub async fn get(&self, kind: CatalogKind, id: &str) -> DocumentResult<Option<CatalogEntry>> {
        let document = self.store.get(kind.collection(), id).await?;
        Ok(document.map(|doc| CatalogEntry::from_fields(kind, doc.id, doc.created_at, &doc.data)))
    }

    /// Every entry of a kind, oldest first.
    #[tracing::instrument(skip(self), fields(collection = kind.collection()))]
    pub async fn list(&self, kind: CatalogKind) -> DocumentResult<Vec<CatalogEntry>> {
        let order = OrderBy::asc(OrderBy::CREATED_AT);
        let documents = self
            .store
            .query(kind.collection(), None, Some(&order))
            .await?;

        Ok(documents
            .into_iter()
            .map(|doc| CatalogEntry::from_fields(kind, doc.id, doc.created_at, &doc.data))
            .collect())
    }

    /// Overwrite the stored duration with a verified probe result.
    #[tracing::instrument(skip(self, result), fields(collection = kind.collection(), duration_secs = result.total_seconds))]
    pub async fn update_duration(
        &self,
        kind: CatalogKind,
        id: &str,
        result: &DurationProbeResult,
        checked_at: DateTime<Utc>,
    ) -> DocumentResult<()> {
        self.store
            .update(kind.collection(), id, duration_patch(result, checked_at))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryDocumentStore;
    use wavesync_core::models::CatalogDetails;

    fn episode(title: &str, duration_seconds: u64) -> NewCatalogEntry {
        NewCatalogEntry {
            title: title.to_string(),
            category_id: "talk".to_string(),
            audio_url: format!("https://cdn.example.com/{}.mp3", title),
            cover_url: "https://via.placeholder.com/300".to_string(),
            duration_seconds,
            has_accurate_duration: duration_seconds > 0,
            details: CatalogDetails::Episode {
                host: "Sam".to_string(),
                description: "Weekly show".to_string(),
                episode_number: 4,
            },
        }
    }

    #[tokio::test]
    async fn create_writes_to_kind_collection() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let repo = CatalogRepository::new(store.clone());

        let id = repo.create(&episode("ep4", 0)).await.unwrap();

        assert_eq!(store.len("podcasts").await, 1);
        assert_eq!(store.len("tracks").await, 0);

        let entry = repo.get(CatalogKind::Episode, &id).await.unwrap().unwrap();
        assert_eq!(entry.play_count, 0);
        assert_eq!(entry.duration_seconds, Some(0));
        assert_eq!(entry.has_accurate_duration, Some(false));
        assert!(matches!(
            entry.details,
            CatalogDetails::Episode { episode_number: 4, .. }
        ));
    }

    #[tokio::test]
    async fn update_duration_applies_patch() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let repo = CatalogRepository::new(store.clone());
        let id = repo.create(&episode("ep5", 180)).await.unwrap();

        repo.update_duration(
            CatalogKind::Episode,
            &id,
            &DurationProbeResult::from_total_seconds(2710),
            Utc::now(),
        )
        .await
        .unwrap();

        let entry = repo.get(CatalogKind::Episode, &id).await.unwrap().unwrap();
        assert_eq!(entry.duration_seconds, Some(2710));
        assert_eq!(entry.has_accurate_duration, Some(true));

        let listed = repo.list(CatalogKind::Episode).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
    }
}
