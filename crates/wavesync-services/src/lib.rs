//! WaveSync Services Layer
//!
//! Batch services that operate on the catalog, plus a single facade over the
//! storage, processing and document-store crates so binaries depend on one crate.

pub mod reconcile;

pub use reconcile::{
    CollectionSummary, MinIntervalThrottle, ReconcileError, ReconcileOptions,
    ReconciliationJob, ReconciliationReport,
};
pub use wavesync_db::{
    connect_document_store, CatalogRepository, Document, DocumentResult, DocumentStore,
    DocumentStoreError, Fields, Filter, InMemoryDocumentStore, OrderBy, PgDocumentStore,
};
pub use wavesync_processing::{AudioMetadataExtractor, DurationProbe, ProbeError};
pub use wavesync_storage::{create_storage, Storage, StorageBackend, StorageError, StorageResult};
