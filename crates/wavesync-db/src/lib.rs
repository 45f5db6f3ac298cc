//! WaveSync document store
//!
//! Catalog entries live in schemaless collections (`tracks`, `podcasts`). The
//! [`DocumentStore`] trait is the only way the rest of the system touches them; the
//! Postgres implementation keeps each document as a JSONB row, the in-memory one is
//! used for development and tests.

pub mod db;

pub use db::{
    connect_document_store, setup_database, CatalogRepository, Document, DocumentResult,
    DocumentStore, DocumentStoreError, Fields, Filter, FilterOp, InMemoryDocumentStore, OrderBy,
    PgDocumentStore, SortDirection,
};
