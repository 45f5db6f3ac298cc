//! Document store implementations and the typed catalog repository on top of them.
//
// Store abstraction (trait, document, filter, order)
pub mod document;
//
// Implementations
pub mod memory;
pub mod postgres;
//
// Typed access to catalog collections
pub mod catalog;
//
// Backend selection and pool setup
pub mod connect;

pub use catalog::CatalogRepository;
pub use connect::{connect_document_store, setup_database};
pub use document::{
    Document, DocumentResult, DocumentStore, DocumentStoreError, Fields, Filter, FilterOp,
    OrderBy, SortDirection,
};
pub use memory::InMemoryDocumentStore;
pub use postgres::PgDocumentStore;
