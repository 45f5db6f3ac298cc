//! Document store abstraction
//!
//! A collection holds JSON documents keyed by a store-assigned id. The store stamps
//! `created_at` on insert; updates merge top-level fields into the existing document.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use thiserror::Error;
use wavesync_core::AppError;

/// Top-level fields of a document.
pub type Fields = Map<String, Value>;

/// Document store errors
#[derive(Debug, Error)]
pub enum DocumentStoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// Result type for document store operations
pub type DocumentResult<T> = Result<T, DocumentStoreError>;

impl From<DocumentStoreError> for AppError {
    fn from(err: DocumentStoreError) -> Self {
        match err {
            DocumentStoreError::NotFound { collection, id } => {
                AppError::NotFound(format!("{}/{}", collection, id))
            }
            DocumentStoreError::InvalidQuery(msg) => AppError::InvalidInput(msg),
            DocumentStoreError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Fields,
    /// Server-assigned at insert.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

/// Comparison of one top-level field against a JSON value.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: Value) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    /// Range filters only compare numbers with numbers and strings with strings.
    pub fn validate(&self) -> DocumentResult<()> {
        if self.field.is_empty() {
            return Err(DocumentStoreError::InvalidQuery(
                "Filter field must not be empty".to_string(),
            ));
        }
        if self.op != FilterOp::Eq && !(self.value.is_number() || self.value.is_string()) {
            return Err(DocumentStoreError::InvalidQuery(format!(
                "Range filter on '{}' needs a number or string value",
                self.field
            )));
        }
        Ok(())
    }

    /// Evaluate against a document's fields. Missing fields never match.
    pub fn matches(&self, data: &Fields) -> bool {
        let Some(actual) = data.get(&self.field) else {
            return false;
        };
        let ordering = || compare_json(actual, &self.value);
        match self.op {
            FilterOp::Eq => json_eq(actual, &self.value),
            FilterOp::Lt => ordering() == Some(Ordering::Less),
            FilterOp::Lte => matches!(ordering(), Some(Ordering::Less | Ordering::Equal)),
            FilterOp::Gt => ordering() == Some(Ordering::Greater),
            FilterOp::Gte => matches!(ordering(), Some(Ordering::Greater | Ordering::Equal)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Ordering by a top-level field, or by the server timestamp via [`OrderBy::CREATED_AT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub const CREATED_AT: &'static str = "createdAt";

    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    pub fn is_created_at(&self) -> bool {
        self.field == Self::CREATED_AT
    }
}

/// Document store abstraction
///
/// Implementations are process-wide and shared across requests.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document and return its generated id.
    async fn insert(&self, collection: &str, fields: Fields) -> DocumentResult<String>;

    async fn get(&self, collection: &str, id: &str) -> DocumentResult<Option<Document>>;

    /// All matching documents; creation order when `order` is `None`.
    async fn query(
        &self,
        collection: &str,
        filter: Option<&Filter>,
        order: Option<&OrderBy>,
    ) -> DocumentResult<Vec<Document>>;

    /// Merge `patch` into an existing document. Fails with `NotFound` if it does not exist.
    async fn update(&self, collection: &str, id: &str, patch: Fields) -> DocumentResult<()>;
}

pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn json_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Ordering between two JSON scalars of the same type; `None` across types.
pub(crate) fn compare_json(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
