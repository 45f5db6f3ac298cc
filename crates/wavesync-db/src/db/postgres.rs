//! Postgres document store: one JSONB row per document in the `documents` table.

use super::document::{
    new_document_id, Document, DocumentResult, DocumentStore, DocumentStoreError, Fields, Filter,
    FilterOp, OrderBy, SortDirection,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Row type for the documents table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: String,
    data: Json<Fields>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DocumentRow {
    fn into_document(self) -> Document {
        Document {
            id: self.id,
            data: self.data.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Document store backed by Postgres.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    let comparator = match filter.op {
        FilterOp::Eq => "=",
        FilterOp::Lt => "<",
        FilterOp::Lte => "<=",
        FilterOp::Gt => ">",
        FilterOp::Gte => ">=",
    };

    match (&filter.op, &filter.value) {
        (FilterOp::Eq, value) => {
            builder.push(" AND data -> ");
            builder.push_bind(filter.field.clone());
            builder.push(" = ");
            builder.push_bind(Json(value.clone()));
        }
        (_, Value::Number(n)) => {
            builder.push(" AND jsonb_typeof(data -> ");
            builder.push_bind(filter.field.clone());
            builder.push(") = 'number' AND (data ->> ");
            builder.push_bind(filter.field.clone());
            builder.push(format!(")::double precision {} ", comparator));
            builder.push_bind(n.as_f64().unwrap_or_default());
        }
        (_, value) => {
            builder.push(" AND jsonb_typeof(data -> ");
            builder.push_bind(filter.field.clone());
            builder.push(") = 'string' AND data ->> ");
            builder.push_bind(filter.field.clone());
            builder.push(format!(" {} ", comparator));
            builder.push_bind(value.as_str().unwrap_or_default().to_string());
        }
    }
}

fn push_order(builder: &mut QueryBuilder<'_, Postgres>, order: Option<&OrderBy>) {
    let Some(order) = order else {
        builder.push(" ORDER BY created_at ASC, id ASC");
        return;
    };

    let direction = match order.direction {
        SortDirection::Ascending => "ASC NULLS FIRST",
        SortDirection::Descending => "DESC NULLS LAST",
    };

    if order.is_created_at() {
        builder.push(format!(" ORDER BY created_at {}, id ASC", direction));
    } else {
        builder.push(" ORDER BY data -> ");
        builder.push_bind(order.field.clone());
        builder.push(format!(" {}, created_at ASC, id ASC", direction));
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[tracing::instrument(skip(self, fields), fields(db.table = "documents", collection = %collection))]
    async fn insert(&self, collection: &str, fields: Fields) -> DocumentResult<String> {
        let id = new_document_id();

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(collection)
        .bind(&id)
        .bind(Json(fields))
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.record_id = %id))]
    async fn get(&self, collection: &str, id: &str) -> DocumentResult<Option<Document>> {
        let row: Option<DocumentRow> = sqlx::query_as::<Postgres, DocumentRow>(
            r#"
            SELECT id, data, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DocumentRow::into_document))
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", collection = %collection))]
    async fn query(
        &self,
        collection: &str,
        filter: Option<&Filter>,
        order: Option<&OrderBy>,
    ) -> DocumentResult<Vec<Document>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT id, data, created_at, updated_at FROM documents WHERE collection = ",
        );
        builder.push_bind(collection.to_string());

        if let Some(filter) = filter {
            filter.validate()?;
            push_filter(&mut builder, filter);
        }
        push_order(&mut builder, order);

        let rows: Vec<DocumentRow> = builder
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = rows.len(), "Documents fetched");

        Ok(rows.into_iter().map(DocumentRow::into_document).collect())
    }

    #[tracing::instrument(skip(self, patch), fields(db.table = "documents", db.record_id = %id))]
    async fn update(&self, collection: &str, id: &str, patch: Fields) -> DocumentResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET data = data || $3, updated_at = now()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(patch))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DocumentStoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }
}
