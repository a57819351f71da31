//! Property trace repository
//!
//! Traces are append-only; there is no update or delete.

use chrono::{DateTime, Utc};
use core_kernel::{PropertyId, PropertyTraceId};
use domain_property::{NewPropertyTrace, PropertyTrace};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::error::DatabaseError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TraceRow {
    pub id: i64,
    pub property_id: i64,
    pub date_sale: DateTime<Utc>,
    pub name: String,
    pub value: Decimal,
    pub tax: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<TraceRow> for PropertyTrace {
    fn from(row: TraceRow) -> Self {
        PropertyTrace {
            id: PropertyTraceId::new(row.id),
            property_id: PropertyId::new(row.property_id),
            date_sale: row.date_sale,
            name: row.name,
            value: row.value,
            tax: row.tax,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TraceRepository {
    pool: PgPool,
}

impl TraceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Traces of the given properties, newest first within each property
    pub async fn for_properties(
        &self,
        property_ids: &[i64],
    ) -> Result<Vec<TraceRow>, DatabaseError> {
        if property_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(sqlx::query_as::<_, TraceRow>(
            r#"
            SELECT id, property_id, date_sale, name, value, tax, created_at
            FROM property_traces
            WHERE property_id = ANY($1)
            ORDER BY property_id, date_sale DESC, id DESC
            "#,
        )
        .bind(property_ids)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn append(
        conn: &mut PgConnection,
        trace: &NewPropertyTrace,
    ) -> Result<TraceRow, DatabaseError> {
        Ok(sqlx::query_as::<_, TraceRow>(
            r#"
            INSERT INTO property_traces (property_id, date_sale, name, value, tax)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, property_id, date_sale, name, value, tax, created_at
            "#,
        )
        .bind(trace.property_id.value())
        .bind(trace.date_sale)
        .bind(&trace.name)
        .bind(trace.value)
        .bind(trace.tax)
        .fetch_one(conn)
        .await?)
    }
}
