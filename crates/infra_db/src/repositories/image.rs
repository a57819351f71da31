//! Property image repository

use chrono::{DateTime, Utc};
use core_kernel::{PropertyId, PropertyImageId};
use domain_property::PropertyImage;
use sqlx::PgPool;

use crate::error::DatabaseError;

const IMAGE_COLUMNS: &str = "id, property_id, file, is_active, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImageRow {
    pub id: i64,
    pub property_id: i64,
    pub file: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ImageRow> for PropertyImage {
    fn from(row: ImageRow) -> Self {
        PropertyImage {
            id: PropertyImageId::new(row.id),
            property_id: PropertyId::new(row.property_id),
            file: row.file,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageRepository {
    pool: PgPool,
}

impl ImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_active(&self, id: i64) -> Result<Option<ImageRow>, DatabaseError> {
        let sql = format!("SELECT {IMAGE_COLUMNS} FROM property_images WHERE id = $1 AND is_active");
        Ok(sqlx::query_as::<_, ImageRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Images of the given properties ordered by id
    pub async fn for_properties(
        &self,
        property_ids: &[i64],
        active_only: bool,
    ) -> Result<Vec<ImageRow>, DatabaseError> {
        if property_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {IMAGE_COLUMNS} FROM property_images \
             WHERE property_id = ANY($1) AND (is_active OR NOT $2) ORDER BY id"
        );
        Ok(sqlx::query_as::<_, ImageRow>(&sql)
            .bind(property_ids)
            .bind(active_only)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn insert(&self, property_id: i64, file: &str) -> Result<ImageRow, DatabaseError> {
        let sql = format!(
            "INSERT INTO property_images (property_id, file) VALUES ($1, $2) RETURNING {IMAGE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, ImageRow>(&sql)
            .bind(property_id)
            .bind(file)
            .fetch_one(&self.pool)
            .await?)
    }

    /// Clears the active flag; None when there was no active image
    pub async fn deactivate(&self, id: i64) -> Result<Option<ImageRow>, DatabaseError> {
        let sql = format!(
            "UPDATE property_images SET is_active = FALSE, updated_at = now() \
             WHERE id = $1 AND is_active RETURNING {IMAGE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, ImageRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}
