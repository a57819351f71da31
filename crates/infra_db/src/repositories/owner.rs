//! Owner repository

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::OwnerId;
use domain_property::Owner;
use sqlx::{PgConnection, PgPool};

use crate::error::DatabaseError;

const OWNER_COLUMNS: &str = "id, name, address, photo, birthday, is_active, created_at, updated_at";

/// Database row for an owner
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OwnerRow {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub photo: String,
    pub birthday: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OwnerRow> for Owner {
    fn from(row: OwnerRow) -> Self {
        Owner {
            id: OwnerId::new(row.id),
            name: row.name,
            address: row.address,
            photo: row.photo,
            birthday: row.birthday,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OwnerRepository {
    pool: PgPool,
}

impl OwnerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active owners ordered by id
    pub async fn list_active(&self) -> Result<Vec<OwnerRow>, DatabaseError> {
        let sql = format!("SELECT {OWNER_COLUMNS} FROM owners WHERE is_active ORDER BY id");
        Ok(sqlx::query_as::<_, OwnerRow>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn find_active(&self, id: i64) -> Result<Option<OwnerRow>, DatabaseError> {
        let sql = format!("SELECT {OWNER_COLUMNS} FROM owners WHERE id = $1 AND is_active");
        Ok(sqlx::query_as::<_, OwnerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Returns false when no active owner has the id
    pub async fn update_photo(&self, id: i64, photo: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE owners SET photo = $2, updated_at = now() WHERE id = $1 AND is_active",
        )
        .bind(id)
        .bind(photo)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Loads an owner and locks its row until the transaction ends
    pub async fn lock(conn: &mut PgConnection, id: i64) -> Result<Option<OwnerRow>, DatabaseError> {
        let sql = format!("SELECT {OWNER_COLUMNS} FROM owners WHERE id = $1 FOR UPDATE");
        Ok(sqlx::query_as::<_, OwnerRow>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?)
    }

    /// Reserves the next id from the owners sequence
    pub async fn next_id(conn: &mut PgConnection) -> Result<i64, DatabaseError> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT nextval(pg_get_serial_sequence('owners', 'id'))")
            .fetch_one(conn)
            .await?)
    }

    /// Inserts an owner under its own id and moves the sequence past it
    pub async fn insert(conn: &mut PgConnection, owner: &Owner) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO owners (id, name, address, photo, birthday, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(owner.id.value())
        .bind(&owner.name)
        .bind(&owner.address)
        .bind(&owner.photo)
        .bind(owner.birthday)
        .bind(owner.is_active)
        .bind(owner.created_at)
        .bind(owner.updated_at)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            SELECT setval(pg_get_serial_sequence('owners', 'id'),
                          GREATEST($1, (SELECT last_value FROM owners_id_seq)))
            "#,
        )
        .bind(owner.id.value())
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn update(conn: &mut PgConnection, owner: &Owner) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE owners
            SET name = $2, address = $3, photo = $4, birthday = $5, is_active = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(owner.id.value())
        .bind(&owner.name)
        .bind(&owner.address)
        .bind(&owner.photo)
        .bind(owner.birthday)
        .bind(owner.is_active)
        .bind(owner.updated_at)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Owner", owner.id));
        }
        Ok(())
    }
}
