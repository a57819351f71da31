//! Property repository

use chrono::{DateTime, Utc};
use core_kernel::{OwnerId, PropertyId, PropertyTraceId};
use domain_property::views::{PropertyListItem, TraceView};
use domain_property::{Property, PropertyFilter};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::error::DatabaseError;

const PROPERTY_COLUMNS: &str =
    "id, name, address, price, code_internal, year, owner_id, is_active, created_at, updated_at";

/// Database row for a property
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PropertyRow {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub price: Decimal,
    pub code_internal: String,
    pub year: i32,
    pub owner_id: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PropertyRow> for Property {
    fn from(row: PropertyRow) -> Self {
        Property {
            id: PropertyId::new(row.id),
            name: row.name,
            address: row.address,
            price: row.price,
            code_internal: row.code_internal,
            year: row.year,
            owner_id: OwnerId::new(row.owner_id),
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// One listing row with its owner's name, image count and latest trace
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PropertyListRow {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub price: Decimal,
    pub year: i32,
    pub code_internal: String,
    pub owner_name: Option<String>,
    pub image_count: i64,
    pub trace_id: Option<i64>,
    pub trace_name: Option<String>,
    pub trace_date: Option<DateTime<Utc>>,
    pub trace_value: Option<Decimal>,
    pub trace_tax: Option<Decimal>,
}

impl From<PropertyListRow> for PropertyListItem {
    fn from(row: PropertyListRow) -> Self {
        let last_trace = match (row.trace_id, row.trace_name, row.trace_date) {
            (Some(id), Some(name), Some(date)) => Some(TraceView {
                id: PropertyTraceId::new(id),
                name,
                date,
                value: row.trace_value.unwrap_or_default(),
                tax: row.trace_tax.unwrap_or_default(),
            }),
            _ => None,
        };

        PropertyListItem {
            id: PropertyId::new(row.id),
            name: row.name,
            address: row.address,
            price: row.price,
            year: row.year,
            code_internal: row.code_internal,
            owner_name: row.owner_name,
            image_count: u32::try_from(row.image_count).unwrap_or(u32::MAX),
            last_trace,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PropertyRepository {
    pool: PgPool,
}

impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_active(&self, id: i64) -> Result<Option<PropertyRow>, DatabaseError> {
        let sql = format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1 AND is_active");
        Ok(sqlx::query_as::<_, PropertyRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Active properties ordered by id, optionally for one owner
    pub async fn list_active(
        &self,
        owner_id: Option<i64>,
    ) -> Result<Vec<PropertyRow>, DatabaseError> {
        let sql = format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties \
             WHERE is_active AND ($1::BIGINT IS NULL OR owner_id = $1) ORDER BY id"
        );
        Ok(sqlx::query_as::<_, PropertyRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// One page of active properties matching the filter, and the total count
    pub async fn search(
        &self,
        filter: &PropertyFilter,
    ) -> Result<(Vec<PropertyListRow>, i64), DatabaseError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM properties p WHERE p.is_active");
        push_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut page = QueryBuilder::<Postgres>::new(
            r#"
            SELECT p.id, p.name, p.address, p.price, p.year, p.code_internal,
                   o.name AS owner_name,
                   (SELECT COUNT(*) FROM property_images i
                     WHERE i.property_id = p.id AND i.is_active) AS image_count,
                   t.id AS trace_id, t.name AS trace_name, t.date_sale AS trace_date,
                   t.value AS trace_value, t.tax AS trace_tax
            FROM properties p
            LEFT JOIN owners o ON o.id = p.owner_id
            LEFT JOIN LATERAL (
                SELECT id, name, date_sale, value, tax
                FROM property_traces
                WHERE property_id = p.id
                ORDER BY date_sale DESC, id DESC
                LIMIT 1
            ) t ON TRUE
            WHERE p.is_active
            "#,
        );
        push_filter(&mut page, filter);
        page.push(" ORDER BY p.id LIMIT ")
            .push_bind(i64::from(filter.page_size))
            .push(" OFFSET ")
            .push_bind(i64::try_from(filter.offset()).unwrap_or(i64::MAX));

        let rows = page.build_query_as::<PropertyListRow>().fetch_all(&self.pool).await?;
        Ok((rows, total))
    }

    /// Loads an active property and locks its row until the transaction ends
    pub async fn lock(
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<PropertyRow>, DatabaseError> {
        let sql = format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1 AND is_active FOR UPDATE"
        );
        Ok(sqlx::query_as::<_, PropertyRow>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?)
    }

    pub async fn next_id(conn: &mut PgConnection) -> Result<i64, DatabaseError> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT nextval(pg_get_serial_sequence('properties', 'id'))")
            .fetch_one(conn)
            .await?)
    }

    pub async fn code_in_use(
        conn: &mut PgConnection,
        code: &str,
        excluding: Option<i64>,
    ) -> Result<bool, DatabaseError> {
        Ok(sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM properties
                WHERE code_internal = $1 AND is_active AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(code)
        .bind(excluding)
        .fetch_one(conn)
        .await?)
    }

    pub async fn insert(conn: &mut PgConnection, property: &Property) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO properties
                (id, name, address, price, code_internal, year, owner_id, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(property.id.value())
        .bind(&property.name)
        .bind(&property.address)
        .bind(property.price)
        .bind(&property.code_internal)
        .bind(property.year)
        .bind(property.owner_id.value())
        .bind(property.is_active)
        .bind(property.created_at)
        .bind(property.updated_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn update(conn: &mut PgConnection, property: &Property) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE properties
            SET name = $2, address = $3, price = $4, code_internal = $5, year = $6,
                owner_id = $7, is_active = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(property.id.value())
        .bind(&property.name)
        .bind(&property.address)
        .bind(property.price)
        .bind(&property.code_internal)
        .bind(property.year)
        .bind(property.owner_id.value())
        .bind(property.is_active)
        .bind(property.updated_at)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Property", property.id));
        }
        Ok(())
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &PropertyFilter) {
    if let Some(name) = &filter.name {
        query
            .push(" AND POSITION(LOWER(")
            .push_bind(name.clone())
            .push(") IN LOWER(p.name)) > 0");
    }
    if let Some(min) = filter.min_price {
        query.push(" AND p.price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        query.push(" AND p.price <= ").push_bind(max);
    }
    if let Some(year) = filter.year {
        query.push(" AND p.year = ").push_bind(year);
    }
    if let Some(owner) = filter.owner_id {
        query.push(" AND p.owner_id = ").push_bind(owner.value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_filter_sql_binds_every_criterion() {
        let filter = PropertyFilter {
            name: Some("casa".to_string()),
            min_price: Some(dec!(10)),
            max_price: Some(dec!(20)),
            year: Some(2000),
            owner_id: Some(OwnerId::new(3)),
            ..PropertyFilter::page(1, 10)
        };
        let mut query = QueryBuilder::<Postgres>::new("SELECT 1 FROM properties p WHERE p.is_active");
        push_filter(&mut query, &filter);

        let sql = query.sql();
        assert!(sql.contains("POSITION(LOWER($1) IN LOWER(p.name)) > 0"));
        assert!(sql.contains("p.price >= $2"));
        assert!(sql.contains("p.price <= $3"));
        assert!(sql.contains("p.year = $4"));
        assert!(sql.contains("p.owner_id = $5"));
    }

    #[test]
    fn test_list_row_without_trace() {
        let row = PropertyListRow {
            id: 1,
            name: "Casa".to_string(),
            address: "Calle 1".to_string(),
            price: dec!(100),
            year: 2000,
            code_internal: "C-1".to_string(),
            owner_name: None,
            image_count: 2,
            trace_id: None,
            trace_name: None,
            trace_date: None,
            trace_value: None,
            trace_tax: None,
        };
        let item = PropertyListItem::from(row);
        assert_eq!(item.image_count, 2);
        assert!(item.last_trace.is_none());
    }
}
