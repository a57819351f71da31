//! PostgreSQL adapter for the property ports

use std::collections::BTreeMap;

use async_trait::async_trait;
use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, OwnerId, PortError, PropertyId, PropertyImageId,
};
use domain_property::ports::{
    OwnerRepository as OwnerPort, PropertyFilter, PropertyImageRepository as ImagePort,
    PropertyRepository as PropertyPort, TransactionManager, UnitOfWork,
};
use domain_property::views::{
    ImageFlag, ImageView, OwnedProperty, OwnerDetails, OwnerSummary, OwnerView, PropertyDetails,
    PropertyListItem, TraceView,
};
use domain_property::{Owner, Property, PropertyImage, PropertyTrace};
use sqlx::PgPool;
use tracing::{debug, instrument};

use super::unit_of_work::PgUnitOfWork;
use crate::error::DatabaseError;
use crate::repositories::{ImageRepository, OwnerRepository, PropertyRepository, TraceRepository};

const ADAPTER_ID: &str = "postgres-property-adapter";

/// PostgreSQL-backed implementation of every property port
#[derive(Debug, Clone)]
pub struct PostgresPropertyAdapter {
    pool: PgPool,
    owners: OwnerRepository,
    properties: PropertyRepository,
    traces: TraceRepository,
    images: ImageRepository,
}

impl PostgresPropertyAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            owners: OwnerRepository::new(pool.clone()),
            properties: PropertyRepository::new(pool.clone()),
            traces: TraceRepository::new(pool.clone()),
            images: ImageRepository::new(pool.clone()),
            pool,
        }
    }

    /// Traces grouped by property, newest first
    async fn traces_by_property(
        &self,
        ids: &[i64],
    ) -> Result<BTreeMap<i64, Vec<TraceView>>, DatabaseError> {
        let mut grouped: BTreeMap<i64, Vec<TraceView>> = BTreeMap::new();
        for row in self.traces.for_properties(ids).await? {
            let property_id = row.property_id;
            let trace = PropertyTrace::from(row);
            grouped.entry(property_id).or_default().push(TraceView::from(&trace));
        }
        Ok(grouped)
    }

    async fn images_by_property(
        &self,
        ids: &[i64],
        active_only: bool,
    ) -> Result<BTreeMap<i64, Vec<PropertyImage>>, DatabaseError> {
        let mut grouped: BTreeMap<i64, Vec<PropertyImage>> = BTreeMap::new();
        for row in self.images.for_properties(ids, active_only).await? {
            grouped.entry(row.property_id).or_default().push(row.into());
        }
        Ok(grouped)
    }
}

impl DomainPort for PostgresPropertyAdapter {}

#[async_trait]
impl HealthCheckable for PostgresPropertyAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, ADAPTER_ID).await
    }
}

#[async_trait]
impl OwnerPort for PostgresPropertyAdapter {
    #[instrument(skip(self))]
    async fn list_with_properties(&self) -> Result<Vec<OwnerSummary>, PortError> {
        let owners = self.owners.list_active().await?;
        let mut by_owner: BTreeMap<i64, Vec<Property>> = BTreeMap::new();
        for row in self.properties.list_active(None).await? {
            by_owner.entry(row.owner_id).or_default().push(row.into());
        }

        debug!(owners = owners.len(), "Loaded owners");
        Ok(owners
            .into_iter()
            .map(|row| {
                let properties = by_owner.remove(&row.id).unwrap_or_default();
                let owner = Owner::from(row);
                OwnerSummary {
                    owner: OwnerView::from(&owner),
                    properties: properties.iter().map(Into::into).collect(),
                }
            })
            .collect())
    }

    #[instrument(skip(self), fields(owner_id = %id))]
    async fn find_details(&self, id: OwnerId) -> Result<Option<OwnerDetails>, PortError> {
        let Some(row) = self.owners.find_active(id.value()).await? else {
            return Ok(None);
        };
        let owner = Owner::from(row);

        let properties: Vec<Property> = self
            .properties
            .list_active(Some(id.value()))
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        let ids: Vec<i64> = properties.iter().map(|p| p.id.value()).collect();
        let mut traces = self.traces_by_property(&ids).await?;
        let mut images = self.images_by_property(&ids, false).await?;

        let properties = properties
            .iter()
            .map(|property| OwnedProperty {
                property: property.into(),
                traces: traces.remove(&property.id.value()).unwrap_or_default(),
                images: images
                    .remove(&property.id.value())
                    .unwrap_or_default()
                    .iter()
                    .map(ImageFlag::from)
                    .collect(),
            })
            .collect();

        Ok(Some(OwnerDetails {
            owner: OwnerView::from(&owner),
            properties,
        }))
    }

    #[instrument(skip(self, photo), fields(owner_id = %id))]
    async fn update_photo(&self, id: OwnerId, photo: &str) -> Result<bool, PortError> {
        Ok(self.owners.update_photo(id.value(), photo).await?)
    }
}

#[async_trait]
impl PropertyPort for PostgresPropertyAdapter {
    #[instrument(skip(self), fields(property_id = %id))]
    async fn find_by_id(&self, id: PropertyId) -> Result<Option<Property>, PortError> {
        Ok(self.properties.find_active(id.value()).await?.map(Into::into))
    }

    #[instrument(skip(self), fields(property_id = %id))]
    async fn find_details(&self, id: PropertyId) -> Result<Option<PropertyDetails>, PortError> {
        let Some(row) = self.properties.find_active(id.value()).await? else {
            return Ok(None);
        };
        let property = Property::from(row);
        let owner = self
            .owners
            .find_active(property.owner_id.value())
            .await?
            .map(Owner::from);

        let ids = [id.value()];
        let traces = self.traces_by_property(&ids).await?.remove(&id.value()).unwrap_or_default();
        let images = self
            .images_by_property(&ids, true)
            .await?
            .remove(&id.value())
            .unwrap_or_default();

        Ok(Some(PropertyDetails {
            property: (&property).into(),
            owner: owner.as_ref().map(OwnerView::from),
            images: images.iter().map(ImageView::from).collect(),
            traces,
        }))
    }

    #[instrument(skip(self, filter), fields(page = filter.page_number, size = filter.page_size))]
    async fn search(
        &self,
        filter: &PropertyFilter,
    ) -> Result<(Vec<PropertyListItem>, u64), PortError> {
        let (rows, total) = self.properties.search(filter).await?;
        let total = u64::try_from(total).map_err(|_| PortError::transformation("Negative row count"))?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }
}

#[async_trait]
impl ImagePort for PostgresPropertyAdapter {
    #[instrument(skip(self), fields(image_id = %id))]
    async fn find_active(&self, id: PropertyImageId) -> Result<Option<PropertyImage>, PortError> {
        Ok(self.images.find_active(id.value()).await?.map(Into::into))
    }

    #[instrument(skip(self, file), fields(property_id = %property_id, bytes = file.len()))]
    async fn add(&self, property_id: PropertyId, file: String) -> Result<PropertyImage, PortError> {
        match self.images.insert(property_id.value(), &file).await {
            Ok(row) => Ok(row.into()),
            Err(DatabaseError::ForeignKeyViolation(_)) => Err(PortError::not_found("Property", property_id)),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(image_id = %id))]
    async fn deactivate(&self, id: PropertyImageId) -> Result<Option<PropertyImage>, PortError> {
        Ok(self.images.deactivate(id.value()).await?.map(Into::into))
    }
}

#[async_trait]
impl TransactionManager for PostgresPropertyAdapter {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, PortError> {
        let tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        Ok(Box::new(PgUnitOfWork::new(tx)))
    }
}
