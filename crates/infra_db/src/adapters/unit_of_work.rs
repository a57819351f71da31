//! Transaction-scoped unit of work on PostgreSQL
//!
//! Rows loaded here are taken with `SELECT ... FOR UPDATE`, so concurrent
//! sales of the same property queue behind each other instead of losing
//! updates. Dropping the unit of work without committing rolls back.

use async_trait::async_trait;
use core_kernel::{OwnerId, PortError, PropertyId};
use domain_property::ports::UnitOfWork;
use domain_property::{EntityState, NewPropertyTrace, Owner, Property, PropertyTrace, Tracked};
use sqlx::{Postgres, Transaction};
use tracing::{debug, instrument};

use crate::error::DatabaseError;
use crate::repositories::{OwnerRepository, PropertyRepository, TraceRepository};

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl PgUnitOfWork {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }
}

impl std::fmt::Debug for PgUnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgUnitOfWork").finish_non_exhaustive()
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    #[instrument(skip(self), fields(owner_id = %id))]
    async fn find_owner(&mut self, id: OwnerId) -> Result<Option<Tracked<Owner>>, PortError> {
        let row = OwnerRepository::lock(&mut self.tx, id.value()).await?;
        Ok(row.map(|row| Tracked::loaded(row.into())))
    }

    #[instrument(skip(self), fields(property_id = %id))]
    async fn find_property(
        &mut self,
        id: PropertyId,
    ) -> Result<Option<Tracked<Property>>, PortError> {
        let row = PropertyRepository::lock(&mut self.tx, id.value()).await?;
        Ok(row.map(|row| Tracked::loaded(row.into())))
    }

    async fn next_owner_id(&mut self) -> Result<OwnerId, PortError> {
        Ok(OwnerId::new(OwnerRepository::next_id(&mut self.tx).await?))
    }

    async fn next_property_id(&mut self) -> Result<PropertyId, PortError> {
        Ok(PropertyId::new(PropertyRepository::next_id(&mut self.tx).await?))
    }

    async fn code_in_use(
        &mut self,
        code: &str,
        excluding: Option<PropertyId>,
    ) -> Result<bool, PortError> {
        let excluding = excluding.map(|id| id.value());
        Ok(PropertyRepository::code_in_use(&mut self.tx, code, excluding).await?)
    }

    #[instrument(skip(self, owner), fields(owner_id = %owner.id, state = ?owner.state()))]
    async fn save_owner(&mut self, owner: &mut Tracked<Owner>) -> Result<(), PortError> {
        match owner.state() {
            EntityState::New => match OwnerRepository::insert(&mut self.tx, owner).await {
                Err(DatabaseError::DuplicateEntry(_)) => {
                    return Err(PortError::conflict(format!("Owner with ID {} already exists", owner.id)));
                }
                result => result?,
            },
            EntityState::Dirty => OwnerRepository::update(&mut self.tx, owner).await?,
            EntityState::Loaded => return Ok(()),
        }
        owner.mark_saved();
        debug!("Owner saved");
        Ok(())
    }

    #[instrument(skip(self, property), fields(property_id = %property.id, state = ?property.state()))]
    async fn save_property(&mut self, property: &mut Tracked<Property>) -> Result<(), PortError> {
        let saved = match property.state() {
            EntityState::New => PropertyRepository::insert(&mut self.tx, property).await,
            EntityState::Dirty => PropertyRepository::update(&mut self.tx, property).await,
            EntityState::Loaded => return Ok(()),
        };
        match saved {
            Err(DatabaseError::DuplicateEntry(_)) => {
                return Err(PortError::conflict(format!(
                    "Property with code '{}' already exists",
                    property.code_internal
                )));
            }
            result => result?,
        }
        property.mark_saved();
        debug!("Property saved");
        Ok(())
    }

    #[instrument(skip(self, trace), fields(property_id = %trace.property_id))]
    async fn append_trace(&mut self, trace: NewPropertyTrace) -> Result<PropertyTrace, PortError> {
        Ok(TraceRepository::append(&mut self.tx, &trace).await?.into())
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        self.tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), PortError> {
        self.tx.rollback().await.map_err(DatabaseError::from)?;
        Ok(())
    }
}
