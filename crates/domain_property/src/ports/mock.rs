//! In-memory implementations of the property ports
//!
//! [`MockPropertyStore`] implements every repository and the transaction
//! manager over one shared state. Units of work stage their writes and merge
//! them on commit; properties read through a unit of work stay locked until
//! it ends, like `SELECT ... FOR UPDATE`.
//!
//! Failures can be injected to exercise the rollback and retry paths.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use core_kernel::PropertyTraceId;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::*;
use crate::tracking::EntityState;
use crate::views::{newest_first, ImageFlag, ImageView, OwnedProperty, OwnerView, TraceView};

#[derive(Debug, Default)]
struct MockState {
    owners: BTreeMap<OwnerId, Owner>,
    properties: BTreeMap<PropertyId, Property>,
    images: BTreeMap<PropertyImageId, PropertyImage>,
    traces: Vec<PropertyTrace>,
}

impl MockState {
    fn traces_for(&self, property_id: PropertyId) -> Vec<TraceView> {
        let mut traces: Vec<TraceView> = self
            .traces
            .iter()
            .filter(|t| t.property_id == property_id)
            .map(TraceView::from)
            .collect();
        newest_first(&mut traces);
        traces
    }

    fn images_for(&self, property_id: PropertyId) -> impl Iterator<Item = &PropertyImage> {
        self.images
            .values()
            .filter(move |image| image.property_id == property_id)
    }
}

#[derive(Debug, Default)]
struct Shared {
    state: RwLock<MockState>,
    row_locks: Mutex<HashMap<PropertyId, Arc<Mutex<()>>>>,
    next_owner: AtomicI64,
    next_property: AtomicI64,
    next_image: AtomicI64,
    next_trace: AtomicI64,
    failing_commits: AtomicU32,
    failing_trace_appends: AtomicBool,
    commits: AtomicU32,
    rollbacks: AtomicU32,
}

fn next_id(counter: &AtomicI64) -> i64 {
    counter.fetch_add(1, Ordering::SeqCst) + 1
}

fn reserve(counter: &AtomicI64, id: i64) {
    counter.fetch_max(id, Ordering::SeqCst);
}

/// In-memory store implementing every property port
#[derive(Debug, Clone, Default)]
pub struct MockPropertyStore {
    shared: Arc<Shared>,
}

impl MockPropertyStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates an owner
    pub async fn insert_owner(&self, owner: Owner) {
        reserve(&self.shared.next_owner, owner.id.value());
        self.shared.state.write().await.owners.insert(owner.id, owner);
    }

    /// Pre-populates a property
    pub async fn insert_property(&self, property: Property) {
        reserve(&self.shared.next_property, property.id.value());
        self.shared
            .state
            .write()
            .await
            .properties
            .insert(property.id, property);
    }

    /// Pre-populates an image
    pub async fn insert_image(&self, image: PropertyImage) {
        reserve(&self.shared.next_image, image.id.value());
        self.shared.state.write().await.images.insert(image.id, image);
    }

    /// Committed state of an owner
    pub async fn owner(&self, id: OwnerId) -> Option<Owner> {
        self.shared.state.read().await.owners.get(&id).cloned()
    }

    /// Committed state of a property, active or not
    pub async fn property(&self, id: PropertyId) -> Option<Property> {
        self.shared.state.read().await.properties.get(&id).cloned()
    }

    /// Committed state of an image, active or not
    pub async fn image(&self, id: PropertyImageId) -> Option<PropertyImage> {
        self.shared.state.read().await.images.get(&id).cloned()
    }

    /// Committed traces of a property in insertion order
    pub async fn traces_for(&self, property_id: PropertyId) -> Vec<PropertyTrace> {
        self.shared
            .state
            .read()
            .await
            .traces
            .iter()
            .filter(|t| t.property_id == property_id)
            .cloned()
            .collect()
    }

    /// Number of owners stored
    pub async fn owner_count(&self) -> usize {
        self.shared.state.read().await.owners.len()
    }

    /// Makes the next `count` commits fail with a connection error
    pub fn fail_next_commits(&self, count: u32) {
        self.shared.failing_commits.store(count, Ordering::SeqCst);
    }

    /// Makes every trace append fail until switched off
    pub fn fail_trace_appends(&self, fail: bool) {
        self.shared.failing_trace_appends.store(fail, Ordering::SeqCst);
    }

    /// Successful commits so far
    pub fn commit_count(&self) -> u32 {
        self.shared.commits.load(Ordering::SeqCst)
    }

    /// Explicit rollbacks so far
    pub fn rollback_count(&self) -> u32 {
        self.shared.rollbacks.load(Ordering::SeqCst)
    }

    fn list_item(state: &MockState, property: &Property) -> PropertyListItem {
        let last_trace = state
            .traces
            .iter()
            .filter(|t| t.property_id == property.id)
            .max_by(|a, b| a.date_sale.cmp(&b.date_sale).then(a.id.cmp(&b.id)))
            .map(TraceView::from);

        PropertyListItem {
            id: property.id,
            name: property.name.clone(),
            address: property.address.clone(),
            price: property.price,
            year: property.year,
            code_internal: property.code_internal.clone(),
            owner_name: state.owners.get(&property.owner_id).map(|o| o.name.clone()),
            image_count: state.images_for(property.id).filter(|i| i.is_active).count() as u32,
            last_trace,
        }
    }
}

impl DomainPort for MockPropertyStore {}

#[async_trait]
impl HealthCheckable for MockPropertyStore {
    async fn health_check(&self) -> core_kernel::HealthCheckResult {
        core_kernel::HealthCheckResult::healthy("mock-property-store", 0)
    }
}

#[async_trait]
impl OwnerRepository for MockPropertyStore {
    async fn list_with_properties(&self) -> Result<Vec<OwnerSummary>, PortError> {
        let state = self.shared.state.read().await;
        Ok(state
            .owners
            .values()
            .filter(|owner| owner.is_active)
            .map(|owner| OwnerSummary {
                owner: OwnerView::from(owner),
                properties: state
                    .properties
                    .values()
                    .filter(|p| p.is_active && p.owner_id == owner.id)
                    .map(Into::into)
                    .collect(),
            })
            .collect())
    }

    async fn find_details(&self, id: OwnerId) -> Result<Option<OwnerDetails>, PortError> {
        let state = self.shared.state.read().await;
        let Some(owner) = state.owners.get(&id).filter(|o| o.is_active) else {
            return Ok(None);
        };

        let properties = state
            .properties
            .values()
            .filter(|p| p.is_active && p.owner_id == id)
            .map(|p| OwnedProperty {
                property: p.into(),
                traces: state.traces_for(p.id),
                images: state.images_for(p.id).map(ImageFlag::from).collect(),
            })
            .collect();

        Ok(Some(OwnerDetails {
            owner: OwnerView::from(owner),
            properties,
        }))
    }

    async fn update_photo(&self, id: OwnerId, photo: &str) -> Result<bool, PortError> {
        let mut state = self.shared.state.write().await;
        match state.owners.get_mut(&id).filter(|o| o.is_active) {
            Some(owner) => {
                owner.photo = photo.to_string();
                owner.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl PropertyRepository for MockPropertyStore {
    async fn find_by_id(&self, id: PropertyId) -> Result<Option<Property>, PortError> {
        let state = self.shared.state.read().await;
        Ok(state.properties.get(&id).filter(|p| p.is_active).cloned())
    }

    async fn find_details(&self, id: PropertyId) -> Result<Option<PropertyDetails>, PortError> {
        let state = self.shared.state.read().await;
        let Some(property) = state.properties.get(&id).filter(|p| p.is_active) else {
            return Ok(None);
        };

        Ok(Some(PropertyDetails {
            property: property.into(),
            owner: state.owners.get(&property.owner_id).map(OwnerView::from),
            images: state
                .images_for(id)
                .filter(|i| i.is_active)
                .map(ImageView::from)
                .collect(),
            traces: state.traces_for(id),
        }))
    }

    async fn search(
        &self,
        filter: &PropertyFilter,
    ) -> Result<(Vec<PropertyListItem>, u64), PortError> {
        let state = self.shared.state.read().await;
        let matching: Vec<&Property> = state
            .properties
            .values()
            .filter(|p| filter.matches(p))
            .collect();
        let total = matching.len() as u64;

        let page = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.page_size as usize)
            .map(|p| Self::list_item(&state, p))
            .collect();

        Ok((page, total))
    }
}

#[async_trait]
impl PropertyImageRepository for MockPropertyStore {
    async fn find_active(&self, id: PropertyImageId) -> Result<Option<PropertyImage>, PortError> {
        let state = self.shared.state.read().await;
        Ok(state.images.get(&id).filter(|i| i.is_active).cloned())
    }

    async fn add(&self, property_id: PropertyId, file: String) -> Result<PropertyImage, PortError> {
        let mut state = self.shared.state.write().await;
        if !state.properties.contains_key(&property_id) {
            return Err(PortError::not_found("Property", property_id));
        }

        let now = Utc::now();
        let image = PropertyImage {
            id: PropertyImageId::new(next_id(&self.shared.next_image)),
            property_id,
            file,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.images.insert(image.id, image.clone());
        Ok(image)
    }

    async fn deactivate(&self, id: PropertyImageId) -> Result<Option<PropertyImage>, PortError> {
        let mut state = self.shared.state.write().await;
        match state.images.get_mut(&id).filter(|i| i.is_active) {
            Some(image) => {
                image.is_active = false;
                image.updated_at = Utc::now();
                Ok(Some(image.clone()))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl TransactionManager for MockPropertyStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, PortError> {
        Ok(Box::new(MockUnitOfWork {
            shared: Arc::clone(&self.shared),
            owners: BTreeMap::new(),
            properties: BTreeMap::new(),
            traces: Vec::new(),
            locked: HashSet::new(),
            guards: Vec::new(),
        }))
    }
}

/// Unit of work staging writes over [`MockPropertyStore`]
pub struct MockUnitOfWork {
    shared: Arc<Shared>,
    owners: BTreeMap<OwnerId, Owner>,
    properties: BTreeMap<PropertyId, Property>,
    traces: Vec<PropertyTrace>,
    locked: HashSet<PropertyId>,
    guards: Vec<OwnedMutexGuard<()>>,
}

impl MockUnitOfWork {
    async fn lock_property(&mut self, id: PropertyId) {
        if !self.locked.insert(id) {
            return;
        }
        let row = {
            let mut locks = self.shared.row_locks.lock().await;
            Arc::clone(locks.entry(id).or_default())
        };
        self.guards.push(row.lock_owned().await);
    }

    async fn owner_exists(&self, id: OwnerId) -> bool {
        self.owners.contains_key(&id) || self.shared.state.read().await.owners.contains_key(&id)
    }
}

#[async_trait]
impl UnitOfWork for MockUnitOfWork {
    async fn find_owner(&mut self, id: OwnerId) -> Result<Option<Tracked<Owner>>, PortError> {
        if let Some(owner) = self.owners.get(&id) {
            return Ok(Some(Tracked::loaded(owner.clone())));
        }
        let state = self.shared.state.read().await;
        Ok(state.owners.get(&id).cloned().map(Tracked::loaded))
    }

    async fn find_property(
        &mut self,
        id: PropertyId,
    ) -> Result<Option<Tracked<Property>>, PortError> {
        self.lock_property(id).await;
        if let Some(property) = self.properties.get(&id) {
            return Ok(Some(property.clone()).filter(|p| p.is_active).map(Tracked::loaded));
        }
        let state = self.shared.state.read().await;
        Ok(state
            .properties
            .get(&id)
            .filter(|p| p.is_active)
            .cloned()
            .map(Tracked::loaded))
    }

    async fn next_owner_id(&mut self) -> Result<OwnerId, PortError> {
        Ok(OwnerId::new(next_id(&self.shared.next_owner)))
    }

    async fn next_property_id(&mut self) -> Result<PropertyId, PortError> {
        Ok(PropertyId::new(next_id(&self.shared.next_property)))
    }

    async fn code_in_use(
        &mut self,
        code: &str,
        excluding: Option<PropertyId>,
    ) -> Result<bool, PortError> {
        let staged = self
            .properties
            .values()
            .any(|p| p.is_active && p.code_internal == code && Some(p.id) != excluding);
        if staged {
            return Ok(true);
        }
        let state = self.shared.state.read().await;
        Ok(state.properties.values().any(|p| {
            p.code_internal == code
                && p.is_active
                && Some(p.id) != excluding
                && !self.properties.contains_key(&p.id)
        }))
    }

    async fn save_owner(&mut self, owner: &mut Tracked<Owner>) -> Result<(), PortError> {
        match owner.state() {
            EntityState::Loaded => return Ok(()),
            EntityState::New => {
                if self.owner_exists(owner.id).await {
                    return Err(PortError::conflict(format!(
                        "Owner with ID {} already exists",
                        owner.id
                    )));
                }
                reserve(&self.shared.next_owner, owner.id.value());
            }
            EntityState::Dirty => {}
        }
        self.owners.insert(owner.id, (**owner).clone());
        owner.mark_saved();
        Ok(())
    }

    async fn save_property(&mut self, property: &mut Tracked<Property>) -> Result<(), PortError> {
        if !property.needs_save() {
            return Ok(());
        }
        if self
            .code_in_use(&property.code_internal, Some(property.id))
            .await?
        {
            return Err(PortError::conflict(format!(
                "Property with code '{}' already exists",
                property.code_internal
            )));
        }
        if property.state() == EntityState::New {
            reserve(&self.shared.next_property, property.id.value());
        }
        self.properties.insert(property.id, (**property).clone());
        property.mark_saved();
        Ok(())
    }

    async fn append_trace(&mut self, trace: NewPropertyTrace) -> Result<PropertyTrace, PortError> {
        if self.shared.failing_trace_appends.load(Ordering::SeqCst) {
            return Err(PortError::internal("simulated trace insert failure"));
        }
        let id = PropertyTraceId::new(next_id(&self.shared.next_trace));
        let stored = trace.into_trace(id, Utc::now());
        self.traces.push(stored.clone());
        Ok(stored)
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        let this = *self;
        let failing = this
            .shared
            .failing_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(PortError::connection("simulated connection reset"));
        }

        let mut state = this.shared.state.write().await;
        state.owners.extend(this.owners);
        state.properties.extend(this.properties);
        state.traces.extend(this.traces);
        drop(state);

        this.shared.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), PortError> {
        self.shared.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
