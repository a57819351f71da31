//! Wiring shared by every handler

use std::sync::Arc;

use core_kernel::{CacheStore, RetryPolicy};

use crate::caching::{self, CachePolicies, CacheTag};
use crate::commands::{
    CreateOwner, CreateOwnerHandler, CreateProperty, CreatePropertyHandler, CreatePropertyImages,
    CreatePropertyImagesHandler, DeletePropertyImage, DeletePropertyImageHandler, SellProperty,
    SellPropertyHandler, UpdateOwnerPhoto, UpdateOwnerPhotoHandler, UpdateProperty,
    UpdatePropertyHandler,
};
use crate::dispatcher::Dispatcher;
use crate::ports::{
    OwnerRepository, PropertyImageRepository, PropertyRepository, TransactionManager,
};
use crate::queries::{
    GetAllOwners, GetAllOwnersHandler, GetOwnerById, GetOwnerByIdHandler, GetPropertyById,
    GetPropertyByIdHandler, GetPropertyImage, GetPropertyImageHandler, ListProperties,
    ListPropertiesHandler,
};

/// Ports, cache and policies the use cases run against
#[derive(Clone)]
pub struct PropertyContext {
    pub owners: Arc<dyn OwnerRepository>,
    pub properties: Arc<dyn PropertyRepository>,
    pub images: Arc<dyn PropertyImageRepository>,
    pub transactions: Arc<dyn TransactionManager>,
    pub cache: Arc<dyn CacheStore>,
    pub policies: CachePolicies,
    /// Applied to property updates; sales always run once
    pub update_retry: RetryPolicy,
}

impl PropertyContext {
    pub fn new(
        owners: Arc<dyn OwnerRepository>,
        properties: Arc<dyn PropertyRepository>,
        images: Arc<dyn PropertyImageRepository>,
        transactions: Arc<dyn TransactionManager>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            owners,
            properties,
            images,
            transactions,
            cache,
            policies: CachePolicies::default(),
            update_retry: RetryPolicy::default(),
        }
    }

    pub fn with_policies(mut self, policies: CachePolicies) -> Self {
        self.policies = policies;
        self
    }

    pub fn with_update_retry(mut self, policy: RetryPolicy) -> Self {
        self.update_retry = policy;
        self
    }

    /// Removes the cache entries covered by `tags`
    pub async fn invalidate(&self, tags: &[CacheTag]) {
        caching::invalidate(self.cache.as_ref(), tags).await;
    }

    /// Builds a dispatcher with every use case registered
    pub fn dispatcher(&self) -> Dispatcher {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register::<CreateOwner, _>(CreateOwnerHandler::new(self.clone()))
            .register::<UpdateOwnerPhoto, _>(UpdateOwnerPhotoHandler::new(self.clone()))
            .register::<CreateProperty, _>(CreatePropertyHandler::new(self.clone()))
            .register::<SellProperty, _>(SellPropertyHandler::new(self.clone()))
            .register::<UpdateProperty, _>(UpdatePropertyHandler::new(self.clone()))
            .register::<CreatePropertyImages, _>(CreatePropertyImagesHandler::new(self.clone()))
            .register::<DeletePropertyImage, _>(DeletePropertyImageHandler::new(self.clone()))
            .register::<GetAllOwners, _>(GetAllOwnersHandler::new(self.clone()))
            .register::<GetOwnerById, _>(GetOwnerByIdHandler::new(self.clone()))
            .register::<GetPropertyById, _>(GetPropertyByIdHandler::new(self.clone()))
            .register::<ListProperties, _>(ListPropertiesHandler::new(self.clone()))
            .register::<GetPropertyImage, _>(GetPropertyImageHandler::new(self.clone()));
        dispatcher
    }
}

#[cfg(any(test, feature = "mock"))]
impl PropertyContext {
    /// A context backed entirely by one in-memory store
    pub fn in_memory(
        store: crate::ports::mock::MockPropertyStore,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        let shared = Arc::new(store);
        Self::new(shared.clone(), shared.clone(), shared.clone(), shared, cache)
    }
}

impl std::fmt::Debug for PropertyContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyContext")
            .field("policies", &self.policies)
            .field("update_retry", &self.update_retry)
            .finish_non_exhaustive()
    }
}
