//! Request dispatcher
//!
//! Each use case is a [`Request`] type with exactly one
//! [`RequestHandler`]. The HTTP layer only knows the [`Dispatcher`] and the
//! request types, so handlers can be swapped (for instance in tests)
//! without touching the routes.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info_span, Instrument};

use crate::error::PropertyError;

/// A use case input that declares its output
pub trait Request: Send + 'static {
    type Response: Send + 'static;
}

/// Handles one request type
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync + 'static {
    async fn handle(&self, request: R) -> Result<R::Response, PropertyError>;
}

/// Routes requests to their registered handler
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler for `R`, replacing any previous one
    pub fn register<R, H>(&mut self, handler: H) -> &mut Self
    where
        R: Request,
        H: RequestHandler<R>,
    {
        let handler: Arc<dyn RequestHandler<R>> = Arc::new(handler);
        self.handlers.insert(TypeId::of::<R>(), Box::new(handler));
        self
    }

    /// Returns true when a handler for `R` is registered
    pub fn handles<R: Request>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<R>())
    }

    /// Sends a request to its handler
    pub async fn send<R: Request>(&self, request: R) -> Result<R::Response, PropertyError> {
        let handler = self
            .handlers
            .get(&TypeId::of::<R>())
            .and_then(|h| h.downcast_ref::<Arc<dyn RequestHandler<R>>>())
            .cloned()
            .ok_or_else(|| {
                PropertyError::operation_failed(format!(
                    "No handler registered for {}",
                    type_name::<R>()
                ))
            })?;

        let span = info_span!("dispatch", request = short_name::<R>());
        handler.handle(request).instrument(span).await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

fn short_name<R>() -> &'static str {
    let full = type_name::<R>();
    full.rsplit("::").next().unwrap_or(full)
}
