//! Running work inside a unit of work
//!
//! [`execute_in_transaction`] opens a unit of work, runs the closure,
//! commits on success and rolls back on failure. Transient storage faults
//! re-run the whole closure according to the [`RetryPolicy`], so the
//! closure must be safe to run more than once: clone inputs inside it
//! instead of moving them in.

use std::future::Future;
use std::pin::Pin;

use core_kernel::RetryPolicy;
use tracing::warn;

use crate::error::PropertyError;
use crate::ports::{TransactionManager, UnitOfWork};

/// Future returned by a unit-of-work closure
pub type WorkFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PropertyError>> + Send + 'a>>;

/// Runs `work` in a unit of work, retrying transient failures
pub async fn execute_in_transaction<T, F>(
    manager: &dyn TransactionManager,
    policy: RetryPolicy,
    mut work: F,
) -> Result<T, PropertyError>
where
    T: Send,
    F: for<'a> FnMut(&'a mut (dyn UnitOfWork + 'static)) -> WorkFuture<'a, T> + Send,
{
    let mut attempt = 1;
    loop {
        match run_once(manager, &mut work).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && policy.allows_retry_after(attempt) => {
                let delay = policy.delay_after(attempt);
                warn!(attempt, ?delay, error = %err, "Transient failure, retrying unit of work");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn run_once<T, F>(manager: &dyn TransactionManager, work: &mut F) -> Result<T, PropertyError>
where
    T: Send,
    F: for<'a> FnMut(&'a mut (dyn UnitOfWork + 'static)) -> WorkFuture<'a, T> + Send,
{
    let mut uow = manager.begin().await?;
    let outcome = work(uow.as_mut()).await;
    match outcome {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::MockPropertyStore;
    use crate::property::{NewProperty, Property};
    use crate::tracking::Tracked;
    use chrono::Utc;
    use core_kernel::{OwnerId, PropertyId};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn new_property(id: i64, code: &str) -> Property {
        Property::create(
            PropertyId::new(id),
            NewProperty {
                name: "Casa".to_string(),
                address: "Calle 1".to_string(),
                price: dec!(100),
                code_internal: code.to_string(),
                year: 2000,
                owner_id: OwnerId::new(1),
            },
            Utc::now(),
        )
        .0
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_commits_on_success() {
        let store = MockPropertyStore::new();

        let id = execute_in_transaction(&store, RetryPolicy::none(), |uow| {
            Box::pin(async move {
                let mut property = Tracked::new(new_property(1, "A-1"));
                uow.save_property(&mut property).await?;
                Ok::<_, PropertyError>(property.id)
            })
        })
        .await
        .unwrap();

        assert_eq!(store.property(id).await.map(|p| p.code_internal), Some("A-1".to_string()));
        assert_eq!(store.commit_count(), 1);
    }

    #[tokio::test]
    async fn test_rolls_back_on_error() {
        let store = MockPropertyStore::new();

        let result: Result<(), PropertyError> =
            execute_in_transaction(&store, fast_retry(), |uow| {
                Box::pin(async move {
                    let mut property = Tracked::new(new_property(1, "A-1"));
                    uow.save_property(&mut property).await?;
                    Err::<(), _>(PropertyError::invalid_operation("stop"))
                })
            })
            .await;

        assert!(result.is_err());
        assert!(store.property(PropertyId::new(1)).await.is_none());
        assert_eq!(store.rollback_count(), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_commit_failures() {
        let store = MockPropertyStore::new();
        store.fail_next_commits(2);
        let mut runs = 0;

        execute_in_transaction(&store, fast_retry(), |uow| {
            runs += 1;
            Box::pin(async move {
                let mut property = Tracked::new(new_property(7, "R-7"));
                uow.save_property(&mut property).await?;
                Ok::<_, PropertyError>(())
            })
        })
        .await
        .unwrap();

        assert_eq!(runs, 3);
        assert!(store.property(PropertyId::new(7)).await.is_some());
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let store = MockPropertyStore::new();
        store.fail_next_commits(5);

        let result = execute_in_transaction(&store, fast_retry(), |uow| {
            Box::pin(async move {
                let mut property = Tracked::new(new_property(8, "R-8"));
                uow.save_property(&mut property).await?;
                Ok::<_, PropertyError>(())
            })
        })
        .await;

        assert!(result.unwrap_err().is_transient());
        assert_eq!(store.commit_count(), 0);
    }
}
