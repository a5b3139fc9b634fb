//! Resource reconcilers
//!
//! One reconciler per managed resource type. Each holds a shared handle to
//! the client configured for the provider session and maps the canonical
//! model onto platform calls.

mod disk;
mod floating_ip;
mod network;
mod virtual_machine;

pub use disk::DiskReconciler;
pub use floating_ip::FloatingIpReconciler;
pub use network::NetworkReconciler;
pub use virtual_machine::VirtualMachineReconciler;

use std::future::Future;
use warren_cloud::{ResourceKind, Result};

/// Primary object created during one create operation
///
/// Passed by `&mut` through the create chain. When a later step fails the
/// recorded identity is deleted again so no half-configured object is left
/// behind.
#[derive(Debug)]
pub struct CreateTransaction {
    kind: ResourceKind,
    created: Option<String>,
}

impl CreateTransaction {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            created: None,
        }
    }

    pub fn record(&mut self, id: impl Into<String>) {
        self.created = Some(id.into());
    }

    pub fn created(&self) -> Option<&str> {
        self.created.as_deref()
    }

    /// Finish the operation, running `cleanup` on the recorded identity if
    /// `result` is an error. Cleanup failures are logged and swallowed; the
    /// original error is returned.
    pub async fn settle<T, F, Fut>(self, result: Result<T>, cleanup: F) -> Result<T>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let err = match result {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if let Some(id) = self.created {
            let kind = self.kind;
            tracing::warn!("Create of {} {} failed, cleaning up: {}", kind, id, err);
            if let Err(cleanup_err) = cleanup(id.clone()).await {
                tracing::warn!("Cleanup of {} {} failed: {}", kind, id, cleanup_err);
            }
        }

        Err(err)
    }
}

/// Treat a missing object as already deleted
fn ignore_not_found(kind: ResourceKind, id: &str, result: Result<()>) -> Result<()> {
    match result {
        Err(err) if err.is_not_found() => {
            tracing::debug!("{} has already been deleted: {}", kind, id);
            Ok(())
        }
        other => other,
    }
}

/// Identity of a model that must exist remotely
fn require_id<'a>(kind: ResourceKind, id: Option<&'a str>) -> Result<&'a str> {
    id.filter(|id| !id.is_empty())
        .ok_or_else(|| warren_cloud::CloudError::InvalidConfig(format!("{} state has no id", kind)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use warren_cloud::CloudError;

    fn failure() -> CloudError {
        CloudError::Api {
            kind: ResourceKind::Disk,
            id: "d-1".to_string(),
            message: "[400] attach failed".to_string(),
        }
    }

    #[tokio::test]
    async fn test_settle_success_skips_cleanup() {
        let mut tx = CreateTransaction::new(ResourceKind::Disk);
        tx.record("d-1");

        let cleaned = Mutex::new(Vec::new());
        let result = tx
            .settle(Ok(7), |id| {
                cleaned.lock().unwrap().push(id);
                async { Ok(()) }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert!(cleaned.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_settle_failure_cleans_up_recorded_id() {
        let mut tx = CreateTransaction::new(ResourceKind::Disk);
        tx.record("d-1");
        assert_eq!(tx.created(), Some("d-1"));

        let cleaned = Mutex::new(Vec::new());
        let result: Result<()> = tx
            .settle(Err(failure()), |id| {
                cleaned.lock().unwrap().push(id);
                async { Err(CloudError::NotConfigured) }
            })
            .await;

        // The original error wins over the cleanup error
        assert!(result.unwrap_err().to_string().contains("attach failed"));
        assert_eq!(*cleaned.lock().unwrap(), vec!["d-1".to_string()]);
    }

    #[tokio::test]
    async fn test_settle_without_record() {
        let tx = CreateTransaction::new(ResourceKind::Disk);
        let cleaned = Mutex::new(0);
        let result: Result<()> = tx
            .settle(Err(failure()), |_| {
                *cleaned.lock().unwrap() += 1;
                async { Ok(()) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(*cleaned.lock().unwrap(), 0);
    }

    #[test]
    fn test_ignore_not_found() {
        let gone = Err(CloudError::NotFound {
            kind: ResourceKind::Network,
            id: "n-1".to_string(),
        });
        assert!(ignore_not_found(ResourceKind::Network, "n-1", gone).is_ok());
        assert!(ignore_not_found(ResourceKind::Network, "n-1", Err(failure())).is_err());
    }

    #[test]
    fn test_require_id() {
        assert_eq!(require_id(ResourceKind::Disk, Some("d-1")).unwrap(), "d-1");
        assert!(require_id(ResourceKind::Disk, Some("")).is_err());
        assert!(require_id(ResourceKind::Disk, None).is_err());
    }
}
