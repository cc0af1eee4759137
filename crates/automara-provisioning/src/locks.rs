//! Per-tenant async locks for provisioning critical sections.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

/// Lazily-created per-tenant locks.
///
/// Serializes activation's check-and-clone section for one tenant
/// within this process; the `(tenant_id, name)` unique index covers
/// concurrent processes.
#[derive(Default)]
pub(crate) struct TenantLocks {
    inner: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl TenantLocks {
    /// Acquire the lock for a tenant, creating it on first use.
    pub(crate) async fn acquire(&self, tenant_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().expect("tenant lock map poisoned");
            Arc::clone(map.entry(tenant_id).or_default())
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_tenant_waits_for_release() {
        let locks = TenantLocks::default();
        let tenant_id = Uuid::new_v4();

        let guard = locks.acquire(tenant_id).await;
        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.acquire(tenant_id));
        assert!(blocked.await.is_err());

        drop(guard);
        tokio::time::timeout(Duration::from_millis(50), locks.acquire(tenant_id))
            .await
            .expect("lock should be free after release");
    }

    #[tokio::test]
    async fn different_tenants_do_not_block() {
        let locks = TenantLocks::default();

        let _guard = locks.acquire(Uuid::new_v4()).await;
        tokio::time::timeout(Duration::from_millis(50), locks.acquire(Uuid::new_v4()))
            .await
            .expect("unrelated tenant should not block");
    }
}
