use super::types::InstanceRecord;
use log::debug;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// In-memory list of launched instances for one supervisor type.
///
/// Records are appended at launch and removed only by an explicit cleanup
/// call; there is no implicit expiry. Concurrent requests may race on
/// launch/cleanup, so every access goes through the internal mutex.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    records: Mutex<Vec<InstanceRecord>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    pub async fn insert(&self, record: InstanceRecord) {
        debug!("Registering session {}", record.session_id);
        self.records.lock().await.push(record);
    }

    pub async fn contains(&self, session_id: &Uuid) -> bool {
        self.records
            .lock()
            .await
            .iter()
            .any(|record| record.session_id == *session_id)
    }

    /// Identifiers of every registered session, in launch order.
    pub async fn session_ids(&self) -> Vec<Uuid> {
        self.records
            .lock()
            .await
            .iter()
            .map(|record| record.session_id)
            .collect()
    }

    /// Removes and returns the record for `session_id`, if registered.
    pub async fn remove(&self, session_id: &Uuid) -> Option<InstanceRecord> {
        let mut records = self.records.lock().await;
        let index = records
            .iter()
            .position(|record| record.session_id == *session_id)?;
        debug!("Removing session {} from registry", session_id);
        Some(records.remove(index))
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Locks the record list. The supervisor holds this guard while poking a
    /// child's stdin so a concurrent cleanup cannot pull the record away
    /// mid-interaction.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, Vec<InstanceRecord>> {
        self.records.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::PathBuf;

    fn record(session_id: Uuid) -> InstanceRecord {
        InstanceRecord {
            session_id,
            process_handle: None,
            stdout_log_path: PathBuf::from(format!("/tmp/crack_{}.log", session_id)),
            stderr_log_path: PathBuf::from(format!("/tmp/crack_{}_errors.log", session_id)),
            launched_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_then_lookup_then_remove() {
        let registry = SessionRegistry::new();
        let id = Uuid::new_v4();

        assert!(!registry.contains(&id).await);
        registry.insert(record(id)).await;
        assert!(registry.contains(&id).await);
        assert_eq!(registry.session_ids().await, vec![id]);

        let removed = registry.remove(&id).await.unwrap();
        assert_eq!(removed.session_id, id);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn remove_of_unknown_session_is_none_and_leaves_others() {
        let registry = SessionRegistry::new();
        let kept = Uuid::new_v4();
        registry.insert(record(kept)).await;

        assert!(registry.remove(&Uuid::new_v4()).await.is_none());
        assert_eq!(registry.len().await, 1);
        assert!(registry.contains(&kept).await);
    }

    #[tokio::test]
    async fn session_ids_preserve_launch_order() {
        let registry = SessionRegistry::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        registry.insert(record(first)).await;
        registry.insert(record(second)).await;

        assert_eq!(registry.session_ids().await, vec![first, second]);
    }
}
