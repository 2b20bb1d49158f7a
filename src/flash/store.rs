use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tower_sessions::{
    ExpiredDeletion, SessionStore,
    cookie::time::OffsetDateTime,
    session::{Id, Record},
    session_store::Error as SSError,
};

/// In-process session records. Flashes are one-shot so nothing here needs to survive a restart.
#[derive(Debug, Clone, Default)]
pub struct FlashStore {
    records: Arc<Mutex<HashMap<Id, Record>>>,
}

impl FlashStore {
    /// Sweeps out records whose expiry has passed, every `period`, until the runtime shuts down.
    pub async fn delete_expired_every(self, period: Duration) {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = self.delete_expired().await {
                warn!(?e, "Unable to delete expired sessions");
            }
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

fn is_live(record: &Record) -> bool {
    record.expiry_date > OffsetDateTime::now_utc()
}

#[async_trait]
impl SessionStore for FlashStore {
    async fn create(&self, session_record: &mut Record) -> Result<(), SSError> {
        let mut records = self.records.lock().await;
        while records.contains_key(&session_record.id) {
            session_record.id = Id::default();
        }
        records.insert(session_record.id, session_record.clone());
        Ok(())
    }

    async fn save(&self, session_record: &Record) -> Result<(), SSError> {
        self.records
            .lock()
            .await
            .insert(session_record.id, session_record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> Result<Option<Record>, SSError> {
        Ok(self
            .records
            .lock()
            .await
            .get(session_id)
            .filter(|record| is_live(record))
            .cloned())
    }

    async fn delete(&self, session_id: &Id) -> Result<(), SSError> {
        self.records.lock().await.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for FlashStore {
    async fn delete_expired(&self) -> Result<(), SSError> {
        self.records.lock().await.retain(|_, record| is_live(record));
        Ok(())
    }
}
