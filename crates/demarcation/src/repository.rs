use std::{error::Error, fmt, sync::Arc};

use async_trait::async_trait;
use model::{paddock::PaddockRecord, WithId};
use tokio::sync::RwLock;
use utility::id::Id;

/// Failure reported by the persistence boundary. The message is passed on
/// as it was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceError {
    pub status: Option<u16>,
    pub message: String,
}

impl PersistenceError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "paddock could not be saved ({}): {}", status, self.message),
            None => write!(f, "paddock could not be saved: {}", self.message),
        }
    }
}

impl Error for PersistenceError {}

#[async_trait]
pub trait PaddockRepository: Send + Sync {
    async fn create(
        &self,
        record: PaddockRecord,
    ) -> Result<Id<PaddockRecord>, PersistenceError>;
}

#[async_trait]
impl<R> PaddockRepository for Arc<R>
where
    R: PaddockRepository + ?Sized,
{
    async fn create(
        &self,
        record: PaddockRecord,
    ) -> Result<Id<PaddockRecord>, PersistenceError> {
        self.as_ref().create(record).await
    }
}

/// Keeps created paddocks in memory. Used when no api is configured.
#[derive(Debug, Default)]
pub struct InMemoryPaddockRepository {
    records: RwLock<Vec<WithId<PaddockRecord>>>,
}

impl InMemoryPaddockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<WithId<PaddockRecord>> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl PaddockRepository for InMemoryPaddockRepository {
    async fn create(
        &self,
        record: PaddockRecord,
    ) -> Result<Id<PaddockRecord>, PersistenceError> {
        let mut records = self.records.write().await;
        let id: Id<PaddockRecord> = Id::new((records.len() + 1).to_string());
        log::info!("stored paddock \"{}\" with id {}", record.name, id);
        records.push(WithId::new(id.clone(), record));
        Ok(id)
    }
}
