use crate::domain::config::ConfigMap;
use crate::domain::failure::Fault;
use crate::domain::ports::{
    ApplicationInitializer, ConfigSource, ResourceBox, TransactionSource,
};
use crate::domain::transaction::TransactionItem;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A configuration source backed by an already built map.
#[derive(Clone)]
pub struct InMemoryConfigSource {
    config: ConfigMap,
}

impl InMemoryConfigSource {
    pub fn new(config: ConfigMap) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ConfigSource for InMemoryConfigSource {
    async fn load(&self) -> Result<ConfigMap> {
        Ok(self.config.clone())
    }
}

/// A FIFO transaction queue.
///
/// Clones share the same queue, so a test can keep a handle and inspect what
/// is left after a run.
#[derive(Default, Clone)]
pub struct InMemoryQueue {
    items: Arc<Mutex<VecDeque<TransactionItem>>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = TransactionItem>) -> Self {
        Self {
            items: Arc::new(Mutex::new(items.into_iter().collect())),
        }
    }

    pub async fn push(&self, item: TransactionItem) {
        self.items.lock().await.push_back(item);
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }
}

#[async_trait]
impl TransactionSource for InMemoryQueue {
    async fn next_item(&self, _config: &ConfigMap) -> Result<Option<TransactionItem>, Fault> {
        Ok(self.items.lock().await.pop_front())
    }
}

/// An initializer for runs that depend on no external application.
#[derive(Default, Clone, Copy)]
pub struct NoApplications;

#[async_trait]
impl ApplicationInitializer for NoApplications {
    async fn start(&self, _config: &ConfigMap) -> Result<Vec<ResourceBox>, Fault> {
        Ok(Vec::new())
    }
}
