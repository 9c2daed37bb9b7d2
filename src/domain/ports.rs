use super::config::ConfigMap;
use super::failure::Fault;
use super::transaction::TransactionItem;
use crate::error::{ConfigError, ResourceError};
use async_trait::async_trait;

/// Where the configuration map comes from.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn load(&self) -> Result<ConfigMap, ConfigError>;
}

/// Starts the external applications a run depends on.
///
/// Returns the resources it opened so they can be stopped on exit. On failure
/// an implementation stops whatever it already started before returning.
#[async_trait]
pub trait ApplicationInitializer: Send + Sync {
    async fn start(&self, config: &ConfigMap) -> Result<Vec<ResourceBox>, Fault>;
}

/// Fetches the next unit of work. `None` means the queue is empty.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn next_item(&self, config: &ConfigMap) -> Result<Option<TransactionItem>, Fault>;
}

/// Runs the business process against one item.
#[async_trait]
pub trait BusinessExecutor: Send + Sync {
    async fn execute(&self, config: &ConfigMap, item: &TransactionItem) -> Result<(), Fault>;
}

/// A process or session owned by the run and stopped by the terminator.
#[async_trait]
pub trait ManagedResource: Send {
    fn name(&self) -> String;
    async fn stop(&mut self) -> Result<(), ResourceError>;
}

pub type ConfigSourceBox = Box<dyn ConfigSource>;
pub type ApplicationInitializerBox = Box<dyn ApplicationInitializer>;
pub type TransactionSourceBox = Box<dyn TransactionSource>;
pub type BusinessExecutorBox = Box<dyn BusinessExecutor>;
pub type ResourceBox = Box<dyn ManagedResource>;
