use crate::domain::config::ConfigMap;
use crate::domain::failure::Fault;
use crate::domain::ports::BusinessExecutor;
use crate::domain::transaction::TransactionItem;
use async_trait::async_trait;
use tracing::info;

/// Default business process: rejects items without a payload.
#[derive(Default, Clone, Copy)]
pub struct PayloadValidator;

impl PayloadValidator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BusinessExecutor for PayloadValidator {
    async fn execute(&self, _config: &ConfigMap, item: &TransactionItem) -> Result<(), Fault> {
        if item.is_empty() {
            return Err(Fault::business(format!(
                "empty transaction item '{}'",
                item.reference
            )));
        }
        info!(reference = %item.reference, payload = %item.payload, "processed transaction item");
        Ok(())
    }
}
