use serde::{Deserialize, Serialize};

/// One unit of transactional work fetched by the Acquire phase.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TransactionItem {
    pub reference: String,
    #[serde(default)]
    pub payload: String,
}

impl TransactionItem {
    pub fn new(reference: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            payload: payload.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.payload.trim().is_empty()
    }
}
