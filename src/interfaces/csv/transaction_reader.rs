use crate::domain::config::ConfigMap;
use crate::domain::failure::Fault;
use crate::domain::ports::TransactionSource;
use crate::domain::transaction::TransactionItem;
use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::Read;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::info;

/// Configuration key naming the transaction queue file.
pub const QUEUE_PATH_KEY: &str = "queue_path";

/// Reads transaction items from a CSV source with `reference,payload` columns.
pub struct TransactionReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> TransactionReader<R> {
    /// Creates a new `TransactionReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes items.
    pub fn items(self) -> impl Iterator<Item = Result<TransactionItem>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(ConfigError::from))
    }
}

/// A queue loaded from the file named by [`QUEUE_PATH_KEY`].
///
/// The file is read on the first fetch; a failed read leaves the queue
/// unloaded so a retried fetch reads it again. Without the key the queue is
/// empty.
#[derive(Default)]
pub struct CsvTransactionSource {
    queue: Mutex<Option<VecDeque<TransactionItem>>>,
}

impl CsvTransactionSource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_queue(config: &ConfigMap) -> Result<VecDeque<TransactionItem>, Fault> {
        let Some(path) = config.find(QUEUE_PATH_KEY) else {
            return Ok(VecDeque::new());
        };
        let path = PathBuf::from(path.to_string());
        let bytes = tokio::fs::read(&path).await.map_err(|source| {
            Fault::system(ConfigError::Unreachable {
                path: path.clone(),
                source,
            })
        })?;
        let items = TransactionReader::new(bytes.as_slice())
            .items()
            .collect::<Result<VecDeque<_>>>()
            .map_err(Fault::system)?;
        info!(path = %path.display(), items = items.len(), "transaction queue loaded");
        Ok(items)
    }
}

#[async_trait]
impl TransactionSource for CsvTransactionSource {
    async fn next_item(&self, config: &ConfigMap) -> Result<Option<TransactionItem>, Fault> {
        let mut queue = self.queue.lock().await;
        if queue.is_none() {
            *queue = Some(Self::read_queue(config).await?);
        }
        Ok(queue.as_mut().and_then(VecDeque::pop_front))
    }
}
