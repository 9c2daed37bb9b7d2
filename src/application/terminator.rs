use crate::domain::ports::ResourceBox;
use serde::Serialize;
use tracing::{info, warn};

/// Outcome of one cleanup pass.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TerminationSummary {
    pub stopped: Vec<String>,
    pub failed: Vec<String>,
}

/// Best-effort shutdown of every resource the run opened.
#[derive(Default)]
pub struct Terminator {
    resources: Vec<ResourceBox>,
}

impl Terminator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of resources so they are stopped on exit.
    pub fn adopt(&mut self, resources: impl IntoIterator<Item = ResourceBox>) {
        self.resources.extend(resources);
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Stops every adopted resource. A resource that fails to stop is logged
    /// and skipped; this never fails.
    pub async fn terminate(&mut self) -> TerminationSummary {
        let mut summary = TerminationSummary::default();
        for mut resource in self.resources.drain(..) {
            let name = resource.name();
            match resource.stop().await {
                Ok(()) => {
                    info!(resource = %name, "stopped");
                    summary.stopped.push(name);
                }
                Err(e) => {
                    warn!(resource = %name, "cleanup failed: {}", e);
                    summary.failed.push(name);
                }
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ManagedResource;
    use crate::error::ResourceError;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fake {
        name: &'static str,
        fails: bool,
        stops: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ManagedResource for Fake {
        fn name(&self) -> String {
            self.name.to_string()
        }

        async fn stop(&mut self) -> Result<(), ResourceError> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            if self.fails {
                Err(ResourceError::Other("access denied".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_failed_resource_does_not_block_the_rest() {
        let stops = Arc::new(AtomicUsize::new(0));
        let mut terminator = Terminator::new();
        terminator.adopt(["browser", "erp", "mailer"].into_iter().map(|name| {
            Box::new(Fake {
                name,
                fails: name == "erp",
                stops: stops.clone(),
            }) as ResourceBox
        }));

        let summary = terminator.terminate().await;

        assert_eq!(stops.load(Ordering::SeqCst), 3);
        assert_eq!(summary.stopped, vec!["browser", "mailer"]);
        assert_eq!(summary.failed, vec!["erp"]);
        assert!(terminator.is_empty());
    }

    #[tokio::test]
    async fn test_terminate_with_nothing_adopted() {
        let mut terminator = Terminator::new();
        assert_eq!(terminator.terminate().await, TerminationSummary::default());
    }
}
