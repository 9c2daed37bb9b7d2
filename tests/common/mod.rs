#![allow(dead_code)]

use async_trait::async_trait;
use rpa_loop::domain::config::{ConfigMap, ConfigValue};
use rpa_loop::domain::failure::{Fault, MAX_BUSINESS_RETRY, MAX_SYSTEM_RETRY};
use rpa_loop::domain::ports::{
    ApplicationInitializer, BusinessExecutor, ManagedResource, ResourceBox, TransactionSource,
};
use rpa_loop::domain::transaction::TransactionItem;
use rpa_loop::error::ResourceError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

pub fn budgets(system: i64, business: i64) -> ConfigMap {
    ConfigMap::from_entries([
        (MAX_SYSTEM_RETRY, ConfigValue::Integer(system)),
        (MAX_BUSINESS_RETRY, ConfigValue::Integer(business)),
    ])
    .unwrap()
}

pub fn write_config(path: &Path, rows: &[(&str, &str)]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "key,value")?;
    for (key, value) in rows {
        writeln!(file, "{key},{value}")?;
    }
    Ok(())
}

/// Counts calls and fails the first `failures` of them.
#[derive(Clone, Default)]
pub struct Flaky {
    failures: u32,
    calls: Arc<AtomicU32>,
}

impl Flaky {
    pub fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst) < self.failures
    }
}

/// Application initializer failing with system faults before succeeding.
#[derive(Clone)]
pub struct FlakyApplications {
    pub flaky: Flaky,
    pub resources: Vec<(&'static str, bool)>,
    pub stops: Arc<AtomicU32>,
}

impl FlakyApplications {
    pub fn new(failures: u32) -> Self {
        Self {
            flaky: Flaky::new(failures),
            resources: Vec::new(),
            stops: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Adds a resource handed out on success; `fails` makes its stop error.
    pub fn with_resource(mut self, name: &'static str, fails: bool) -> Self {
        self.resources.push((name, fails));
        self
    }

    pub fn stops(&self) -> u32 {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ApplicationInitializer for FlakyApplications {
    async fn start(&self, _config: &ConfigMap) -> Result<Vec<ResourceBox>, Fault> {
        if self.flaky.tick() {
            return Err(Fault::system("application did not start"));
        }
        Ok(self
            .resources
            .iter()
            .map(|&(name, fails)| {
                Box::new(FakeResource {
                    name,
                    fails,
                    stops: self.stops.clone(),
                }) as ResourceBox
            })
            .collect())
    }
}

pub struct FakeResource {
    pub name: &'static str,
    pub fails: bool,
    pub stops: Arc<AtomicU32>,
}

#[async_trait]
impl ManagedResource for FakeResource {
    fn name(&self) -> String {
        self.name.to_string()
    }

    async fn stop(&mut self) -> Result<(), ResourceError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.fails {
            Err(ResourceError::Other(format!("{} refused to stop", self.name)))
        } else {
            Ok(())
        }
    }
}

/// Transaction source failing with system faults before handing out an item.
#[derive(Clone)]
pub struct FlakySource {
    pub flaky: Flaky,
    pub item: Option<TransactionItem>,
}

impl FlakySource {
    pub fn new(failures: u32, item: Option<TransactionItem>) -> Self {
        Self {
            flaky: Flaky::new(failures),
            item,
        }
    }
}

#[async_trait]
impl TransactionSource for FlakySource {
    async fn next_item(&self, _config: &ConfigMap) -> Result<Option<TransactionItem>, Fault> {
        if self.flaky.tick() {
            return Err(Fault::system("queue unavailable"));
        }
        Ok(self.item.clone())
    }
}

/// Business executor raising the scripted faults in order, then succeeding.
#[derive(Clone)]
pub struct ScriptedBusiness {
    pub script: Arc<std::sync::Mutex<Vec<Fault>>>,
    pub calls: Arc<AtomicU32>,
}

impl ScriptedBusiness {
    pub fn new(script: Vec<Fault>) -> Self {
        Self {
            script: Arc::new(std::sync::Mutex::new(script)),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BusinessExecutor for ScriptedBusiness {
    async fn execute(&self, _config: &ConfigMap, _item: &TransactionItem) -> Result<(), Fault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            Ok(())
        } else {
            Err(script.remove(0))
        }
    }
}
