use super::runner::{PhaseRunner, PhaseWork, RetryCounters, RetryRecord};
use super::terminator::{TerminationSummary, Terminator};
use crate::domain::config::ConfigMap;
use crate::domain::failure::{Failure, Fault};
use crate::domain::phase::Phase;
use crate::domain::ports::{
    ApplicationInitializer, ApplicationInitializerBox, BusinessExecutor, BusinessExecutorBox,
    ConfigSource, ConfigSourceBox, ResourceBox, TransactionSource, TransactionSourceBox,
};
use crate::domain::transaction::TransactionItem;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

/// States of one run. `Done` and `Fatal` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Init,
    Acquire,
    Process,
    Terminate,
    Done,
    Fatal,
}

/// When the terminator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminatePolicy {
    /// After success and after a fatal outcome.
    #[default]
    Always,
    OnSuccess,
    /// Resources are left running and outlive the run.
    Never,
}

impl TerminatePolicy {
    fn on_success(&self) -> bool {
        matches!(self, TerminatePolicy::Always | TerminatePolicy::OnSuccess)
    }

    fn on_fatal(&self) -> bool {
        matches!(self, TerminatePolicy::Always)
    }
}

/// What happened during a run.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// States entered, in order. Cleanup after a fatal outcome does not enter
    /// `Terminate`: the list ends at `Fatal` and the cleanup is recorded in
    /// `termination` only.
    pub states: Vec<RunState>,
    pub retries: Vec<RetryRecord>,
    pub counters: RetryCounters,
    pub item: Option<String>,
    pub termination: Option<TerminationSummary>,
    pub failure: Option<String>,
}

impl RunReport {
    fn enter(&mut self, state: RunState) {
        info!(?state, "entering state");
        self.states.push(state);
    }

    pub fn final_state(&self) -> Option<RunState> {
        self.states.last().copied()
    }

    pub fn visited(&self, state: RunState) -> bool {
        self.states.contains(&state)
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    Done(RunReport),
    Fatal(Failure, RunReport),
}

impl RunOutcome {
    pub fn report(&self) -> &RunReport {
        match self {
            RunOutcome::Done(report) | RunOutcome::Fatal(_, report) => report,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, RunOutcome::Fatal(..))
    }
}

/// Sequences Initialize, Acquire Transaction, Process and Terminate.
pub struct Orchestrator {
    config_source: ConfigSourceBox,
    applications: ApplicationInitializerBox,
    transactions: TransactionSourceBox,
    business: BusinessExecutorBox,
    policy: TerminatePolicy,
}

impl Orchestrator {
    pub fn new(
        config_source: ConfigSourceBox,
        applications: ApplicationInitializerBox,
        transactions: TransactionSourceBox,
        business: BusinessExecutorBox,
    ) -> Self {
        Self {
            config_source,
            applications,
            transactions,
            business,
            policy: TerminatePolicy::default(),
        }
    }

    pub fn with_terminate_policy(mut self, policy: TerminatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Executes one run. Retry counters and owned resources live only for
    /// the duration of this call.
    pub async fn run(&self) -> RunOutcome {
        let mut runner = PhaseRunner::new();
        let mut terminator = Terminator::new();
        let mut report = RunReport::default();

        let result = self.drive(&mut runner, &mut terminator, &mut report).await;

        let (counters, retries) = runner.into_parts();
        report.counters = counters;
        report.retries = retries;

        match result {
            Ok(()) => {
                if self.policy.on_success() {
                    report.enter(RunState::Terminate);
                    report.termination = Some(terminator.terminate().await);
                }
                report.enter(RunState::Done);
                RunOutcome::Done(report)
            }
            Err(failure) => {
                report.enter(RunState::Fatal);
                report.failure = Some(failure.to_string());
                if self.policy.on_fatal() {
                    report.termination = Some(terminator.terminate().await);
                } else if !terminator.is_empty() {
                    warn!(resources = terminator.len(), "leaving resources running");
                }
                RunOutcome::Fatal(failure, report)
            }
        }
    }

    async fn drive(
        &self,
        runner: &mut PhaseRunner,
        terminator: &mut Terminator,
        report: &mut RunReport,
    ) -> Result<(), Failure> {
        report.enter(RunState::Init);
        let mut init = InitializeWork {
            source: self.config_source.as_ref(),
            applications: self.applications.as_ref(),
            loaded: None,
        };
        let resources = runner.run(Phase::Initialize, &mut init).await?;
        terminator.adopt(resources);
        let Some(config) = init.loaded else {
            return Err(Fault::system("initialize completed without configuration")
                .fatal()
                .at(Phase::Initialize));
        };

        report.enter(RunState::Acquire);
        let mut acquire = AcquireWork {
            source: self.transactions.as_ref(),
            config: &config,
        };
        let Some(item) = runner.run(Phase::AcquireTransaction, &mut acquire).await? else {
            info!("no transaction item available");
            return Ok(());
        };
        report.item = Some(item.reference.clone());

        report.enter(RunState::Process);
        let mut process = ProcessWork {
            executor: self.business.as_ref(),
            config: &config,
            item: &item,
        };
        runner.run(Phase::Process, &mut process).await?;
        info!(reference = %item.reference, "transaction completed");
        Ok(())
    }
}

/// Loads the configuration and starts the applications.
struct InitializeWork<'a> {
    source: &'a dyn ConfigSource,
    applications: &'a dyn ApplicationInitializer,
    loaded: Option<ConfigMap>,
}

#[async_trait]
impl PhaseWork for InitializeWork<'_> {
    type Output = Vec<ResourceBox>;

    async fn attempt(&mut self) -> Result<Self::Output, Fault> {
        let config = self.source.load().await.map_err(Fault::system)?;
        let config = self.loaded.insert(config);
        self.applications.start(config).await
    }

    fn budget_source(&self) -> Option<&ConfigMap> {
        self.loaded.as_ref()
    }
}

struct AcquireWork<'a> {
    source: &'a dyn TransactionSource,
    config: &'a ConfigMap,
}

#[async_trait]
impl PhaseWork for AcquireWork<'_> {
    type Output = Option<TransactionItem>;

    async fn attempt(&mut self) -> Result<Self::Output, Fault> {
        self.source.next_item(self.config).await
    }

    fn budget_source(&self) -> Option<&ConfigMap> {
        Some(self.config)
    }
}

struct ProcessWork<'a> {
    executor: &'a dyn BusinessExecutor,
    config: &'a ConfigMap,
    item: &'a TransactionItem,
}

#[async_trait]
impl PhaseWork for ProcessWork<'_> {
    type Output = ();

    async fn attempt(&mut self) -> Result<(), Fault> {
        self.executor.execute(self.config, self.item).await
    }

    fn budget_source(&self) -> Option<&ConfigMap> {
        Some(self.config)
    }
}
