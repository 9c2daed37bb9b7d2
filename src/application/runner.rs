use crate::domain::config::ConfigMap;
use crate::domain::failure::{Failure, Fault, PhaseResult, Tier};
use crate::domain::phase::Phase;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info};

/// The body of a phase, re-invoked from the top on every retry.
#[async_trait]
pub trait PhaseWork: Send {
    type Output: Send;

    async fn attempt(&mut self) -> Result<Self::Output, Fault>;

    /// Configuration to read retry budgets from after a failed attempt.
    /// `None` while no configuration has been loaded.
    fn budget_source(&self) -> Option<&ConfigMap>;
}

/// Per-tier retry counters, owned by one orchestrator run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryCounters {
    pub system: u32,
    pub business: u32,
}

impl RetryCounters {
    pub fn get(&self, tier: Tier) -> u32 {
        match tier {
            Tier::System => self.system,
            Tier::Business => self.business,
        }
    }

    fn slot(&mut self, tier: Tier) -> &mut u32 {
        match tier {
            Tier::System => &mut self.system,
            Tier::Business => &mut self.business,
        }
    }

    pub fn reset(&mut self, tier: Tier) {
        *self.slot(tier) = 0;
    }

    pub fn increment(&mut self, tier: Tier) -> u32 {
        let slot = self.slot(tier);
        *slot += 1;
        *slot
    }
}

/// One logged retry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetryRecord {
    pub phase: Phase,
    pub tier: Tier,
    pub attempt: u32,
    pub budget: u32,
    pub cause: String,
}

/// Executes phases, classifies their failures and applies the retry budgets.
#[derive(Debug, Default)]
pub struct PhaseRunner {
    counters: RetryCounters,
    retries: Vec<RetryRecord>,
}

impl PhaseRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counters(&self) -> RetryCounters {
        self.counters
    }

    pub fn retries(&self) -> &[RetryRecord] {
        &self.retries
    }

    pub fn into_parts(self) -> (RetryCounters, Vec<RetryRecord>) {
        (self.counters, self.retries)
    }

    /// Runs `work` until it succeeds or a failure escalates.
    ///
    /// Retries are a bounded loop: every pass either returns or increments a
    /// counter that is capped by its budget.
    pub async fn run<W: PhaseWork>(
        &mut self,
        phase: Phase,
        work: &mut W,
    ) -> Result<W::Output, Failure> {
        loop {
            match self.attempt(phase, work).await {
                PhaseResult::Ok(output) => return Ok(output),
                PhaseResult::Retryable(_) => continue,
                PhaseResult::Fatal(failure) => return Err(failure),
            }
        }
    }

    /// A single invocation of `work`, classified.
    pub async fn attempt<W: PhaseWork>(&mut self, phase: Phase, work: &mut W) -> PhaseResult<W::Output> {
        match work.attempt().await {
            Ok(output) => {
                for tier in phase.raises() {
                    self.counters.reset(*tier);
                }
                info!(%phase, "phase completed");
                PhaseResult::Ok(output)
            }
            Err(fault) => self.classify(fault.at(phase), work.budget_source()),
        }
    }

    /// Decides whether a failure is retried or ends the run.
    pub fn classify<T>(&mut self, failure: Failure, config: Option<&ConfigMap>) -> PhaseResult<T> {
        if failure.terminal {
            return self.escalate(failure);
        }
        if !failure.phase.allows(failure.tier) {
            error!(
                phase = %failure.phase,
                tier = %failure.tier,
                "unexpected failure tier for phase"
            );
            return self.escalate(failure);
        }

        let budget = match config.map(|c| c.retry_budget(failure.tier)) {
            Some(Ok(budget)) => budget,
            Some(Err(e)) => return self.budget_unknown(failure, e.to_string()),
            None => return self.budget_unknown(failure, "no configuration loaded".to_string()),
        };

        let tier = failure.tier;
        if self.counters.get(tier) >= budget {
            return self.escalate(failure);
        }

        let attempt = self.counters.increment(tier);
        info!(
            phase = %failure.phase,
            %tier,
            attempt,
            budget,
            "retrying phase: {}",
            failure.cause
        );
        self.retries.push(RetryRecord {
            phase: failure.phase,
            tier,
            attempt,
            budget,
            cause: failure.cause.to_string(),
        });
        PhaseResult::Retryable(failure)
    }

    fn budget_unknown<T>(&mut self, failure: Failure, reason: String) -> PhaseResult<T> {
        let phase = failure.phase;
        let failure = Fault::system(format!("retry budget unknown ({reason}) after: {}", failure.cause))
            .fatal()
            .at(phase);
        self.escalate(failure)
    }

    fn escalate<T>(&mut self, failure: Failure) -> PhaseResult<T> {
        let failure = failure.escalate();
        error!(
            phase = %failure.phase,
            tier = %failure.tier,
            "terminal failure: {}",
            failure.cause
        );
        PhaseResult::Fatal(failure)
    }
}
