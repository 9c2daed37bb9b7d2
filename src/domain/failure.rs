use super::phase::Phase;
use miette::Diagnostic;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Underlying cause carried by a fault.
pub type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Configuration key holding the retry budget of the system tier.
pub const MAX_SYSTEM_RETRY: &str = "max_system_retry";
/// Configuration key holding the retry budget of the business tier.
pub const MAX_BUSINESS_RETRY: &str = "max_business_retry";

/// The two failure categories, each with its own budget and counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Infrastructure, initialization or otherwise unexpected failures.
    System,
    /// An expected business-rule violation raised while processing an item.
    Business,
}

impl Tier {
    pub fn budget_key(&self) -> &'static str {
        match self {
            Tier::System => MAX_SYSTEM_RETRY,
            Tier::Business => MAX_BUSINESS_RETRY,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::System => f.write_str("system"),
            Tier::Business => f.write_str("business"),
        }
    }
}

/// What a collaborator raises. It becomes a [`Failure`] once the phase that
/// observed it is known.
#[derive(Error, Debug)]
#[error("{tier} fault: {cause}")]
pub struct Fault {
    pub tier: Tier,
    pub cause: Cause,
    pub terminal: bool,
}

impl Fault {
    pub fn system(cause: impl Into<Cause>) -> Self {
        Self {
            tier: Tier::System,
            cause: cause.into(),
            terminal: false,
        }
    }

    pub fn business(cause: impl Into<Cause>) -> Self {
        Self {
            tier: Tier::Business,
            cause: cause.into(),
            terminal: false,
        }
    }

    /// Marks the fault as unrecoverable; it is escalated without retry.
    pub fn fatal(mut self) -> Self {
        self.terminal = true;
        self
    }

    pub fn at(self, phase: Phase) -> Failure {
        Failure {
            tier: self.tier,
            phase,
            cause: self.cause,
            terminal: self.terminal,
        }
    }
}

/// A failure record: the fault, the phase it surfaced in, and whether it
/// ends the run.
#[derive(Error, Debug, Diagnostic)]
#[error("{tier} failure during {phase}: {cause}")]
#[diagnostic(code(rpa_loop::phase_failure))]
pub struct Failure {
    pub tier: Tier,
    pub phase: Phase,
    /// Part of the message; not reported as a separate source.
    pub cause: Cause,
    pub terminal: bool,
}

impl Failure {
    pub fn escalate(mut self) -> Self {
        self.terminal = true;
        self
    }
}

/// Classification of a single phase attempt.
#[derive(Debug)]
pub enum PhaseResult<T> {
    Ok(T),
    Retryable(Failure),
    Fatal(Failure),
}
