use super::failure::Tier;
use serde::Serialize;
use std::fmt;

/// The retried stages of one run. Cleanup is not a phase: the terminator
/// runs it once, outside the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    Initialize,
    AcquireTransaction,
    Process,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Initialize => "Initialize",
            Phase::AcquireTransaction => "AcquireTransaction",
            Phase::Process => "Process",
        }
    }

    /// Failure tiers this phase is expected to raise. A fault of any other
    /// tier escalates immediately.
    pub fn raises(&self) -> &'static [Tier] {
        match self {
            Phase::Initialize | Phase::AcquireTransaction => &[Tier::System],
            Phase::Process => &[Tier::Business, Tier::System],
        }
    }

    pub fn allows(&self, tier: Tier) -> bool {
        self.raises().contains(&tier)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
