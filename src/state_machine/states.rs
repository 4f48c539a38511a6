use serde::{Deserialize, Serialize};
use std::fmt;

/// Wizard state: a 1-based step, the finalize sub-state, or the terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "step", rename_all = "snake_case")]
pub enum WizardState {
    /// Collecting input on step `k` of `1..=N`
    AtStep(usize),
    /// Finalize in flight at step N; input is locked
    Submitting,
    /// Record persisted; only reset leaves this state
    Complete,
}

impl WizardState {
    /// Check if this is a terminal state (no further transitions besides reset)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    /// Check if input may be mutated in this state
    pub fn accepts_input(&self) -> bool {
        matches!(self, Self::AtStep(_))
    }

    /// Step index the state sits on; `Submitting` and `Complete` report the last step
    pub fn step_index(&self, total_steps: usize) -> usize {
        match self {
            Self::AtStep(step) => *step,
            Self::Submitting | Self::Complete => total_steps,
        }
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::AtStep(1)
    }
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtStep(step) => write!(f, "step_{step}"),
            Self::Submitting => write!(f, "submitting"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

impl std::str::FromStr for WizardState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitting" => Ok(Self::Submitting),
            "complete" => Ok(Self::Complete),
            other => other
                .strip_prefix("step_")
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|n| *n >= 1)
                .map(Self::AtStep)
                .ok_or_else(|| format!("Invalid wizard state: {s}")),
        }
    }
}
