//! Run configuration.

use serde::{Deserialize, Serialize};

/// Which contexts a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Only the main context runs.
    #[default]
    Sequential,
    /// After the main context halts cleanly, one context per declared
    /// function starts at that function's entry.
    FanOut,
}

/// Configuration for a `Machine` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmConfig {
    pub mode: ExecutionMode,
    /// Base seed for every context's random stream.
    pub seed: u64,
    /// Per-context instruction budget. `None` runs to completion.
    pub max_instructions: Option<u64>,
    /// Run fan-out contexts on the rayon pool when the `parallel` feature
    /// is compiled in.
    pub parallel: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            seed: 0,
            max_instructions: None,
            parallel: true,
        }
    }
}

impl VmConfig {
    pub fn sequential() -> Self {
        Self::default()
    }

    pub fn fan_out() -> Self {
        Self {
            mode: ExecutionMode::FanOut,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_instruction_limit(mut self, limit: u64) -> Self {
        self.max_instructions = Some(limit);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Whether fan-out contexts should actually run concurrently.
    pub fn runs_in_parallel(&self) -> bool {
        cfg!(feature = "parallel") && self.parallel
    }
}
