//! MCTS configuration parameters.

use crate::rollout::RolloutPolicy;

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Iterations run after the initial one-simulation-per-child pass.
    pub iterations: u32,

    /// Exploration constant `C` of UCB1.
    pub exploration: f64,

    /// Worker threads. 0 uses every logical CPU; 1 runs the search on the
    /// calling thread and is fully reproducible under a fixed seed.
    pub num_threads: usize,

    /// Policy used to play simulations to the end.
    pub rollout: RolloutPolicy,

    /// Base seed of the per-simulation generators. `None` draws a fresh seed per search.
    pub seed: Option<u64>,

    /// Weight α of the evaluator prior in `α·prior + (1-α)·UCB1`. Only used when
    /// the engine has an evaluator.
    pub policy_weight: f64,

    /// Back up the evaluator's value instead of playing a rollout.
    pub evaluator_value: bool,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            exploration: std::f64::consts::SQRT_2,
            num_threads: 0,
            rollout: RolloutPolicy::Random,
            seed: None,
            policy_weight: 0.3,
            evaluator_value: false,
        }
    }
}

impl MctsConfig {
    /// Create a small, single-threaded, seeded config for testing.
    pub fn for_testing() -> Self {
        Self {
            iterations: 200,
            num_threads: 1,
            seed: Some(42),
            ..Self::default()
        }
    }

    pub fn with_iterations(mut self, n: u32) -> Self {
        self.iterations = n;
        self
    }

    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    pub fn with_threads(mut self, n: usize) -> Self {
        self.num_threads = n;
        self
    }

    pub fn with_rollout(mut self, policy: RolloutPolicy) -> Self {
        self.rollout = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder pattern: set the prior blend weight, clamped to `[0, 1]`.
    pub fn with_policy_weight(mut self, alpha: f64) -> Self {
        self.policy_weight = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn with_evaluator_value(mut self, enabled: bool) -> Self {
        self.evaluator_value = enabled;
        self
    }

    /// Number of worker threads after resolving 0 to the CPU count.
    pub fn resolved_threads(&self) -> usize {
        match self.num_threads {
            0 => num_cpus::get(),
            n => n,
        }
    }
}
