/// Configuration for simulation execution
///
/// This module provides configuration types for controlling how composite
/// parts step their children, the rayon thread pool and the run limit.
use serde::{Deserialize, Serialize};

/// How a composite part invokes its children within one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionStrategy {
    /// Children run one after another in declaration order
    #[default]
    Sequential,
    /// Children run in parallel using Rayon; sibling wires propagate after
    /// every child has committed
    Concurrent,
    /// Children run one after another in topological order of their wires
    Dataflow,
}

/// Configuration for simulation execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Strategy used by composite parts that do not declare one
    pub default_strategy: ExecutionStrategy,
    /// Number of threads in the dedicated Rayon pool.
    /// `None` runs on the global pool.
    pub thread_pool_size: Option<usize>,
    /// Upper bound on steps executed by `SimulationEngine::run`
    pub max_steps: Option<u64>,
}

impl SimulationConfig {
    /// Create a new simulation configuration with default values
    ///
    /// Default configuration is sequential, global pool, unbounded run
    pub fn new() -> Self {
        Self {
            default_strategy: ExecutionStrategy::default(),
            thread_pool_size: None,
            max_steps: None,
        }
    }

    /// Set the strategy for composite parts without an explicit one
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    /// Set the thread pool size for concurrent execution
    ///
    /// # Arguments
    /// * `size` - The number of threads to use in the thread pool
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = Some(steps);
        self
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.default_strategy, ExecutionStrategy::Sequential);
        assert_eq!(config.thread_pool_size, None);
        assert_eq!(config.max_steps, None);
    }

    #[test]
    fn test_config_builder() {
        let config = SimulationConfig::new()
            .with_strategy(ExecutionStrategy::Concurrent)
            .with_thread_pool_size(4)
            .with_max_steps(100);

        assert_eq!(config.default_strategy, ExecutionStrategy::Concurrent);
        assert_eq!(config.thread_pool_size, Some(4));
        assert_eq!(config.max_steps, Some(100));
    }

    #[test]
    fn test_strategy_equality() {
        assert_eq!(ExecutionStrategy::Dataflow, ExecutionStrategy::Dataflow);
        assert_ne!(ExecutionStrategy::Sequential, ExecutionStrategy::Concurrent);
    }
}
