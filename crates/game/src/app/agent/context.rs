use engine::KeyInputTracker;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::registry::AgentRegistry;

/// Global agent state: key edges, the active selection and the shared rng.
/// Only the global tick hook and input events mutate `input` and the selection.
#[derive(Debug, Clone)]
pub(crate) struct AgentContext {
    pub input: KeyInputTracker,
    pub registry: AgentRegistry,
    pub rng: StdRng,
}

impl AgentContext {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            input: KeyInputTracker::new(),
            registry: AgentRegistry::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Spawned agents stay in the grid and rejoin on the next scan.
    pub(crate) fn reset(&mut self) {
        self.input.clear();
        self.registry.reset();
    }
}
