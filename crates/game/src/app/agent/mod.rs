mod context;
mod intent;
mod interaction;
mod lifecycle;
mod link;
mod perception;
mod physics;
mod pipeline;
mod registry;
mod survival;
mod tuning;
mod types;

use std::collections::VecDeque;

use engine::{CellTypeId, CellWorld, GridPos, InputAction, TickHooks};
use tracing::{debug, info};

#[cfg(test)]
pub(crate) use registry::live_body_ids;
pub(crate) use tuning::AgentTuning;
pub(crate) use types::{AgentCell, AgentKinds};

use context::AgentContext;
use lifecycle::spawn_agent;
use types::AgentId;

use super::config::ScriptedEvent;

pub(crate) type AgentWorld = CellWorld<AgentCell>;

/// The agent cell types' hook into the scheduler.
pub(crate) struct AgentSystem {
    kinds: AgentKinds,
    tuning: AgentTuning,
    ctx: AgentContext,
    script: VecDeque<ScriptedEvent>,
}

impl AgentSystem {
    pub(crate) fn new(kinds: AgentKinds, tuning: AgentTuning, seed: u64) -> Self {
        Self {
            kinds,
            tuning,
            ctx: AgentContext::new(seed),
            script: VecDeque::new(),
        }
    }

    /// Events replayed at the start of their tick, in tick order.
    pub(crate) fn with_script(mut self, mut script: Vec<ScriptedEvent>) -> Self {
        script.sort_by_key(ScriptedEvent::tick);
        self.script = script.into();
        self
    }

    pub(crate) fn kinds(&self) -> &AgentKinds {
        &self.kinds
    }

    pub(crate) fn context(&self) -> &AgentContext {
        &self.ctx
    }

    #[cfg(test)]
    pub(crate) fn context_mut(&mut self) -> &mut AgentContext {
        &mut self.ctx
    }

    pub(crate) fn spawn(&mut self, world: &mut AgentWorld, pos: GridPos) -> Option<AgentId> {
        spawn_agent(world, &self.kinds, &mut self.ctx, pos)
    }

    pub(crate) fn reset(&mut self) {
        self.ctx.reset();
        info!("agent_context_reset");
    }

    fn replay_script(&mut self, world: &mut AgentWorld, tick: u64) {
        while self.script.front().is_some_and(|event| event.tick() <= tick) {
            let Some(event) = self.script.pop_front() else {
                break;
            };
            match event {
                ScriptedEvent::Key {
                    action, pressed, ..
                } => self.ctx.input.set_action(action, pressed),
                ScriptedEvent::Spawn { x, y, .. } => {
                    if self.spawn(world, GridPos::new(x, y)).is_none() {
                        debug!(x, y, "scripted_spawn_blocked");
                    }
                }
                ScriptedEvent::Reset { .. } => self.reset(),
            }
        }
    }
}

impl TickHooks<AgentCell> for AgentSystem {
    fn handles(&self, kind: CellTypeId) -> bool {
        kind == self.kinds.body || kind == self.kinds.head || kind == self.kinds.spawner
    }

    fn global_tick(&mut self, world: &mut AgentWorld) {
        let tick = world.tick();
        self.replay_script(world, tick);
        self.ctx.input.begin_tick();

        if self.ctx.input.is_edge(InputAction::CycleAgent) {
            self.ctx.registry.refresh(world);
            let active = self.ctx.registry.cycle_active();
            info!(active = ?active.map(|id| id.0), "active_agent_cycled");
        }
        if tick % self.tuning.validation_interval_ticks.max(1) == 0 {
            self.ctx.registry.refresh(world);
        }
    }

    fn cell_tick(&mut self, world: &mut AgentWorld, pos: GridPos) {
        let Some(kind) = world.grid().kind_at(pos) else {
            return;
        };
        if kind == self.kinds.body {
            pipeline::tick_body(world, &self.kinds, &self.tuning, &mut self.ctx, pos);
        } else if kind == self.kinds.head {
            pipeline::tick_head(world, &self.kinds, &self.tuning, &mut self.ctx, pos);
        } else if kind == self.kinds.spawner {
            if lifecycle::convert_seed(world, &self.kinds, &mut self.ctx, pos).is_none() {
                debug!(x = pos.x, y = pos.y, "spawner_consumed_without_agent");
            }
        }
    }
}
