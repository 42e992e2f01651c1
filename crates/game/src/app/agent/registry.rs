use tracing::{debug, info};

use super::types::{AgentCell, AgentId};
use super::AgentWorld;

/// Roster of live bodies plus the single active selection.
#[derive(Debug, Clone)]
pub(crate) struct AgentRegistry {
    roster: Vec<AgentId>,
    active: Option<AgentId>,
    next_id: u64,
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self {
            roster: Vec::new(),
            active: None,
            next_id: 1,
        }
    }
}

impl AgentRegistry {
    pub(crate) fn alloc_id(&mut self) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    pub(crate) fn active(&self) -> Option<AgentId> {
        self.active
    }

    pub(crate) fn roster(&self) -> &[AgentId] {
        &self.roster
    }

    pub(crate) fn is_active(&self, id: AgentId) -> bool {
        self.active == Some(id)
    }

    /// A freshly spawned agent takes the selection and joins the roster at once.
    pub(crate) fn adopt_spawned(&mut self, id: AgentId) {
        if let Err(idx) = self.roster.binary_search(&id) {
            self.roster.insert(idx, id);
        }
        self.active = Some(id);
    }

    pub(crate) fn refresh(&mut self, world: &AgentWorld) {
        self.roster = live_body_ids(world);
        debug!(
            tick = world.tick(),
            live_agents = self.roster.len(),
            "agent_census"
        );
        self.validate_active();
    }

    /// An active id that no longer resolves falls back to the lowest live id.
    pub(crate) fn validate_active(&mut self) {
        let Some(current) = self.active else {
            return;
        };
        if self.roster.binary_search(&current).is_ok() {
            return;
        }
        self.active = self.roster.first().copied();
        info!(
            from = current.0,
            to = ?self.active.map(|id| id.0),
            "active_agent_reassigned"
        );
    }

    pub(crate) fn cycle_active(&mut self) -> Option<AgentId> {
        let next = match self.active {
            Some(current) => self
                .roster
                .iter()
                .copied()
                .find(|id| *id > current)
                .or_else(|| self.roster.first().copied()),
            None => self.roster.first().copied(),
        };
        self.active = next;
        next
    }

    pub(crate) fn reset(&mut self) {
        self.roster.clear();
        self.active = None;
    }
}

pub(crate) fn live_body_ids(world: &AgentWorld) -> Vec<AgentId> {
    let mut ids = world
        .grid()
        .iter_occupied()
        .filter_map(|(_, cell)| match &cell.payload {
            AgentCell::Body(body) if !body.vitality.is_dead() => Some(body.id),
            _ => None,
        })
        .collect::<Vec<_>>();
    ids.sort_unstable();
    ids.dedup();
    ids
}
