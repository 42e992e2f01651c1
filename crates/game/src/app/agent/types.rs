use std::path::Path;

use engine::{parse_cell_defs, CellDefError, CellTypeId, CellTypeRegistry, DefErrorCode};

pub(crate) const MAX_RESOURCE: f32 = 100.0;
pub(crate) const MAX_PANIC: f32 = 20.0;

const AGENT_CELL_DEFS: &str = include_str!("../../../assets/agent_cells.xml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct AgentId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum ControlMode {
    Manual,
    #[default]
    Assist,
    Autonomous,
}

impl ControlMode {
    pub(crate) fn next(self) -> Self {
        match self {
            Self::Manual => Self::Assist,
            Self::Assist => Self::Autonomous,
            Self::Autonomous => Self::Manual,
        }
    }

    pub(crate) fn as_token(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Assist => "assist",
            Self::Autonomous => "autonomous",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Vitality {
    #[default]
    Alive,
    Dead {
        since_tick: u64,
    },
}

impl Vitality {
    pub(crate) fn is_dead(self) -> bool {
        matches!(self, Self::Dead { .. })
    }

    pub(crate) fn death_tick(self) -> Option<u64> {
        match self {
            Self::Alive => None,
            Self::Dead { since_tick } => Some(since_tick),
        }
    }

    /// Returns true only for the transition; a recorded death tick never changes.
    pub(crate) fn mark_dead(&mut self, tick: u64) -> bool {
        if self.is_dead() {
            return false;
        }
        *self = Self::Dead { since_tick: tick };
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Body {
    pub id: AgentId,
    pub facing: i32,
    pub mode: ControlMode,
    pub vitality: Vitality,
    pub health: f32,
    pub stamina: f32,
    pub oxygen: f32,
    pub hunger: f32,
    pub panic: f32,
    pub jump_cooldown: u32,
    pub hang_ticks: u32,
    pub wander_dir: i32,
    pub wander_timer: u32,
    pub held: Option<CellTypeId>,
}

impl Body {
    pub(crate) fn new(id: AgentId, facing: i32) -> Self {
        Self {
            id,
            facing: if facing < 0 { -1 } else { 1 },
            mode: ControlMode::default(),
            vitality: Vitality::Alive,
            health: MAX_RESOURCE,
            stamina: MAX_RESOURCE,
            oxygen: MAX_RESOURCE,
            hunger: 0.0,
            panic: 0.0,
            jump_cooldown: 0,
            hang_ticks: 0,
            wander_dir: 0,
            wander_timer: 0,
            held: None,
        }
    }

    pub(crate) fn clamp_resources(&mut self) {
        self.health = self.health.clamp(0.0, MAX_RESOURCE);
        self.stamina = self.stamina.clamp(0.0, MAX_RESOURCE);
        self.oxygen = self.oxygen.clamp(0.0, MAX_RESOURCE);
        self.hunger = self.hunger.max(0.0);
        self.panic = self.panic.clamp(0.0, MAX_PANIC);
    }

    pub(crate) fn spend_stamina(&mut self, cost: f32) {
        self.stamina = (self.stamina - cost).max(0.0);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Head {
    pub id: AgentId,
    pub vitality: Vitality,
    pub breath: f32,
}

impl Head {
    pub(crate) fn new(id: AgentId) -> Self {
        Self {
            id,
            vitality: Vitality::Alive,
            breath: MAX_RESOURCE,
        }
    }
}

/// Per-cell payload carried by every grid cell in an agent world.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) enum AgentCell {
    #[default]
    Inert,
    Body(Body),
    Head(Head),
}

impl AgentCell {
    pub(crate) fn agent_id(&self) -> Option<AgentId> {
        match self {
            Self::Inert => None,
            Self::Body(body) => Some(body.id),
            Self::Head(head) => Some(head.id),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Intent {
    pub move_dir: i32,
    pub jump: bool,
    pub crouch: bool,
    pub sprint: bool,
}

impl Intent {
    pub(crate) const IDLE: Intent = Intent {
        move_dir: 0,
        jump: false,
        crouch: false,
        sprint: false,
    };

    pub(crate) fn is_idle(&self) -> bool {
        self.move_dir == 0 && !self.jump && !self.sprint
    }
}

/// Type ids of the cells the agent system owns or emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AgentKinds {
    pub head: CellTypeId,
    pub body: CellTypeId,
    pub spawner: CellTypeId,
    pub remains: CellTypeId,
    pub blood: CellTypeId,
}

impl AgentKinds {
    pub(crate) fn register(registry: &mut CellTypeRegistry) -> Result<Self, CellDefError> {
        let source_path = Path::new("assets/agent_cells.xml");
        for def in parse_cell_defs("agent", source_path, AGENT_CELL_DEFS)? {
            let def_name = def.def_name.clone();
            if registry.register(def).is_none() {
                return Err(agent_def_error(
                    DefErrorCode::InvalidValue,
                    format!("no cell type id left for agent cell type '{def_name}'"),
                ));
            }
        }
        Self::resolve(registry)
    }

    pub(crate) fn resolve(registry: &CellTypeRegistry) -> Result<Self, CellDefError> {
        let lookup = |name: &str| {
            registry.id_by_name(name).ok_or_else(|| {
                agent_def_error(
                    DefErrorCode::MissingField,
                    format!("agent cell type '{name}' is not registered"),
                )
            })
        };
        Ok(Self {
            head: lookup("agent_head")?,
            body: lookup("agent_body")?,
            spawner: lookup("agent_spawner")?,
            remains: lookup("remains")?,
            blood: lookup("blood")?,
        })
    }

    pub(crate) fn is_agent_part(&self, kind: CellTypeId) -> bool {
        kind == self.head || kind == self.body
    }
}

fn agent_def_error(code: DefErrorCode, message: String) -> CellDefError {
    CellDefError {
        code,
        message,
        source_id: "agent".to_string(),
        file_path: Path::new("assets/agent_cells.xml").to_path_buf(),
        location: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_dead_records_first_tick_only() {
        let mut vitality = Vitality::Alive;
        assert!(vitality.mark_dead(12));
        assert!(!vitality.mark_dead(40));
        assert_eq!(vitality.death_tick(), Some(12));
    }

    #[test]
    fn mode_cycle_visits_all_modes() {
        let start = ControlMode::Manual;
        assert_eq!(start.next(), ControlMode::Assist);
        assert_eq!(start.next().next(), ControlMode::Autonomous);
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn clamp_keeps_resources_in_range() {
        let mut body = Body::new(AgentId(1), 1);
        body.health = 140.0;
        body.stamina = -3.0;
        body.hunger = -1.0;
        body.panic = 35.0;
        body.clamp_resources();

        assert_eq!(body.health, 100.0);
        assert_eq!(body.stamina, 0.0);
        assert_eq!(body.hunger, 0.0);
        assert_eq!(body.panic, MAX_PANIC);
    }

    #[test]
    fn agent_kinds_register_into_builtin_registry() {
        let mut registry = engine::builtin_cell_registry();
        let before = registry.len();
        let kinds = AgentKinds::register(&mut registry).expect("agent kinds");

        assert_eq!(registry.len(), before + 5);
        assert!(kinds.is_agent_part(kinds.head));
        assert!(!kinds.is_agent_part(kinds.spawner));
        assert!(registry.def(kinds.blood).expect("blood").is_liquid());
    }
}
