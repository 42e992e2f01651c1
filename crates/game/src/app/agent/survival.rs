use engine::GridPos;
use tracing::debug;

use super::perception::{is_edible_at, is_hazard_at};
use super::physics::AgentPose;
use super::tuning::AgentTuning;
use super::types::{AgentKinds, Body, Head, MAX_PANIC, MAX_RESOURCE};
use super::AgentWorld;

/// Facts about this tick that the passive effects depend on.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TickFacts {
    pub tick: u64,
    pub moved: bool,
    pub idle: bool,
}

/// Every passive effect for one living body, in a fixed order, then the clamp.
pub(crate) fn apply_passive(
    world: &mut AgentWorld,
    kinds: &AgentKinds,
    tuning: &AgentTuning,
    body: &mut Body,
    head: Option<&mut Head>,
    pose: &AgentPose,
    facts: TickFacts,
) {
    apply_hazards(world, kinds, tuning, body, pose);
    apply_thermal(world, tuning, body, pose);
    if let (Some(head), Some(head_pos)) = (head, pose.head) {
        apply_breath(world, tuning, body, head, head_pos, facts.tick);
    }
    apply_hunger(tuning, body);
    try_feed(world, tuning, body, pose);
    apply_stamina(tuning, body, facts);
    body.panic = (body.panic - tuning.panic_decay).max(0.0);
    body.clamp_resources();
}

fn neighborhood(center: GridPos) -> impl Iterator<Item = GridPos> {
    (-1..=1).flat_map(move |dy| (-1..=1).map(move |dx| center.offset(dx, dy)))
}

fn parts(pose: &AgentPose) -> impl Iterator<Item = GridPos> {
    std::iter::once(pose.body).chain(pose.head)
}

pub(crate) fn hazard_hits(
    world: &AgentWorld,
    kinds: &AgentKinds,
    tuning: &AgentTuning,
    pose: &AgentPose,
) -> u32 {
    parts(pose)
        .flat_map(neighborhood)
        .filter(|pos| is_hazard_at(world, kinds, tuning, *pos))
        .count() as u32
}

fn apply_hazards(
    world: &AgentWorld,
    kinds: &AgentKinds,
    tuning: &AgentTuning,
    body: &mut Body,
    pose: &AgentPose,
) {
    let hits = hazard_hits(world, kinds, tuning, pose);
    if hits == 0 {
        return;
    }
    body.health -= hits as f32 * tuning.hazard_damage;
    body.panic = (body.panic + hits as f32 * tuning.hazard_panic).min(MAX_PANIC);
    debug!(agent = body.id.0, hits, health = body.health, "hazard_contact");
}

fn apply_thermal(world: &AgentWorld, tuning: &AgentTuning, body: &mut Body, pose: &AgentPose) {
    for pos in parts(pose) {
        let Some(cell) = world.grid().get(pos) else {
            continue;
        };
        if cell.temperature > tuning.thermal_high || cell.temperature < tuning.thermal_low {
            body.health -= tuning.thermal_damage;
        }
    }
}

/// Liquid cells among the head and its four orthogonal neighbours.
pub(crate) fn liquid_around(world: &AgentWorld, head_pos: GridPos) -> usize {
    std::iter::once(head_pos)
        .chain(head_pos.orthogonal_neighbors())
        .filter(|pos| world.def_at(*pos).is_some_and(|def| def.is_liquid()))
        .count()
}

fn apply_breath(
    world: &AgentWorld,
    tuning: &AgentTuning,
    body: &mut Body,
    head: &mut Head,
    head_pos: GridPos,
    tick: u64,
) {
    if liquid_around(world, head_pos) >= tuning.drown_liquid_neighbors {
        body.oxygen -= tuning.oxygen_drain;
        if head.breath - tuning.breath_drain < 0.0 {
            head.breath = 0.0;
            if tick % tuning.suffocation_interval_ticks.max(1) == 0 {
                body.health -= tuning.suffocation_damage;
                debug!(agent = body.id.0, health = body.health, "suffocating");
            }
        } else {
            head.breath -= tuning.breath_drain;
        }
    } else {
        head.breath = (head.breath + tuning.breath_regen).min(MAX_RESOURCE);
        body.oxygen += tuning.oxygen_regen;
    }
    head.breath = head.breath.clamp(0.0, MAX_RESOURCE);
}

fn apply_hunger(tuning: &AgentTuning, body: &mut Body) {
    body.hunger += tuning.hunger_rate;
    if body.hunger > MAX_RESOURCE {
        body.health -= tuning.starvation_damage;
    }
}

/// Consumes at most one edible cell touching either part.
pub(crate) fn try_feed(
    world: &mut AgentWorld,
    tuning: &AgentTuning,
    body: &mut Body,
    pose: &AgentPose,
) -> bool {
    if body.hunger <= tuning.eat_threshold {
        return false;
    }
    let Some(food_pos) = parts(pose)
        .flat_map(neighborhood)
        .find(|pos| is_edible_at(world, *pos))
    else {
        return false;
    };
    world.remove(food_pos);
    body.hunger = (body.hunger - tuning.eat_relief).max(0.0);
    body.health += tuning.eat_health;
    body.stamina += tuning.eat_stamina;
    debug!(agent = body.id.0, hunger = body.hunger, "agent_fed");
    true
}

fn apply_stamina(tuning: &AgentTuning, body: &mut Body, facts: TickFacts) {
    if facts.idle {
        body.stamina += tuning.stamina_regen_idle;
    } else if !facts.moved {
        body.stamina += tuning.stamina_regen_still;
    }
}
