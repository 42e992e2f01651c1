use engine::{CellCategory, GridPos, InputAction, KeyInputTracker};
use tracing::{debug, info};

use super::link::{body_at_mut, owning_body};
use super::perception::is_hazard_at;
use super::tuning::AgentTuning;
use super::types::{AgentCell, AgentKinds, Body};
use super::AgentWorld;

fn near_offsets(f: i32) -> [(i32, i32); 4] {
    [(f, 0), (f, -1), (2 * f, 0), (2 * f, -1)]
}

fn far_offsets(f: i32) -> [(i32, i32); 4] {
    [(3 * f, -1), (3 * f, 0), (2 * f, -1), (2 * f, 0)]
}

fn pickup_offsets(f: i32) -> [(i32, i32); 3] {
    [(f, 0), (f, -1), (f, 1)]
}

fn reach_offsets(f: i32) -> [(i32, i32); 3] {
    [(f, 0), (f, -1), (2 * f, 0)]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InteractionOutcome {
    PickedUp,
    Dropped,
    Thrown,
    Punched,
}

/// Runs every edge-triggered action for the active agent. Each action is a
/// no-op when it finds no target or no free slot.
pub(crate) fn run_interactions(
    world: &mut AgentWorld,
    kinds: &AgentKinds,
    tuning: &AgentTuning,
    input: &KeyInputTracker,
    body: &mut Body,
    body_pos: GridPos,
) -> Vec<InteractionOutcome> {
    let mut outcomes = Vec::new();
    if input.is_edge(InputAction::PickupDrop) {
        let outcome = if body.held.is_some() {
            let offsets = near_offsets(body.facing);
            place_held(world, body, body_pos, &offsets, tuning.place_stamina_cost)
                .then_some(InteractionOutcome::Dropped)
        } else {
            pick_up(world, tuning, body, body_pos).then_some(InteractionOutcome::PickedUp)
        };
        outcomes.extend(outcome);
    }
    let near = near_offsets(body.facing);
    if input.is_edge(InputAction::Place)
        && place_held(world, body, body_pos, &near, tuning.place_stamina_cost)
    {
        outcomes.push(InteractionOutcome::Dropped);
    }
    let far = far_offsets(body.facing);
    if input.is_edge(InputAction::Throw)
        && place_held(world, body, body_pos, &far, tuning.throw_stamina_cost)
    {
        outcomes.push(InteractionOutcome::Thrown);
    }
    if input.is_edge(InputAction::Punch) && punch(world, kinds, tuning, body, body_pos) {
        outcomes.push(InteractionOutcome::Punched);
    }
    outcomes
}

fn is_pickable(world: &AgentWorld, pos: GridPos) -> bool {
    let Some(def) = world.def_at(pos) else {
        return false;
    };
    let is_agent = world
        .grid()
        .get(pos)
        .is_some_and(|cell| cell.payload.agent_id().is_some());
    !is_agent
        && !def.protected
        && !matches!(def.category, CellCategory::Tool | CellCategory::Special)
}

pub(crate) fn pick_up(
    world: &mut AgentWorld,
    tuning: &AgentTuning,
    body: &mut Body,
    body_pos: GridPos,
) -> bool {
    let Some(target) = pickup_offsets(body.facing)
        .into_iter()
        .map(|(dx, dy)| body_pos.offset(dx, dy))
        .find(|pos| is_pickable(world, *pos))
    else {
        return false;
    };
    let Some(cell) = world.remove(target) else {
        return false;
    };
    body.held = Some(cell.kind);
    body.spend_stamina(tuning.pickup_stamina_cost);
    debug!(agent = body.id.0, kind = cell.kind.0, "item_picked_up");
    true
}

pub(crate) fn place_held(
    world: &mut AgentWorld,
    body: &mut Body,
    body_pos: GridPos,
    offsets: &[(i32, i32)],
    cost: f32,
) -> bool {
    let Some(kind) = body.held else {
        return false;
    };
    let Some(slot) = offsets
        .iter()
        .map(|(dx, dy)| body_pos.offset(*dx, *dy))
        .find(|pos| world.grid().is_empty(*pos))
    else {
        return false;
    };
    if !world.spawn(slot, kind) {
        return false;
    }
    body.held = None;
    body.spend_stamina(cost);
    debug!(agent = body.id.0, kind = kind.0, x = slot.x, y = slot.y, "item_placed");
    true
}

/// Hits the first non-self cell in reach. Agents take damage, protected
/// cells absorb the blow, anything else is knocked one cell away.
pub(crate) fn punch(
    world: &mut AgentWorld,
    kinds: &AgentKinds,
    tuning: &AgentTuning,
    body: &mut Body,
    body_pos: GridPos,
) -> bool {
    let f = body.facing;
    let Some(target) = reach_offsets(f)
        .into_iter()
        .map(|(dx, dy)| body_pos.offset(dx, dy))
        .find(|pos| {
            world
                .grid()
                .get(*pos)
                .is_some_and(|cell| cell.payload.agent_id() != Some(body.id))
        })
    else {
        return false;
    };
    body.spend_stamina(tuning.punch_stamina_cost);

    let target_is_agent = world
        .grid()
        .get(target)
        .is_some_and(|cell| matches!(cell.payload, AgentCell::Body(_) | AgentCell::Head(_)));
    if target_is_agent {
        if let Some(victim_pos) = owning_body(world, target, tuning.link_search_radius) {
            if let Some(victim) = body_at_mut(world, victim_pos) {
                victim.health = (victim.health - tuning.punch_damage).max(0.0);
                info!(
                    attacker = body.id.0,
                    victim = victim.id.0,
                    health = victim.health,
                    "agent_punched"
                );
            }
        }
        return true;
    }

    if is_hazard_at(world, kinds, tuning, target) {
        body.health -= tuning.punch_hazard_damage;
    }
    if world.def_at(target).is_some_and(|def| def.protected) {
        return true;
    }
    let pushed = target.offset(f, 0);
    let lifted = target.offset(f, -1);
    if world.grid().is_empty(pushed) {
        world.reposition(target, pushed);
    } else if world.grid().is_empty(lifted) {
        world.reposition(target, lifted);
    }
    true
}
