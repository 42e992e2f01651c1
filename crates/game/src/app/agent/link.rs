//! Head/body pairing by shared id. The link is looked up every tick from
//! position and neighbourhood; nothing holds a reference to the other part.

use engine::GridPos;

use super::types::{AgentCell, AgentId, Body, Head};
use super::AgentWorld;

pub(crate) fn body_at(world: &AgentWorld, pos: GridPos) -> Option<&Body> {
    match &world.grid().get(pos)?.payload {
        AgentCell::Body(body) => Some(body),
        _ => None,
    }
}

pub(crate) fn body_at_mut(world: &mut AgentWorld, pos: GridPos) -> Option<&mut Body> {
    match &mut world.grid_mut().get_mut(pos)?.payload {
        AgentCell::Body(body) => Some(body),
        _ => None,
    }
}

pub(crate) fn head_at(world: &AgentWorld, pos: GridPos) -> Option<&Head> {
    match &world.grid().get(pos)?.payload {
        AgentCell::Head(head) => Some(head),
        _ => None,
    }
}

pub(crate) fn head_at_mut(world: &mut AgentWorld, pos: GridPos) -> Option<&mut Head> {
    match &mut world.grid_mut().get_mut(pos)?.payload {
        AgentCell::Head(head) => Some(head),
        _ => None,
    }
}

pub(crate) fn find_head(
    world: &AgentWorld,
    body_pos: GridPos,
    id: AgentId,
    radius: i32,
) -> Option<GridPos> {
    search_near(world, body_pos.above(), body_pos, radius, |cell| {
        matches!(cell, AgentCell::Head(head) if head.id == id)
    })
}

pub(crate) fn find_body(
    world: &AgentWorld,
    head_pos: GridPos,
    id: AgentId,
    radius: i32,
) -> Option<GridPos> {
    search_near(world, head_pos.below(), head_pos, radius, |cell| {
        matches!(cell, AgentCell::Body(body) if body.id == id)
    })
}

/// Checks the expected slot first, then rings of growing Chebyshev radius.
fn search_near(
    world: &AgentWorld,
    expected: GridPos,
    origin: GridPos,
    radius: i32,
    is_target: impl Fn(&AgentCell) -> bool,
) -> Option<GridPos> {
    let hit = |pos: GridPos| {
        world
            .grid()
            .get(pos)
            .is_some_and(|cell| is_target(&cell.payload))
    };
    if hit(expected) {
        return Some(expected);
    }
    for ring in 1..=radius.max(0) {
        for dy in -ring..=ring {
            for dx in -ring..=ring {
                if dx.abs() != ring && dy.abs() != ring {
                    continue;
                }
                let pos = origin.offset(dx, dy);
                if hit(pos) {
                    return Some(pos);
                }
            }
        }
    }
    None
}

/// Foreign-agent lookup for a cell that is either part: resolves to the body.
pub(crate) fn owning_body(world: &AgentWorld, pos: GridPos, radius: i32) -> Option<GridPos> {
    match &world.grid().get(pos)?.payload {
        AgentCell::Body(_) => Some(pos),
        AgentCell::Head(head) => find_body(world, pos, head.id, radius),
        AgentCell::Inert => None,
    }
}
