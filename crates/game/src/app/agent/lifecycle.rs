use engine::{AuxPolicy, GridPos};
use rand::Rng;
use tracing::{debug, info};

use super::context::AgentContext;
use super::tuning::AgentTuning;
use super::types::{AgentCell, AgentId, AgentKinds, Body, Head, Vitality};
use super::AgentWorld;

/// Turns a spawner seed into a body/head pair. The body goes below the seed
/// when it can, otherwise the head goes above; with no room the seed is
/// discarded.
pub(crate) fn convert_seed(
    world: &mut AgentWorld,
    kinds: &AgentKinds,
    ctx: &mut AgentContext,
    seed: GridPos,
) -> Option<AgentId> {
    let (body_pos, head_pos) = if world.grid().is_empty(seed.below()) {
        (seed.below(), seed)
    } else if world.grid().is_empty(seed.above()) {
        (seed, seed.above())
    } else {
        world.remove(seed);
        debug!(x = seed.x, y = seed.y, "agent_spawn_discarded");
        return None;
    };

    let id = ctx.registry.alloc_id();
    let facing = if ctx.rng.gen_bool(0.5) { 1 } else { -1 };
    let body = AgentCell::Body(Body::new(id, facing));
    let head = AgentCell::Head(Head::new(id));

    world.remove(seed);
    world.spawn_with(body_pos, kinds.body, body);
    world.spawn_with(head_pos, kinds.head, head);
    ctx.registry.adopt_spawned(id);
    info!(
        agent = id.0,
        body_x = body_pos.x,
        body_y = body_pos.y,
        facing,
        "agent_spawned"
    );
    Some(id)
}

/// Places a seed at `pos` and converts it on the spot.
pub(crate) fn spawn_agent(
    world: &mut AgentWorld,
    kinds: &AgentKinds,
    ctx: &mut AgentContext,
    pos: GridPos,
) -> Option<AgentId> {
    if !world.spawn(pos, kinds.spawner) {
        return None;
    }
    convert_seed(world, kinds, ctx, pos)
}

pub(crate) fn decay_due(vitality: Vitality, tick: u64, tuning: &AgentTuning) -> bool {
    vitality
        .death_tick()
        .is_some_and(|since| tick.saturating_sub(since) >= tuning.decay_ticks)
}

/// Replaces a dead part with inert remains.
pub(crate) fn decay_to_remains(world: &mut AgentWorld, kinds: &AgentKinds, pos: GridPos) {
    let id = world.grid().get(pos).and_then(|cell| cell.payload.agent_id());
    if world.change_type(pos, kinds.remains, AuxPolicy::Reset) {
        info!(agent = ?id.map(|id| id.0), x = pos.x, y = pos.y, "agent_decayed");
    }
}

/// Leaves a blood marker above `pos` when the slot is free.
pub(crate) fn bleed(world: &mut AgentWorld, kinds: &AgentKinds, pos: GridPos) -> bool {
    let above = pos.above();
    world.grid().is_empty(above) && world.spawn(above, kinds.blood)
}

#[cfg(test)]
mod tests {
    use engine::{builtin_cell_registry, CellGrid, CellWorld};

    use super::*;

    fn setup() -> (AgentWorld, AgentKinds, AgentContext) {
        let mut registry = builtin_cell_registry();
        let kinds = AgentKinds::register(&mut registry).expect("kinds");
        let world = CellWorld::new(CellGrid::new(24, 16).expect("grid"), registry);
        (world, kinds, AgentContext::new(1))
    }

    #[test]
    fn seed_prefers_body_below() {
        let (mut world, kinds, mut ctx) = setup();
        let id = spawn_agent(&mut world, &kinds, &mut ctx, GridPos::new(10, 10)).expect("spawn");

        assert_eq!(world.grid().kind_at(GridPos::new(10, 11)), Some(kinds.body));
        assert_eq!(world.grid().kind_at(GridPos::new(10, 10)), Some(kinds.head));
        assert_eq!(ctx.registry.active(), Some(id));
    }

    #[test]
    fn seed_on_ground_puts_head_above() {
        let (mut world, kinds, mut ctx) = setup();
        let stone = world.kind_named("stone").expect("stone");
        world.spawn(GridPos::new(4, 6), stone);

        spawn_agent(&mut world, &kinds, &mut ctx, GridPos::new(4, 5)).expect("spawn");
        assert_eq!(world.grid().kind_at(GridPos::new(4, 5)), Some(kinds.body));
        assert_eq!(world.grid().kind_at(GridPos::new(4, 4)), Some(kinds.head));
    }

    #[test]
    fn boxed_in_seed_is_discarded() {
        let (mut world, kinds, mut ctx) = setup();
        let stone = world.kind_named("stone").expect("stone");
        world.spawn(GridPos::new(4, 6), stone);
        world.spawn(GridPos::new(4, 4), stone);
        world.spawn(GridPos::new(4, 5), kinds.spawner);

        let seed = GridPos::new(4, 5);
        assert_eq!(convert_seed(&mut world, &kinds, &mut ctx, seed), None);
        assert!(world.grid().is_empty(GridPos::new(4, 5)));
        assert_eq!(ctx.registry.active(), None);
    }

    #[test]
    fn fresh_agent_has_full_resources() {
        let (mut world, kinds, mut ctx) = setup();
        spawn_agent(&mut world, &kinds, &mut ctx, GridPos::new(10, 10)).expect("spawn");
        let cell = world.grid().get(GridPos::new(10, 11)).expect("body");
        let AgentCell::Body(body) = &cell.payload else {
            panic!("expected body payload");
        };
        assert_eq!(body.health, 100.0);
        assert_eq!(body.stamina, 100.0);
        assert_eq!(body.oxygen, 100.0);
        assert_eq!(body.hunger, 0.0);
        assert_eq!(body.panic, 0.0);
        assert!(body.facing == 1 || body.facing == -1);
    }

    #[test]
    fn decay_waits_full_duration() {
        let tuning = AgentTuning::default();
        let dead = Vitality::Dead { since_tick: 40 };
        assert!(!decay_due(dead, 40 + tuning.decay_ticks - 1, &tuning));
        assert!(decay_due(dead, 40 + tuning.decay_ticks, &tuning));
        assert!(!decay_due(Vitality::Alive, 10_000, &tuning));
    }
}
