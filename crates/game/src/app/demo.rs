use engine::{CellGrid, CellTypeId, CellTypeRegistry, CellWorld, GridError, GridPos};
use tracing::info;

use super::agent::{AgentCell, AgentKinds, AgentWorld};
use super::config::DemoWorldConfig;

/// A walled arena: stone floor, a water basin, a lava strip, food, a sand
/// pile that settles on the first ticks, and two agent spawners.
pub(crate) fn build_demo_world(
    config: &DemoWorldConfig,
    registry: CellTypeRegistry,
    kinds: &AgentKinds,
) -> Result<AgentWorld, GridError> {
    let grid = CellGrid::<AgentCell>::new(config.width, config.height)?;
    let mut world = CellWorld::new(grid, registry);
    let w = config.width as i32;
    let h = config.height as i32;
    let floor_y = h - 1;

    if let Some(stone) = world.kind_named("stone") {
        fill(&mut world, stone, 0..w, floor_y..h);
    }
    if let Some(wall) = world.kind_named("wall") {
        fill(&mut world, wall, 0..1, 0..floor_y);
        fill(&mut world, wall, w - 1..w, 0..floor_y);
    }

    let basin_left = w * 5 / 8;
    let basin_right = basin_left + 10;
    if let (Some(stone), Some(water)) = (world.kind_named("stone"), world.kind_named("water")) {
        fill(
            &mut world,
            stone,
            basin_left..basin_left + 1,
            floor_y - 6..floor_y,
        );
        fill(
            &mut world,
            stone,
            basin_right..basin_right + 1,
            floor_y - 6..floor_y,
        );
        fill(
            &mut world,
            water,
            basin_left + 1..basin_right,
            floor_y - 5..floor_y,
        );
    }
    if let Some(lava) = world.kind_named("lava") {
        fill(
            &mut world,
            lava,
            basin_right + 3..basin_right + 6,
            floor_y - 1..floor_y,
        );
    }
    if let Some(food) = world.kind_named("food") {
        for x in [w / 4, w / 4 + 4, w / 4 + 8] {
            world.spawn(GridPos::new(x, floor_y - 1), food);
        }
    }
    if let Some(sand) = world.kind_named("sand") {
        fill(&mut world, sand, 10..14, 5..8);
    }

    for x in [w / 8, w / 2] {
        world.spawn(GridPos::new(x, floor_y - 3), kinds.spawner);
    }

    info!(
        width = config.width,
        height = config.height,
        occupied = world.grid().occupied_count(),
        "demo_world_built"
    );
    Ok(world)
}

fn fill(
    world: &mut AgentWorld,
    kind: CellTypeId,
    xs: std::ops::Range<i32>,
    ys: std::ops::Range<i32>,
) {
    for y in ys {
        for x in xs.clone() {
            world.spawn(GridPos::new(x, y), kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use engine::{builtin_cell_registry, Simulation};

    use super::*;
    use crate::app::agent::{live_body_ids, AgentSystem, AgentTuning};

    #[test]
    fn demo_world_spawns_two_agents() {
        let mut registry = builtin_cell_registry();
        let kinds = AgentKinds::register(&mut registry).expect("kinds");
        let config = DemoWorldConfig::default();
        let world = build_demo_world(&config, registry, &kinds).expect("world");
        let system = AgentSystem::new(kinds, AgentTuning::default(), 7);
        let mut sim = Simulation::new(world, system);

        for _ in 0..30 {
            sim.step();
        }
        assert_eq!(live_body_ids(sim.world()).len(), 2);
        assert!(sim.hooks().context().registry.active().is_some());
    }

    #[test]
    fn zero_width_is_rejected() {
        let mut registry = builtin_cell_registry();
        let kinds = AgentKinds::register(&mut registry).expect("kinds");
        let config = DemoWorldConfig {
            width: 0,
            ..DemoWorldConfig::default()
        };
        assert!(build_demo_world(&config, registry, &kinds).is_err());
    }
}
