use engine::GridPos;

use super::tuning::AgentTuning;
use super::types::{AgentId, AgentKinds};
use super::AgentWorld;

/// What the scan rectangle around one agent contains.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Perception {
    /// Positive means the weighted hazard centre lies to the left.
    pub hazard_score: f32,
    pub nearest_hazard: Option<i32>,
    /// Positive means food lies to the right.
    pub food_score: f32,
    pub nearest_food: Option<i32>,
}

impl Perception {
    pub(crate) fn hazard_within(&self, radius: i32) -> bool {
        self.nearest_hazard.is_some_and(|distance| distance <= radius)
    }
}

/// Hazard by def flag or by heat. Agent parts never count.
pub(crate) fn is_hazard_at(
    world: &AgentWorld,
    kinds: &AgentKinds,
    tuning: &AgentTuning,
    pos: GridPos,
) -> bool {
    let Some(cell) = world.grid().get(pos) else {
        return false;
    };
    if kinds.is_agent_part(cell.kind) || cell.kind == kinds.spawner {
        return false;
    }
    let flagged = world.registry().def(cell.kind).is_some_and(|def| def.hazard);
    flagged || cell.temperature >= tuning.hazard_temperature
}

pub(crate) fn is_edible_at(world: &AgentWorld, pos: GridPos) -> bool {
    world.def_at(pos).is_some_and(|def| def.edible)
}

pub(crate) fn perceive(
    world: &AgentWorld,
    kinds: &AgentKinds,
    tuning: &AgentTuning,
    origin: GridPos,
    self_id: AgentId,
    seek_food: bool,
) -> Perception {
    let mut perception = Perception::default();
    let mut food_candidates = Vec::new();

    for dy in -tuning.scan_up..=tuning.scan_down {
        for dx in -tuning.scan_half_width..=tuning.scan_half_width {
            if dx == 0 && dy == 0 {
                continue;
            }
            let pos = origin.offset(dx, dy);
            let Some(cell) = world.grid().get(pos) else {
                continue;
            };
            if cell.payload.agent_id() == Some(self_id) {
                continue;
            }
            let distance = origin.manhattan(pos);
            if is_hazard_at(world, kinds, tuning, pos) {
                perception.hazard_score += (origin.x - pos.x) as f32 / distance as f32;
                perception.nearest_hazard = Some(
                    perception
                        .nearest_hazard
                        .map_or(distance, |nearest| nearest.min(distance)),
                );
            } else if seek_food && is_edible_at(world, pos) {
                food_candidates.push((pos, distance));
            }
        }
    }

    if seek_food && !perception.hazard_within(tuning.hazard_near_radius) {
        for (pos, distance) in food_candidates {
            perception.food_score += (pos.x - origin.x) as f32 / distance as f32;
            perception.nearest_food = Some(
                perception
                    .nearest_food
                    .map_or(distance, |nearest| nearest.min(distance)),
            );
        }
    }

    perception
}

#[cfg(test)]
mod tests {
    use engine::{builtin_cell_registry, CellGrid, CellWorld};

    use super::*;

    fn setup() -> (AgentWorld, AgentKinds) {
        let mut registry = builtin_cell_registry();
        let kinds = AgentKinds::register(&mut registry).expect("kinds");
        let world = CellWorld::new(CellGrid::new(24, 16).expect("grid"), registry);
        (world, kinds)
    }

    #[test]
    fn hazard_to_the_right_scores_left() {
        let (mut world, kinds) = setup();
        let lava = world.kind_named("lava").expect("lava");
        let origin = GridPos::new(10, 8);
        world.spawn(origin.offset(2, 0), lava);

        let perception = perceive(
            &world,
            &kinds,
            &AgentTuning::default(),
            origin,
            AgentId(1),
            false,
        );
        assert!(perception.hazard_score < 0.0);
        assert_eq!(perception.nearest_hazard, Some(2));
    }

    #[test]
    fn hot_cells_count_as_hazards() {
        let (mut world, kinds) = setup();
        let stone = world.kind_named("stone").expect("stone");
        let pos = GridPos::new(3, 3);
        world.spawn(pos, stone);
        world.grid_mut().get_mut(pos).expect("stone").temperature = 400.0;

        assert!(is_hazard_at(&world, &kinds, &AgentTuning::default(), pos));
    }

    #[test]
    fn cells_outside_scan_rectangle_are_ignored() {
        let (mut world, kinds) = setup();
        let lava = world.kind_named("lava").expect("lava");
        let origin = GridPos::new(10, 8);
        world.spawn(origin.offset(6, 0), lava);
        world.spawn(origin.offset(0, -5), lava);

        let perception = perceive(
            &world,
            &kinds,
            &AgentTuning::default(),
            origin,
            AgentId(1),
            false,
        );
        assert_eq!(perception.nearest_hazard, None);
    }

    #[test]
    fn food_is_only_scored_when_seeking() {
        let (mut world, kinds) = setup();
        let food = world.kind_named("food").expect("food");
        let origin = GridPos::new(10, 8);
        world.spawn(origin.offset(-3, 1), food);
        let tuning = AgentTuning::default();

        let idle = perceive(&world, &kinds, &tuning, origin, AgentId(1), false);
        assert_eq!(idle.food_score, 0.0);

        let hungry = perceive(&world, &kinds, &tuning, origin, AgentId(1), true);
        assert!(hungry.food_score < 0.0);
        assert_eq!(hungry.nearest_food, Some(4));
    }
}
