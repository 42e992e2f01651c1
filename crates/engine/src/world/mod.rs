mod grid;

pub use grid::{AuxPolicy, Cell, CellGrid, GridError, GridPos};

use crate::content::{CellCategory, CellTypeDef, CellTypeId, CellTypeRegistry};

pub const DEFAULT_AMBIENT_TEMPERATURE: f32 = 20.0;
const HEAT_EXCHANGE_RATE: f32 = 0.1;

/// The grid plus the type registry and the tick clock: everything a cell
/// handler is allowed to touch.
#[derive(Debug, Clone)]
pub struct CellWorld<P> {
    grid: CellGrid<P>,
    registry: CellTypeRegistry,
    tick: u64,
    ambient_temperature: f32,
}

impl<P: Default> CellWorld<P> {
    pub fn new(grid: CellGrid<P>, registry: CellTypeRegistry) -> Self {
        Self {
            grid,
            registry,
            tick: 0,
            ambient_temperature: DEFAULT_AMBIENT_TEMPERATURE,
        }
    }

    pub fn grid(&self) -> &CellGrid<P> {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut CellGrid<P> {
        &mut self.grid
    }

    pub fn registry(&self) -> &CellTypeRegistry {
        &self.registry
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub(crate) fn advance_tick(&mut self) -> u64 {
        self.tick = self.tick.saturating_add(1);
        self.tick
    }

    pub fn ambient_temperature(&self) -> f32 {
        self.ambient_temperature
    }

    pub fn set_ambient_temperature(&mut self, temperature: f32) {
        self.ambient_temperature = temperature;
    }

    pub fn def_at(&self, pos: GridPos) -> Option<&CellTypeDef> {
        self.grid.kind_at(pos).and_then(|kind| self.registry.def(kind))
    }

    pub fn kind_named(&self, name: &str) -> Option<CellTypeId> {
        self.registry.id_by_name(name)
    }

    /// Creates a cell of `kind` at its def temperature with a default payload.
    pub fn spawn(&mut self, pos: GridPos, kind: CellTypeId) -> bool {
        let temperature = self
            .registry
            .def(kind)
            .map(|def| def.temperature)
            .unwrap_or(self.ambient_temperature);
        self.grid.create(pos, Cell::new(kind, temperature))
    }

    pub fn spawn_with(&mut self, pos: GridPos, kind: CellTypeId, payload: P) -> bool {
        let temperature = self
            .registry
            .def(kind)
            .map(|def| def.temperature)
            .unwrap_or(self.ambient_temperature);
        let mut cell = Cell::new(kind, temperature);
        cell.payload = payload;
        self.grid.create(pos, cell)
    }

    pub fn remove(&mut self, pos: GridPos) -> Option<Cell<P>> {
        self.grid.remove(pos)
    }

    pub fn change_type(&mut self, pos: GridPos, kind: CellTypeId, policy: AuxPolicy) -> bool {
        self.grid.change_type(pos, kind, policy)
    }

    /// Collision-aware single step. The mover enters an empty slot, or trades
    /// places with a lighter liquid or gas. Returns the new position.
    pub fn try_step(&mut self, from: GridPos, dx: i32, dy: i32) -> Option<GridPos> {
        let mover_density = self.def_at(from)?.density;
        let to = from.offset(dx, dy);
        if !self.grid.in_bounds(to) {
            return None;
        }
        if self.grid.is_empty(to) {
            self.grid.swap(from, to);
            return Some(to);
        }
        let target = self.def_at(to)?;
        if target.category.is_displaceable() && target.density < mover_density {
            self.grid.swap(from, to);
            return Some(to);
        }
        None
    }

    /// Unconditional move: whatever occupies `to` ends up at `from`.
    pub fn reposition(&mut self, from: GridPos, to: GridPos) -> bool {
        if !self.grid.is_occupied(from) {
            return false;
        }
        self.grid.swap(from, to)
    }

    /// Generic falling: straight down, then the two lower diagonals.
    pub fn descend(&mut self, pos: GridPos) -> Option<GridPos> {
        let first_side = if self.tick % 2 == 0 { -1 } else { 1 };
        self.try_step(pos, 0, 1)
            .or_else(|| self.try_step(pos, first_side, 1))
            .or_else(|| self.try_step(pos, -first_side, 1))
    }

    /// Heat exchange with the four orthogonal neighbours. Empty or
    /// out-of-bounds neighbours count as ambient; heat sources hold their
    /// def temperature.
    pub fn apply_default_effects(&mut self, pos: GridPos) {
        let Some(def) = self.def_at(pos) else {
            return;
        };
        if def.heat_source {
            let fixed = def.temperature;
            if let Some(cell) = self.grid.get_mut(pos) {
                cell.temperature = fixed;
            }
            return;
        }
        let neighbor_sum: f32 = pos
            .orthogonal_neighbors()
            .iter()
            .map(|neighbor| {
                self.grid
                    .get(*neighbor)
                    .map(|cell| cell.temperature)
                    .unwrap_or(self.ambient_temperature)
            })
            .sum();
        let neighbor_avg = neighbor_sum / 4.0;
        if let Some(cell) = self.grid.get_mut(pos) {
            cell.temperature += (neighbor_avg - cell.temperature) * HEAT_EXCHANGE_RATE;
        }
    }

    /// Default motion for cells no hook claims: powders and liquids fall,
    /// liquids spread sideways, gases rise. Returns where the cell ended up.
    pub fn settle(&mut self, pos: GridPos) -> GridPos {
        let Some(category) = self.def_at(pos).map(|def| def.category) else {
            return pos;
        };
        let side = if self.tick % 2 == 0 { 1 } else { -1 };
        let moved = match category {
            CellCategory::Powder => self.descend(pos),
            CellCategory::Liquid => self
                .descend(pos)
                .or_else(|| self.try_step(pos, side, 0))
                .or_else(|| self.try_step(pos, -side, 0)),
            CellCategory::Gas => self
                .try_step_into_empty(pos, 0, -1)
                .or_else(|| self.try_step_into_empty(pos, side, -1))
                .or_else(|| self.try_step_into_empty(pos, -side, -1)),
            _ => None,
        };
        let settled = moved.unwrap_or(pos);
        self.apply_default_effects(settled);
        settled
    }

    fn try_step_into_empty(&mut self, from: GridPos, dx: i32, dy: i32) -> Option<GridPos> {
        let to = from.offset(dx, dy);
        if self.grid.is_empty(to) {
            self.grid.swap(from, to);
            Some(to)
        } else {
            None
        }
    }

    /// Bottom-up, with the horizontal sweep alternating by tick parity.
    pub(crate) fn scan_order(&self) -> Vec<GridPos> {
        let width = self.grid.width() as i32;
        let height = self.grid.height() as i32;
        let left_to_right = self.tick % 2 == 0;
        let mut order = Vec::with_capacity(self.grid.occupied_count());
        for y in (0..height).rev() {
            for i in 0..width {
                let x = if left_to_right { i } else { width - 1 - i };
                let pos = GridPos::new(x, y);
                if self.grid.is_occupied(pos) {
                    order.push(pos);
                }
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::builtin_cell_registry;

    fn world() -> CellWorld<()> {
        CellWorld::new(CellGrid::new(8, 8).expect("grid"), builtin_cell_registry())
    }

    fn kind(world: &CellWorld<()>, name: &str) -> CellTypeId {
        world.kind_named(name).expect("kind")
    }

    #[test]
    fn try_step_into_empty_moves_cell() {
        let mut world = world();
        let sand = kind(&world, "sand");
        let from = GridPos::new(2, 2);
        world.spawn(from, sand);

        assert_eq!(world.try_step(from, 1, 0), Some(GridPos::new(3, 2)));
        assert!(world.grid().is_empty(from));
        assert_eq!(world.grid().kind_at(GridPos::new(3, 2)), Some(sand));
    }

    #[test]
    fn try_step_displaces_lighter_liquid_only() {
        let mut world = world();
        let sand = kind(&world, "sand");
        let water = kind(&world, "water");
        let stone = kind(&world, "stone");
        world.spawn(GridPos::new(1, 1), sand);
        world.spawn(GridPos::new(1, 2), water);
        world.spawn(GridPos::new(2, 1), stone);

        assert_eq!(world.try_step(GridPos::new(1, 1), 1, 0), None);
        assert_eq!(
            world.try_step(GridPos::new(1, 1), 0, 1),
            Some(GridPos::new(1, 2))
        );
        assert_eq!(world.grid().kind_at(GridPos::new(1, 1)), Some(water));
    }

    #[test]
    fn try_step_out_of_bounds_is_absent() {
        let mut world = world();
        let sand = kind(&world, "sand");
        world.spawn(GridPos::new(0, 7), sand);
        assert_eq!(world.try_step(GridPos::new(0, 7), 0, 1), None);
        assert_eq!(world.try_step(GridPos::new(0, 7), -1, 0), None);
    }

    #[test]
    fn reposition_swaps_with_occupant() {
        let mut world = world();
        let sand = kind(&world, "sand");
        let stone = kind(&world, "stone");
        world.spawn(GridPos::new(0, 0), sand);
        world.spawn(GridPos::new(5, 5), stone);

        assert!(world.reposition(GridPos::new(0, 0), GridPos::new(5, 5)));
        assert_eq!(world.grid().kind_at(GridPos::new(5, 5)), Some(sand));
        assert_eq!(world.grid().kind_at(GridPos::new(0, 0)), Some(stone));
    }

    #[test]
    fn descend_slides_diagonally_when_blocked() {
        let mut world = world();
        let sand = kind(&world, "sand");
        let stone = kind(&world, "stone");
        world.spawn(GridPos::new(3, 3), sand);
        world.spawn(GridPos::new(3, 4), stone);

        let landed = world.descend(GridPos::new(3, 3)).expect("descend");
        assert_eq!(landed.y, 4);
        assert_ne!(landed.x, 3);
    }

    #[test]
    fn heat_source_holds_its_temperature() {
        let mut world = world();
        let lava = kind(&world, "lava");
        let pos = GridPos::new(4, 4);
        world.spawn(pos, lava);
        world.grid_mut().get_mut(pos).expect("lava").temperature = 10.0;

        world.apply_default_effects(pos);
        let temp = world.grid().get(pos).expect("lava").temperature;
        assert!((temp - 1100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn cells_drift_toward_hot_neighbours() {
        let mut world = world();
        let stone = kind(&world, "stone");
        let lava = kind(&world, "lava");
        let pos = GridPos::new(4, 4);
        world.spawn(pos, stone);
        world.spawn(pos.offset(1, 0), lava);

        world.apply_default_effects(pos);
        let temp = world.grid().get(pos).expect("stone").temperature;
        assert!(temp > 20.0);
    }

    #[test]
    fn scan_order_is_bottom_up() {
        let mut world = world();
        let stone = kind(&world, "stone");
        world.spawn(GridPos::new(1, 1), stone);
        world.spawn(GridPos::new(1, 6), stone);

        let order = world.scan_order();
        assert_eq!(order, vec![GridPos::new(1, 6), GridPos::new(1, 1)]);
    }
}
