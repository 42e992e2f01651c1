use tracing::trace;

use crate::content::CellTypeId;
use crate::world::{CellWorld, GridPos};

/// The two callbacks a cell-type owner plugs into the tick.
pub trait TickHooks<P> {
    /// Whether `kind` is driven by `cell_tick` instead of default settling.
    fn handles(&self, kind: CellTypeId) -> bool;

    /// Runs once per tick, before any cell is visited.
    fn global_tick(&mut self, world: &mut CellWorld<P>);

    fn cell_tick(&mut self, world: &mut CellWorld<P>, pos: GridPos);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub handled_cells: u32,
    pub settled_cells: u32,
}

pub struct Simulation<P, H> {
    world: CellWorld<P>,
    hooks: H,
}

impl<P: Default, H: TickHooks<P>> Simulation<P, H> {
    pub fn new(world: CellWorld<P>, hooks: H) -> Self {
        Self { world, hooks }
    }

    pub fn world(&self) -> &CellWorld<P> {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut CellWorld<P> {
        &mut self.world
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn into_parts(self) -> (CellWorld<P>, H) {
        (self.world, self.hooks)
    }

    /// One full tick. Every occupied cell is visited at most once even if an
    /// earlier visit moved it into a slot later in the scan.
    pub fn step(&mut self) -> TickReport {
        let tick = self.world.advance_tick();
        self.hooks.global_tick(&mut self.world);

        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };
        for pos in self.world.scan_order() {
            let Some(cell) = self.world.grid().get(pos) else {
                continue;
            };
            if cell.ticked_at == Some(tick) {
                continue;
            }
            let kind = cell.kind;
            self.world.grid_mut().mark_ticked(pos, tick);
            if self.hooks.handles(kind) {
                self.hooks.cell_tick(&mut self.world, pos);
                report.handled_cells = report.handled_cells.saturating_add(1);
            } else {
                self.world.settle(pos);
                report.settled_cells = report.settled_cells.saturating_add(1);
            }
        }
        trace!(
            tick,
            handled = report.handled_cells,
            settled = report.settled_cells,
            "tick_complete"
        );
        report
    }
}
