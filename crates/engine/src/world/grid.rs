use thiserror::Error;

use crate::content::CellTypeId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn manhattan(self, other: GridPos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn above(self) -> Self {
        self.offset(0, -1)
    }

    pub fn below(self) -> Self {
        self.offset(0, 1)
    }

    pub fn orthogonal_neighbors(self) -> [GridPos; 4] {
        [
            self.offset(0, -1),
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(0, 1),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell<P> {
    pub kind: CellTypeId,
    pub temperature: f32,
    pub payload: P,
    pub(crate) ticked_at: Option<u64>,
}

impl<P: Default> Cell<P> {
    pub fn new(kind: CellTypeId, temperature: f32) -> Self {
        Self {
            kind,
            temperature,
            payload: P::default(),
            ticked_at: None,
        }
    }
}

/// What happens to a cell's payload when its type changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxPolicy {
    Preserve,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    ZeroSized { width: u32, height: u32 },
    #[error("grid of {width}x{height} exceeds the addressable cell count")]
    TooLarge { width: u32, height: u32 },
}

/// Dense row-major storage; `y` grows downward.
#[derive(Debug, Clone)]
pub struct CellGrid<P> {
    width: u32,
    height: u32,
    cells: Vec<Option<Cell<P>>>,
}

impl<P: Default> CellGrid<P> {
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroSized { width, height });
        }
        if width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(GridError::TooLarge { width, height });
        }
        let count = (width as usize)
            .checked_mul(height as usize)
            .ok_or(GridError::TooLarge { width, height })?;
        let mut cells = Vec::with_capacity(count);
        cells.resize_with(count, || None);
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    pub fn index_of(&self, pos: GridPos) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn get(&self, pos: GridPos) -> Option<&Cell<P>> {
        self.index_of(pos).and_then(|idx| self.cells[idx].as_ref())
    }

    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut Cell<P>> {
        let idx = self.index_of(pos)?;
        self.cells[idx].as_mut()
    }

    pub fn kind_at(&self, pos: GridPos) -> Option<CellTypeId> {
        self.get(pos).map(|cell| cell.kind)
    }

    /// In bounds and unoccupied.
    pub fn is_empty(&self, pos: GridPos) -> bool {
        self.index_of(pos).is_some_and(|idx| self.cells[idx].is_none())
    }

    pub fn is_occupied(&self, pos: GridPos) -> bool {
        self.get(pos).is_some()
    }

    /// Places `cell` at `pos` when the slot is free.
    pub fn create(&mut self, pos: GridPos, cell: Cell<P>) -> bool {
        let Some(idx) = self.index_of(pos) else {
            return false;
        };
        if self.cells[idx].is_some() {
            return false;
        }
        self.cells[idx] = Some(cell);
        true
    }

    pub fn remove(&mut self, pos: GridPos) -> Option<Cell<P>> {
        let idx = self.index_of(pos)?;
        self.cells[idx].take()
    }

    pub fn change_type(&mut self, pos: GridPos, kind: CellTypeId, policy: AuxPolicy) -> bool {
        let Some(cell) = self.get_mut(pos) else {
            return false;
        };
        cell.kind = kind;
        if policy == AuxPolicy::Reset {
            cell.payload = P::default();
        }
        true
    }

    /// Exchanges the contents of two in-bounds slots, either of which may be empty.
    pub fn swap(&mut self, a: GridPos, b: GridPos) -> bool {
        let (Some(ia), Some(ib)) = (self.index_of(a), self.index_of(b)) else {
            return false;
        };
        self.cells.swap(ia, ib);
        true
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn iter_occupied(&self) -> impl Iterator<Item = (GridPos, &Cell<P>)> + '_ {
        let width = self.width as usize;
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| {
            cell.as_ref().map(|cell| {
                (
                    GridPos::new((idx % width) as i32, (idx / width) as i32),
                    cell,
                )
            })
        })
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    pub(crate) fn mark_ticked(&mut self, pos: GridPos, tick: u64) {
        if let Some(cell) = self.get_mut(pos) {
            cell.ticked_at = Some(tick);
        }
    }
}
