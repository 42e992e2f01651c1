pub mod app;
pub mod content;
pub mod world;

pub use app::{
    run_headless, EventOrigin, InputAction, KeyInputTracker, LoopConfig, LoopMetricsSnapshot,
    LoopSummary, Simulation, TickHooks, TickReport,
};
pub use content::{
    builtin_cell_registry, compile_cell_registry, parse_cell_defs, CellCategory, CellDefError,
    CellTypeDef, CellTypeId, CellTypeRegistry, DefErrorCode, SourceLocation,
};
pub use world::{AuxPolicy, Cell, CellGrid, CellWorld, GridError, GridPos};
