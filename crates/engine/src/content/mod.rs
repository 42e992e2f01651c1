mod builtin;
mod compiler;
mod database;
mod discovery;

pub use builtin::builtin_cell_registry;
pub use compiler::{
    compile_cell_registry, parse_cell_defs, CellDefError, DefErrorCode, SourceLocation,
};
pub use database::{CellCategory, CellTypeDef, CellTypeId, CellTypeRegistry};
