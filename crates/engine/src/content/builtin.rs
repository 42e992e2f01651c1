use std::path::Path;

use super::compiler::parse_cell_defs;
use super::database::CellTypeRegistry;

const BUILTIN_CELL_DEFS: &str = include_str!("../../assets/cells.xml");

/// The stock cell types every world starts from.
pub fn builtin_cell_registry() -> CellTypeRegistry {
    let defs = parse_cell_defs("builtin", Path::new("assets/cells.xml"), BUILTIN_CELL_DEFS)
        .unwrap_or_else(|error| panic!("embedded cell defs are invalid: {error}"));
    CellTypeRegistry::from_defs(defs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::CellCategory;

    #[test]
    fn builtin_registry_has_core_types() {
        let registry = builtin_cell_registry();
        for name in ["stone", "wall", "sand", "water", "lava", "fire", "food"] {
            assert!(registry.id_by_name(name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn builtin_flags_match_roles() {
        let registry = builtin_cell_registry();
        let def = |name: &str| {
            registry
                .def(registry.id_by_name(name).expect("id"))
                .expect("def")
                .clone()
        };
        assert!(def("lava").hazard);
        assert!(def("food").edible);
        assert!(def("wall").protected);
        assert_eq!(def("water").category, CellCategory::Liquid);
        assert!(!def("water").hazard);
    }
}
