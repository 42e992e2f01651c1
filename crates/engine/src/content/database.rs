use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellTypeId(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellCategory {
    Solid,
    Powder,
    Liquid,
    Gas,
    Energy,
    Organic,
    Tool,
    Special,
}

impl CellCategory {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "Solid" => Some(Self::Solid),
            "Powder" => Some(Self::Powder),
            "Liquid" => Some(Self::Liquid),
            "Gas" => Some(Self::Gas),
            "Energy" => Some(Self::Energy),
            "Organic" => Some(Self::Organic),
            "Tool" => Some(Self::Tool),
            "Special" => Some(Self::Special),
            _ => None,
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Self::Solid => "Solid",
            Self::Powder => "Powder",
            Self::Liquid => "Liquid",
            Self::Gas => "Gas",
            Self::Energy => "Energy",
            Self::Organic => "Organic",
            Self::Tool => "Tool",
            Self::Special => "Special",
        }
    }

    /// Liquids and gases can be displaced by anything denser stepping into them.
    pub fn is_displaceable(self) -> bool {
        matches!(self, Self::Liquid | Self::Gas)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellTypeDef {
    pub id: CellTypeId,
    pub def_name: String,
    pub label: String,
    pub category: CellCategory,
    pub density: f32,
    pub temperature: f32,
    pub hazard: bool,
    pub edible: bool,
    pub protected: bool,
    pub heat_source: bool,
}

impl CellTypeDef {
    pub fn new(def_name: &str, category: CellCategory) -> Self {
        Self {
            id: CellTypeId(0),
            def_name: def_name.to_string(),
            label: def_name.to_string(),
            category,
            density: 1.0,
            temperature: 20.0,
            hazard: false,
            edible: false,
            protected: false,
            heat_source: false,
        }
    }

    pub fn is_liquid(&self) -> bool {
        self.category == CellCategory::Liquid
    }
}

#[derive(Debug, Default, Clone)]
pub struct CellTypeRegistry {
    defs: Vec<CellTypeDef>,
    ids_by_name: HashMap<String, CellTypeId>,
}

impl CellTypeRegistry {
    pub(crate) fn from_defs(defs: Vec<CellTypeDef>) -> Self {
        let mut registry = Self::default();
        for def in defs {
            registry.register(def);
        }
        registry
    }

    /// Adds `def`, or replaces the existing def with the same name while
    /// keeping its id stable. Returns `None` once every `u16` id is taken.
    pub fn register(&mut self, mut def: CellTypeDef) -> Option<CellTypeId> {
        if let Some(id) = self.ids_by_name.get(&def.def_name).copied() {
            def.id = id;
            self.defs[usize::from(id.0)] = def;
            return Some(id);
        }
        let id = CellTypeId(u16::try_from(self.defs.len()).ok()?);
        def.id = id;
        self.ids_by_name.insert(def.def_name.clone(), id);
        self.defs.push(def);
        Some(id)
    }

    pub fn id_by_name(&self, name: &str) -> Option<CellTypeId> {
        self.ids_by_name.get(name).copied()
    }

    pub fn def(&self, id: CellTypeId) -> Option<&CellTypeDef> {
        self.defs.get(id.0 as usize)
    }

    pub fn defs(&self) -> &[CellTypeDef] {
        &self.defs
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
