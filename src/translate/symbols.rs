use std::collections::HashMap;

/// Built-in type names every schema can reference
pub const PRIMITIVE_TYPES: &[&str] = &["Float", "Str", "Bool", "Int", "Any", "Object", "Date"];

pub fn is_primitive(name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Primitive,
    Product,
    Sum,
    SumStr,
}

/// Names visible to type references, seeded with the primitives
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: HashMap<String, SymbolKind>,
}

impl SymbolTable {
    pub fn new() -> Self {
        let symbols = PRIMITIVE_TYPES
            .iter()
            .map(|name| ((*name).to_string(), SymbolKind::Primitive))
            .collect();
        Self { symbols }
    }

    /// Returns false (and keeps the existing entry) if `name` is taken
    pub fn add(&mut self, name: &str, kind: SymbolKind) -> bool {
        if self.symbols.contains_key(name) {
            return false;
        }
        self.symbols.insert(name.to_string(), kind);
        true
    }

    pub fn get(&self, name: &str) -> Option<SymbolKind> {
        self.symbols.get(name).copied()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
