//! Resolved schema definitions, stripped of tokens and ready for generators.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Ident { id: String, nullable: bool },
    List { nullable: bool, inner: Box<Type> },
}

impl Type {
    pub fn ident(id: impl Into<String>, nullable: bool) -> Self {
        Type::Ident {
            id: id.into(),
            nullable,
        }
    }

    pub fn list(inner: Type, nullable: bool) -> Self {
        Type::List {
            nullable,
            inner: Box::new(inner),
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Type::Ident { nullable, .. } | Type::List { nullable, .. } => *nullable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub id: String,
    /// Wire name override; the field id is used when absent
    pub json_name: Option<String>,
    pub ty: Type,
}

impl Field {
    /// Key this field is serialized under
    pub fn json_key(&self) -> &str {
        self.json_name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sum {
    pub id: String,
    pub variants: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumStr {
    pub id: String,
    pub variants: Vec<SumStrVariant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumStrVariant {
    pub id: String,
    pub json_name: Option<String>,
}

impl SumStrVariant {
    /// String literal this variant is serialized as
    pub fn value(&self) -> &str {
        self.json_name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    Product(Product),
    Sum(Sum),
    SumStr(SumStr),
}

impl Definition {
    pub fn id(&self) -> &str {
        match self {
            Definition::Product(p) => &p.id,
            Definition::Sum(s) => &s.id,
            Definition::SumStr(s) => &s.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullability_is_top_level_only() {
        let ty = Type::list(Type::ident("Str", true), false);
        assert!(!ty.is_nullable());
        assert!(Type::list(Type::ident("Str", false), true).is_nullable());
    }

    #[test]
    fn test_json_key_prefers_rename() {
        let field = Field {
            id: "name".to_string(),
            json_name: Some("$name".to_string()),
            ty: Type::ident("Str", false),
        };
        assert_eq!(field.json_key(), "$name");
    }
}
