//! Concrete syntax tree produced by the parser.
//!
//! Nodes keep their tokens so the language server can highlight them and
//! diagnostics can point at them. Placeholders inserted during error recovery
//! carry `Token::missing == true`.

use crate::lex::Token;

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Ident(TypeIdent),
    List(Box<ListType>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeIdent {
    pub id: Token,
    pub nullable: Option<Token>,
}

/// `[]?T` is a nullable list of `T`; `[]T?` is a list of nullable `T`
#[derive(Debug, Clone, PartialEq)]
pub struct ListType {
    pub brackets: Token,
    pub nullable: Option<Token>,
    pub inner: TypeExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// `name "jsonName"? Type,`
    Full(FullField),
    /// `Type?,` - a field named after its type
    Short(ShortField),
}

impl Field {
    pub fn id(&self) -> &Token {
        match self {
            Field::Full(f) => &f.id,
            Field::Short(f) => &f.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FullField {
    pub id: Token,
    pub json_name: Option<Token>,
    pub ty: TypeExpr,
    pub separator: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShortField {
    pub id: Token,
    pub nullable: Option<Token>,
    pub separator: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub keyword: Token,
    pub id: Token,
    pub lbrace: Token,
    pub fields: Vec<Field>,
    pub rbrace: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sum {
    pub keyword: Token,
    pub id: Token,
    pub lbrace: Token,
    pub variants: Vec<Field>,
    pub rbrace: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SumStr {
    pub keyword: Token,
    pub id: Token,
    pub lbrace: Token,
    pub variants: Vec<SumStrVariant>,
    pub rbrace: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SumStrVariant {
    pub id: Token,
    pub json_name: Option<Token>,
    pub separator: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Product(Product),
    Sum(Sum),
    SumStr(SumStr),
}

impl Definition {
    /// The defined type's name token
    pub fn id(&self) -> &Token {
        match self {
            Definition::Product(p) => &p.id,
            Definition::Sum(s) => &s.id,
            Definition::SumStr(s) => &s.id,
        }
    }

    pub fn keyword(&self) -> &Token {
        match self {
            Definition::Product(p) => &p.keyword,
            Definition::Sum(s) => &s.keyword,
            Definition::SumStr(s) => &s.keyword,
        }
    }
}
