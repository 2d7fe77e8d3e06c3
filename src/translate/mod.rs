//! Name resolution and checking: lowers the syntax tree into [`crate::ast`].
//!
//! Errors:
//! - unknown type
//! - duplicated type definition, or redefinition of a primitive
//! - duplicated field (including names derived from short fields)
//! - duplicated sumstr variant
//! - optional sum variant
//!
//! Warnings (see [`lint`]): non-camelCase field names, non-PascalCase type names.
//!
//! Problems are collected; translation always produces a full set of
//! definitions.

pub mod lint;
mod symbols;

use std::collections::{BTreeSet, HashSet};

use thiserror::Error;

pub use lint::{LintKind, LintWarning};
pub use symbols::{is_primitive, SymbolKind, SymbolTable, PRIMITIVE_TYPES};

use crate::ast;
use crate::lex::{Location, Token};
use crate::syntax;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeErrorKind {
    #[error("Unknown type {0}")]
    UnknownType(String),

    #[error("Duplicated identifier: {0}")]
    DuplicatedIdentifier(String),

    #[error("Cannot redefine primitive type: {0}")]
    PrimitiveRedefinition(String),

    #[error("Duplicated field: {0}")]
    DuplicatedField(String),

    #[error("The name of this field derives to: {0}, and its duplicated.")]
    DuplicatedDerivedField(String),

    #[error("Duplicated sumstr variant: {0}")]
    DuplicatedVariant(String),

    #[error("Sum variant {0} cannot be optional, sum variants cannot be optional.")]
    OptionalSumVariant(String),

    #[error("Invalid JSON name {0:?}: commas, backticks, quotes, backslashes and control characters are not allowed")]
    InvalidJsonName(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Type error at {}: {kind}", .loc.start)]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub loc: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Emit naming-convention warnings
    pub naming_warnings: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            naming_warnings: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Translation {
    pub definitions: Vec<ast::Definition>,
    /// Primitive type names referenced anywhere in the schema
    pub used_primitives: BTreeSet<String>,
    pub errors: Vec<TypeError>,
    pub warnings: Vec<LintWarning>,
}

impl Translation {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn uses_primitive(&self, name: &str) -> bool {
        self.used_primitives.contains(name)
    }
}

pub fn translate(definitions: &[syntax::Definition], options: TranslateOptions) -> Translation {
    let mut translator = Translator::new(options);
    translator.fill_symbol_table(definitions);
    let definitions = definitions
        .iter()
        .map(|d| translator.translate_definition(d))
        .collect();
    tracing::debug!(
        errors = translator.errors.len(),
        warnings = translator.warnings.len(),
        "Translated definitions"
    );
    Translation {
        definitions,
        used_primitives: translator.used_primitives,
        errors: translator.errors,
        warnings: translator.warnings,
    }
}

struct Translator {
    options: TranslateOptions,
    symbols: SymbolTable,
    used_primitives: BTreeSet<String>,
    errors: Vec<TypeError>,
    warnings: Vec<LintWarning>,
}

impl Translator {
    fn new(options: TranslateOptions) -> Self {
        Self {
            options,
            symbols: SymbolTable::new(),
            used_primitives: BTreeSet::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn error(&mut self, kind: TypeErrorKind, loc: Location) {
        self.errors.push(TypeError { kind, loc });
    }

    fn warn(&mut self, warning: Option<LintWarning>) {
        if self.options.naming_warnings {
            self.warnings.extend(warning);
        }
    }

    fn fill_symbol_table(&mut self, definitions: &[syntax::Definition]) {
        for definition in definitions {
            let kind = match definition {
                syntax::Definition::Product(_) => SymbolKind::Product,
                syntax::Definition::Sum(_) => SymbolKind::Sum,
                syntax::Definition::SumStr(_) => SymbolKind::SumStr,
            };
            let id = definition.id();
            if !self.symbols.add(&id.value, kind) {
                let error = if is_primitive(&id.value) {
                    TypeErrorKind::PrimitiveRedefinition(id.value.clone())
                } else {
                    TypeErrorKind::DuplicatedIdentifier(id.value.clone())
                };
                self.error(error, id.loc);
            }
            self.warn(lint::check_type_name(&id.value, id.loc));
        }
    }

    fn translate_definition(&mut self, definition: &syntax::Definition) -> ast::Definition {
        match definition {
            syntax::Definition::Product(p) => ast::Definition::Product(self.translate_product(p)),
            syntax::Definition::Sum(s) => ast::Definition::Sum(self.translate_sum(s)),
            syntax::Definition::SumStr(s) => ast::Definition::SumStr(self.translate_sum_str(s)),
        }
    }

    fn translate_product(&mut self, product: &syntax::Product) -> ast::Product {
        let mut seen = HashSet::new();
        let fields = product
            .fields
            .iter()
            .map(|f| self.translate_field(f, &mut seen))
            .collect();
        ast::Product {
            id: product.id.value.clone(),
            fields,
        }
    }

    fn translate_sum(&mut self, sum: &syntax::Sum) -> ast::Sum {
        let mut seen = HashSet::new();
        let mut variants = Vec::with_capacity(sum.variants.len());
        for variant in &sum.variants {
            let field = self.translate_field(variant, &mut seen);
            if field.ty.is_nullable() {
                self.error(
                    TypeErrorKind::OptionalSumVariant(field.id.clone()),
                    variant.id().loc,
                );
            }
            variants.push(field);
        }
        ast::Sum {
            id: sum.id.value.clone(),
            variants,
        }
    }

    fn translate_sum_str(&mut self, sum_str: &syntax::SumStr) -> ast::SumStr {
        let mut seen = HashSet::new();
        let mut variants = Vec::with_capacity(sum_str.variants.len());
        for variant in &sum_str.variants {
            if !seen.insert(variant.id.value.clone()) {
                self.error(
                    TypeErrorKind::DuplicatedVariant(variant.id.value.clone()),
                    variant.id.loc,
                );
            }
            variants.push(ast::SumStrVariant {
                id: variant.id.value.clone(),
                json_name: variant.json_name.as_ref().map(|t| t.value.clone()),
            });
        }
        ast::SumStr {
            id: sum_str.id.value.clone(),
            variants,
        }
    }

    fn translate_field(&mut self, field: &syntax::Field, seen: &mut HashSet<String>) -> ast::Field {
        match field {
            syntax::Field::Full(full) => {
                let id = full.id.value.clone();
                if !seen.insert(id.clone()) {
                    self.error(TypeErrorKind::DuplicatedField(id.clone()), full.id.loc);
                }
                self.warn(lint::check_field_name(&id, full.id.loc));
                if let Some(json_name) = &full.json_name {
                    if !is_valid_json_name(&json_name.value) {
                        self.error(
                            TypeErrorKind::InvalidJsonName(json_name.value.clone()),
                            json_name.loc,
                        );
                    }
                }
                ast::Field {
                    id,
                    json_name: full.json_name.as_ref().map(|t| t.value.clone()),
                    ty: self.translate_type(&full.ty),
                }
            }
            syntax::Field::Short(short) => {
                let id = lower_case_first_letter(&short.id.value);
                if !seen.insert(id.clone()) {
                    self.error(
                        TypeErrorKind::DuplicatedDerivedField(id.clone()),
                        short.id.loc,
                    );
                }
                let ty = self.resolve_ident(&short.id, short.nullable.is_some());
                ast::Field {
                    id,
                    json_name: None,
                    ty,
                }
            }
        }
    }

    fn translate_type(&mut self, ty: &syntax::TypeExpr) -> ast::Type {
        match ty {
            syntax::TypeExpr::Ident(ident) => {
                self.resolve_ident(&ident.id, ident.nullable.is_some())
            }
            syntax::TypeExpr::List(list) => {
                let inner = self.translate_type(&list.inner);
                ast::Type::list(inner, list.nullable.is_some())
            }
        }
    }

    fn resolve_ident(&mut self, id: &Token, nullable: bool) -> ast::Type {
        match self.symbols.get(&id.value) {
            Some(SymbolKind::Primitive) => {
                self.used_primitives.insert(id.value.clone());
            }
            Some(_) => {}
            None => self.error(TypeErrorKind::UnknownType(id.value.clone()), id.loc),
        }
        ast::Type::ident(id.value.clone(), nullable)
    }
}

/// JSON renames end up inside Go struct tags, which have no escaping
fn is_valid_json_name(name: &str) -> bool {
    !name
        .chars()
        .any(|c| matches!(c, ',' | '`' | '"' | '\\') || c.is_control())
}

fn lower_case_first_letter(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
