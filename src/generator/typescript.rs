use once_cell::sync::Lazy;
use regex::Regex;

use super::{quote, CodeGenerator, GeneratorOptions, Schema, SumStyle};
use crate::ast::{Definition, Field, Product, Sum, SumStr, Type};

static TS_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid identifier regex"));

fn ts_primitive(id: &str) -> Option<&'static str> {
    match id {
        "Float" | "Int" => Some("number"),
        "Str" => Some("string"),
        "Bool" => Some("boolean"),
        "Any" => Some("unknown"),
        "Object" => Some("Record<string, unknown>"),
        // Dates travel as ISO-8601 strings in JSON
        "Date" => Some("string"),
        _ => None,
    }
}

/// Emits `export interface` / `export type` declarations
pub struct TypeScriptGenerator {
    options: GeneratorOptions,
}

impl TypeScriptGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    fn definition(&self, definition: &Definition) -> String {
        match definition {
            Definition::Product(p) => self.product(p),
            Definition::Sum(s) => self.sum(s),
            Definition::SumStr(s) => self.sum_str(s),
        }
    }

    fn product(&self, product: &Product) -> String {
        let mut out = format!("export interface {} {{\n", product.id);
        for field in &product.fields {
            let optional = if field.ty.is_nullable() { "?" } else { "" };
            out.push_str(&format!(
                "  {}{}: {};\n",
                property_key(field.json_key()),
                optional,
                render_type(&field.ty, true)
            ));
        }
        out.push_str("}\n");
        out
    }

    fn sum(&self, sum: &Sum) -> String {
        if sum.variants.is_empty() {
            return format!("export type {} = never;\n", sum.id);
        }
        let mut out = format!("export type {} =", sum.id);
        for variant in &sum.variants {
            out.push_str("\n  | { ");
            if self.options.sum_style == SumStyle::Tagged {
                out.push_str(&format!(
                    "{}: {}; ",
                    property_key(&self.options.sum_tag),
                    quote(variant.json_key())
                ));
            }
            out.push_str(&self.variant_payload(variant));
            out.push_str(" }");
        }
        out.push_str(";\n");
        out
    }

    fn variant_payload(&self, variant: &Field) -> String {
        format!(
            "{}: {}",
            property_key(variant.json_key()),
            render_type(&variant.ty, true)
        )
    }

    fn sum_str(&self, sum_str: &SumStr) -> String {
        if sum_str.variants.is_empty() {
            return format!("export type {} = never;\n", sum_str.id);
        }
        let literals: Vec<String> = sum_str.variants.iter().map(|v| quote(v.value())).collect();
        format!("export type {} = {};\n", sum_str.id, literals.join(" | "))
    }
}

impl CodeGenerator for TypeScriptGenerator {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn generate(&self, schema: Schema<'_>) -> String {
        schema
            .definitions
            .iter()
            .map(|d| self.definition(d))
            .collect()
    }
}

/// Object keys are quoted only when they are not plain identifiers
fn property_key(key: &str) -> String {
    if TS_IDENTIFIER.is_match(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Top-level nullability is expressed with `?` on the property, so only
/// nested nullable types render as `T | undefined`.
fn render_type(ty: &Type, top_level: bool) -> String {
    let base = match ty {
        Type::Ident { id, .. } => ts_primitive(id).unwrap_or(id.as_str()).to_string(),
        Type::List { inner, .. } => format!("{}[]", render_type(inner, false)),
    };
    if ty.is_nullable() && !top_level {
        format!("({base} | undefined)")
    } else {
        base
    }
}
