//! Semantic highlighting computed from the syntax tree.
//!
//! Tokens are encoded the LSP way: five integers per token
//! `(delta line, delta start, length, type, modifiers)`, each position
//! relative to the previous token, in document order.

use crate::lex::{Point, Token};
use crate::syntax::{Definition, Field, SumStrVariant, TypeExpr};

use super::types::SemanticTokensLegend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Class = 0,
    Keyword = 1,
    Property = 2,
    String = 3,
    EnumMember = 4,
}

/// Legend order must match the `TokenType` discriminants
pub const TOKEN_TYPES: [&str; 5] = ["class", "keyword", "property", "string", "enumMember"];

pub fn legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: TOKEN_TYPES.iter().map(|t| t.to_string()).collect(),
        token_modifiers: Vec::new(),
    }
}

pub fn encode(definitions: &[Definition]) -> Vec<u32> {
    let mut encoder = Encoder::default();
    for definition in definitions {
        encoder.definition(definition);
    }
    encoder.data
}

#[derive(Default)]
struct Encoder {
    previous: Point,
    data: Vec<u32>,
}

impl Encoder {
    fn push(&mut self, token: &Token, ty: TokenType) {
        // Recovery placeholders and tokens spanning lines cannot be highlighted
        if token.missing || !token.loc.is_single_line() {
            return;
        }
        let start = token.loc.start;
        let length = token.loc.end.col - start.col;
        if length == 0 {
            return;
        }
        let delta_line = start.row - self.previous.row;
        let delta_start = if delta_line == 0 {
            start.col - self.previous.col
        } else {
            start.col
        };
        self.data
            .extend_from_slice(&[delta_line, delta_start, length, ty as u32, 0]);
        self.previous = start;
    }

    fn definition(&mut self, definition: &Definition) {
        self.push(definition.keyword(), TokenType::Keyword);
        self.push(definition.id(), TokenType::Class);
        match definition {
            Definition::Product(p) => p.fields.iter().for_each(|f| self.field(f)),
            Definition::Sum(s) => s.variants.iter().for_each(|v| self.field(v)),
            Definition::SumStr(s) => s.variants.iter().for_each(|v| self.sum_str_variant(v)),
        }
    }

    fn field(&mut self, field: &Field) {
        match field {
            Field::Full(full) => {
                self.push(&full.id, TokenType::Property);
                if let Some(json_name) = &full.json_name {
                    self.push(json_name, TokenType::String);
                }
                self.type_expr(&full.ty);
            }
            Field::Short(short) => self.push(&short.id, TokenType::Class),
        }
    }

    fn type_expr(&mut self, ty: &TypeExpr) {
        match ty {
            TypeExpr::Ident(ident) => self.push(&ident.id, TokenType::Class),
            TypeExpr::List(list) => self.type_expr(&list.inner),
        }
    }

    fn sum_str_variant(&mut self, variant: &SumStrVariant) {
        self.push(&variant.id, TokenType::EnumMember);
        if let Some(json_name) = &variant.json_name {
            self.push(json_name, TokenType::String);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lex_and_parse;

    fn tokens(input: &str) -> Vec<[u32; 5]> {
        let parsed = lex_and_parse(input);
        encode(&parsed.definitions)
            .chunks(5)
            .map(|c| [c[0], c[1], c[2], c[3], c[4]])
            .collect()
    }

    #[test]
    fn test_product_tokens() {
        assert_eq!(
            tokens("prod User {\n  name \"$name\" []Str?,\n  Status,\n}"),
            vec![
                [0, 0, 4, TokenType::Keyword as u32, 0],
                [0, 5, 4, TokenType::Class as u32, 0],
                [1, 2, 4, TokenType::Property as u32, 0],
                [0, 5, 7, TokenType::String as u32, 0],
                [0, 10, 3, TokenType::Class as u32, 0],
                [1, 2, 6, TokenType::Class as u32, 0],
            ]
        );
    }

    #[test]
    fn test_sum_str_tokens() {
        assert_eq!(
            tokens("sumstr Status { Active, Pending \"pending\", }"),
            vec![
                [0, 0, 6, TokenType::Keyword as u32, 0],
                [0, 7, 6, TokenType::Class as u32, 0],
                [0, 9, 6, TokenType::EnumMember as u32, 0],
                [0, 8, 7, TokenType::EnumMember as u32, 0],
                [0, 8, 9, TokenType::String as u32, 0],
            ]
        );
    }

    #[test]
    fn test_missing_tokens_skipped() {
        // The type after the rename is missing
        let encoded = tokens("prod A { b \"c\" , }");
        assert_eq!(encoded.len(), 4);
        assert_eq!(encoded[3][3], TokenType::String as u32);
    }

    #[test]
    fn test_legend_order() {
        let legend = legend();
        assert_eq!(legend.token_types[TokenType::Class as usize], "class");
        assert_eq!(legend.token_types[TokenType::EnumMember as usize], "enumMember");
        assert!(legend.token_modifiers.is_empty());
    }
}
