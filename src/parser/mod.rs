//! Recursive-descent parser for `.bt` files with panic-mode recovery.
//!
//! Grammar:
//!
//! ```text
//! file       := definition* EOF
//! definition := product | sum | sumstr
//! product    := 'prod'   ID '{' field* '}'
//! sum        := 'sum'    ID '{' field* '}'
//! sumstr     := 'sumstr' ID '{' (ID LITERAL? ',')* '}'
//! field      := ID LITERAL? type ','
//!             | ID '?'? ','
//! type       := ID '?'? | '[]' '?'? type
//! ```
//!
//! On an unexpected token the parser records an error and skips ahead to a
//! token that can follow the construct being parsed. Once skipping runs into
//! end of file no further errors are reported.

mod error;

pub use error::ParseError;

use crate::lex::{self, LexError, Location, Token, TokenKind};
use crate::syntax::{
    Definition, Field, FullField, ListType, Product, ShortField, Sum, SumStr, SumStrVariant,
    TypeExpr, TypeIdent,
};

use crate::lex::TokenKind::{
    Eof, Id, LBrace, List, Literal, Optional, Product as ProdKw, RBrace, Separator,
    Sum as SumKw, SumStr as SumStrKw,
};

const DEFINITION_FIRST: &[TokenKind] = &[ProdKw, SumKw, SumStrKw];
const HEADER_FOLLOW: &[TokenKind] = &[LBrace, RBrace, Id, ProdKw, SumKw, SumStrKw];
const MEMBER_FOLLOW: &[TokenKind] = &[Id, RBrace, ProdKw, SumKw, SumStrKw];
const BODY_FOLLOW: &[TokenKind] = &[RBrace, ProdKw, SumKw, SumStrKw];
const TYPE_FOLLOW: &[TokenKind] = &[Separator, Id, RBrace, ProdKw, SumKw, SumStrKw];
const FIELD_AFTER_ID: &[TokenKind] = &[Id, List, Literal, Optional, Separator];

/// Output of the syntactic front end
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    pub definitions: Vec<Definition>,
    pub lex_errors: Vec<LexError>,
    pub parse_errors: Vec<ParseError>,
}

impl Parsed {
    pub fn has_errors(&self) -> bool {
        !self.lex_errors.is_empty() || !self.parse_errors.is_empty()
    }
}

pub fn lex_and_parse(input: &str) -> Parsed {
    let (tokens, lex_errors) = lex::lex(input);
    let (definitions, parse_errors) = parse(&tokens);
    Parsed {
        definitions,
        lex_errors,
        parse_errors,
    }
}

pub fn parse(tokens: &[Token]) -> (Vec<Definition>, Vec<ParseError>) {
    let mut parser = Parser::new(tokens);
    let definitions = parser.parse_definitions();
    tracing::trace!(
        definitions = definitions.len(),
        errors = parser.errors.len(),
        "Parsed tokens"
    );
    (definitions, parser.errors)
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    errors: Vec<ParseError>,
    eof_reached: bool,
    last_error_pos: Option<usize>,
    eof: Token,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        let eof_loc = tokens.last().map(|t| t.loc).unwrap_or_default();
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            eof_reached: false,
            last_error_pos: None,
            eof: Token::new(Eof, "", eof_loc),
        }
    }

    fn parse_definitions(&mut self) -> Vec<Definition> {
        let mut definitions = Vec::new();
        loop {
            match self.kind() {
                Eof => return definitions,
                ProdKw => definitions.push(Definition::Product(self.parse_product())),
                SumKw => definitions.push(Definition::Sum(self.parse_sum())),
                SumStrKw => definitions.push(Definition::SumStr(self.parse_sum_str())),
                _ => self.recover(DEFINITION_FIRST, DEFINITION_FIRST),
            }
        }
    }

    fn parse_product(&mut self) -> Product {
        let (keyword, id, lbrace) = self.parse_header();
        let fields = self.parse_fields();
        let rbrace = self.expect(RBrace, DEFINITION_FIRST);
        Product {
            keyword,
            id,
            lbrace,
            fields,
            rbrace,
        }
    }

    fn parse_sum(&mut self) -> Sum {
        let (keyword, id, lbrace) = self.parse_header();
        let variants = self.parse_fields();
        let rbrace = self.expect(RBrace, DEFINITION_FIRST);
        Sum {
            keyword,
            id,
            lbrace,
            variants,
            rbrace,
        }
    }

    fn parse_sum_str(&mut self) -> SumStr {
        let (keyword, id, lbrace) = self.parse_header();
        let variants = self.parse_sum_str_variants();
        let rbrace = self.expect(RBrace, DEFINITION_FIRST);
        SumStr {
            keyword,
            id,
            lbrace,
            variants,
            rbrace,
        }
    }

    /// `keyword ID '{'`; the keyword has already been matched by the caller
    fn parse_header(&mut self) -> (Token, Token, Token) {
        let keyword = self.advance();
        let id = self.expect(Id, HEADER_FOLLOW);
        let lbrace = self.expect(LBrace, MEMBER_FOLLOW);
        (keyword, id, lbrace)
    }

    fn parse_fields(&mut self) -> Vec<Field> {
        let mut fields = Vec::new();
        loop {
            match self.kind() {
                Id => fields.push(self.parse_field()),
                RBrace | Eof => return fields,
                kind if kind.is_keyword() => return fields,
                _ => self.recover(&[Id, RBrace], BODY_FOLLOW),
            }
        }
    }

    fn parse_field(&mut self) -> Field {
        let id = self.advance();
        match self.kind() {
            Id | List | Literal => {
                let json_name = self.optional(Literal);
                let ty = self.parse_type();
                let separator = self.expect(Separator, MEMBER_FOLLOW);
                Field::Full(FullField {
                    id,
                    json_name,
                    ty,
                    separator,
                })
            }
            Optional | Separator => {
                let nullable = self.optional(Optional);
                let separator = self.expect(Separator, MEMBER_FOLLOW);
                Field::Short(ShortField {
                    id,
                    nullable,
                    separator,
                })
            }
            _ => {
                let at = self.current().loc;
                self.recover(FIELD_AFTER_ID, MEMBER_FOLLOW);
                let separator = self
                    .optional(Separator)
                    .unwrap_or_else(|| Token::missing(Separator, at));
                Field::Short(ShortField {
                    id,
                    nullable: None,
                    separator,
                })
            }
        }
    }

    fn parse_sum_str_variants(&mut self) -> Vec<SumStrVariant> {
        let mut variants = Vec::new();
        loop {
            match self.kind() {
                Id => {
                    let id = self.advance();
                    let json_name = self.optional(Literal);
                    let separator = self.expect(Separator, MEMBER_FOLLOW);
                    variants.push(SumStrVariant {
                        id,
                        json_name,
                        separator,
                    });
                }
                RBrace | Eof => return variants,
                kind if kind.is_keyword() => return variants,
                _ => self.recover(&[Id, RBrace], BODY_FOLLOW),
            }
        }
    }

    fn parse_type(&mut self) -> TypeExpr {
        match self.kind() {
            Id => {
                let id = self.advance();
                let nullable = self.optional(Optional);
                TypeExpr::Ident(TypeIdent { id, nullable })
            }
            List => {
                let brackets = self.advance();
                let nullable = self.optional(Optional);
                let inner = self.parse_type();
                TypeExpr::List(Box::new(ListType {
                    brackets,
                    nullable,
                    inner,
                }))
            }
            _ => {
                let at = self.current().loc;
                self.recover(&[Id, List], TYPE_FOLLOW);
                if matches!(self.kind(), List) {
                    return self.parse_type();
                }
                TypeExpr::Ident(TypeIdent {
                    id: Token::missing(Id, at),
                    nullable: None,
                })
            }
        }
    }

    /// Consume a token of `kind`, or report it missing and skip to `follow`.
    /// If skipping lands on `kind` it is consumed after all.
    fn expect(&mut self, kind: TokenKind, follow: &[TokenKind]) -> Token {
        if self.kind() == kind {
            return self.advance();
        }
        let at: Location = self.current().loc;
        self.recover(&[kind], follow);
        if self.kind() == kind {
            return self.advance();
        }
        Token::missing(kind, at)
    }

    fn optional(&mut self, kind: TokenKind) -> Option<Token> {
        if self.kind() == kind {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Report that one of `expected` was wanted, then skip tokens until one
    /// in `expected` or `follow` (or end of file) is current.
    fn recover(&mut self, expected: &[TokenKind], follow: &[TokenKind]) {
        self.report(expected);
        loop {
            let kind = self.kind();
            if expected.contains(&kind) || follow.contains(&kind) {
                return;
            }
            if kind == Eof {
                self.eof_reached = true;
                return;
            }
            self.advance();
        }
    }

    fn report(&mut self, expected: &[TokenKind]) {
        if self.eof_reached || self.last_error_pos == Some(self.pos) {
            return;
        }
        self.last_error_pos = Some(self.pos);
        let actual = self.current().clone();
        tracing::trace!(?expected, actual = %actual, "Unexpected token");
        self.errors.push(ParseError::UnexpectedToken {
            expected: expected.to_vec(),
            actual,
        });
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn kind(&self) -> TokenKind {
        self.current().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != Eof {
            self.pos += 1;
        }
        token
    }
}
