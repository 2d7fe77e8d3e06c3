//! between - a schema language for JSON shapes shared between TypeScript and Go.
//!
//! The pipeline is `lex -> parser -> translate -> generator`; `diagnostics`
//! runs the front end in one call and `lsp` serves it to editors.

pub mod ast;
pub mod build;
pub mod config;
pub mod diagnostics;
pub mod generator;
pub mod lex;
pub mod logging;
pub mod lsp;
pub mod parser;
pub mod syntax;
pub mod translate;
pub mod watch;
