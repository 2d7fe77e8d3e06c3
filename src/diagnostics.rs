//! Unified diagnostics across lexing, parsing, type checking and linting,
//! and the `check` entry point that runs the whole front end.

use std::fmt;

use crate::lex::{LexError, Location};
use crate::parser::{self, ParseError};
use crate::syntax;
use crate::translate::{self, LintWarning, TranslateOptions, Translation, TypeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// Front-end stage that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Parse,
    Type,
    Lint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub stage: Stage,
    /// Message without position information
    pub message: String,
    pub location: Location,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// `path:row:col: severity: message`, one-based like compilers print
    pub fn render(&self, path: &str) -> String {
        format!(
            "{}:{}:{}: {}: {}",
            path,
            self.location.start.row + 1,
            self.location.start.col + 1,
            self.severity,
            self.message
        )
    }
}

impl From<&LexError> for Diagnostic {
    fn from(err: &LexError) -> Self {
        Self {
            severity: Severity::Error,
            stage: Stage::Lex,
            message: err.kind.to_string(),
            location: err.loc,
        }
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(err: &ParseError) -> Self {
        Self {
            severity: Severity::Error,
            stage: Stage::Parse,
            message: err.short_message(),
            location: err.location(),
        }
    }
}

impl From<&TypeError> for Diagnostic {
    fn from(err: &TypeError) -> Self {
        Self {
            severity: Severity::Error,
            stage: Stage::Type,
            message: err.kind.to_string(),
            location: err.loc,
        }
    }
}

impl From<&LintWarning> for Diagnostic {
    fn from(warning: &LintWarning) -> Self {
        Self {
            severity: Severity::Warning,
            stage: Stage::Lint,
            message: warning.kind.to_string(),
            location: warning.loc,
        }
    }
}

/// Result of running the front end over one source text
#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    pub syntax: Vec<syntax::Definition>,
    /// Absent when lexing or parsing failed
    pub translation: Option<Translation>,
    /// Sorted by position
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }
}

/// Lex, parse and (if the syntax is clean) translate `input`.
///
/// Type checking is skipped when there are syntax errors, since recovery
/// placeholders would only produce follow-on noise.
pub fn check(input: &str, options: TranslateOptions) -> CheckResult {
    let parsed = parser::lex_and_parse(input);

    let mut diagnostics: Vec<Diagnostic> = parsed
        .lex_errors
        .iter()
        .map(Diagnostic::from)
        .chain(parsed.parse_errors.iter().map(Diagnostic::from))
        .collect();

    let translation = if parsed.has_errors() {
        None
    } else {
        let translation = translate::translate(&parsed.definitions, options);
        diagnostics.extend(translation.errors.iter().map(Diagnostic::from));
        diagnostics.extend(translation.warnings.iter().map(Diagnostic::from));
        Some(translation)
    };

    diagnostics.sort_by_key(|d| (d.location.byte_start, d.severity));

    CheckResult {
        syntax: parsed.definitions,
        translation,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_input() {
        let result = check("prod A { b Int, }", TranslateOptions::default());
        assert!(!result.has_errors());
        assert!(result.diagnostics.is_empty());
        assert!(result.translation.is_some());
    }

    #[test]
    fn test_syntax_errors_skip_type_stage() {
        let result = check("prod A { b Nope b, }", TranslateOptions::default());
        assert!(result.has_errors());
        assert!(result.translation.is_none());
        assert!(result.diagnostics.iter().all(|d| d.stage == Stage::Parse));
    }

    #[test]
    fn test_lex_and_parse_errors_sorted_by_position() {
        let result = check("prod A { a Str b Int, } %", TranslateOptions::default());
        let stages: Vec<_> = result.diagnostics.iter().map(|d| d.stage).collect();
        assert_eq!(stages, vec![Stage::Parse, Stage::Lex]);
    }

    #[test]
    fn test_warnings_do_not_block() {
        let result = check("prod a { B Int, }", TranslateOptions::default());
        assert!(!result.has_errors());
        assert_eq!(result.warning_count(), 2);
        assert_eq!(result.error_count(), 0);
    }

    #[test]
    fn test_render() {
        let result = check("prod A {\n  b Nope,\n}", TranslateOptions::default());
        assert_eq!(
            result.diagnostics[0].render("schema.bt"),
            "schema.bt:2:5: error: Unknown type Nope"
        );
    }
}
