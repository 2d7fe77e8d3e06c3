use crate::diagnostics::{self, Severity};
use crate::lex::{Location, Point};

use super::types::{Diagnostic, Position, Range};

/// Name shown by editors next to each diagnostic
pub const DIAGNOSTIC_SOURCE: &str = "between";

pub fn position(point: Point) -> Position {
    Position {
        line: point.row,
        character: point.col,
    }
}

pub fn range(loc: &Location) -> Range {
    Range {
        start: position(loc.start),
        end: position(loc.end),
    }
}

pub fn diagnostic(diagnostic: &diagnostics::Diagnostic) -> Diagnostic {
    Diagnostic {
        range: range(&diagnostic.location),
        severity: match diagnostic.severity {
            Severity::Error => 1,
            Severity::Warning => 2,
        },
        source: DIAGNOSTIC_SOURCE.to_string(),
        message: diagnostic.message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::check;
    use crate::translate::TranslateOptions;

    #[test]
    fn test_error_and_warning_conversion() {
        let result = check("prod A {\n  b Nope,\n  C Int,\n}", TranslateOptions::default());
        let converted: Vec<_> = result.diagnostics.iter().map(diagnostic).collect();

        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].severity, 1);
        assert_eq!(converted[0].message, "Unknown type Nope");
        assert_eq!(
            converted[0].range,
            Range {
                start: Position { line: 1, character: 4 },
                end: Position { line: 1, character: 8 },
            }
        );
        assert_eq!(converted[1].severity, 2);
        assert_eq!(converted[1].source, "between");
        assert_eq!(converted[1].range.start, Position { line: 2, character: 2 });
    }
}
