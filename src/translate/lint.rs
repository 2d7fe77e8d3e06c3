//! Naming-convention warnings. These never block generation.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::lex::Location;

static CAMEL_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-zA-Z0-9]*$").expect("valid camelCase regex"));

static PASCAL_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-zA-Z0-9]*$").expect("valid PascalCase regex"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LintKind {
    #[error("Field name {0} should be camelCase")]
    FieldNotCamelCase(String),

    #[error("Type name {0} should be PascalCase")]
    TypeNotPascalCase(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Warning at {}: {kind}", .loc.start)]
pub struct LintWarning {
    pub kind: LintKind,
    pub loc: Location,
}

pub fn is_camel_case(name: &str) -> bool {
    CAMEL_CASE.is_match(name)
}

pub fn is_pascal_case(name: &str) -> bool {
    PASCAL_CASE.is_match(name)
}

pub(super) fn check_field_name(name: &str, loc: Location) -> Option<LintWarning> {
    (!name.is_empty() && !is_camel_case(name)).then(|| LintWarning {
        kind: LintKind::FieldNotCamelCase(name.to_string()),
        loc,
    })
}

pub(super) fn check_type_name(name: &str, loc: Location) -> Option<LintWarning> {
    (!name.is_empty() && !is_pascal_case(name)).then(|| LintWarning {
        kind: LintKind::TypeNotPascalCase(name.to_string()),
        loc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert!(is_camel_case("accessLevel"));
        assert!(is_camel_case("array2d"));
        assert!(!is_camel_case("AccessLevel"));
        assert!(!is_camel_case("2d"));
    }

    #[test]
    fn test_pascal_case() {
        assert!(is_pascal_case("UserData"));
        assert!(!is_pascal_case("userData"));
    }

    #[test]
    fn test_missing_names_not_linted() {
        assert!(check_field_name("", Location::default()).is_none());
        assert!(check_type_name("", Location::default()).is_none());
    }
}
