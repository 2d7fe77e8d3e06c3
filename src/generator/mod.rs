//! Target-language emitters for translated schemas.
//!
//! Each generator turns the resolved definitions into source text whose JSON
//! wire shape matches the schema:
//! - TypeScript: interfaces, string-literal unions and object unions
//! - Go: structs with `json` tags, string types with constants

mod go;
mod typescript;

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use go::GoGenerator;
pub use typescript::TypeScriptGenerator;

use crate::ast::Definition;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("Output file {0} has no extension; expected .ts or .go")]
    MissingExtension(String),

    #[error("Unsupported output format: .{0} (expected .ts or .go)")]
    UnsupportedExtension(String),

    #[error("Invalid Go package name: {0:?}")]
    InvalidPackageName(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    TypeScript,
    Go,
}

impl OutputFormat {
    /// Pick the format from the output file's extension
    pub fn from_path(path: &Path) -> Result<Self, GenerateError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| GenerateError::MissingExtension(path.display().to_string()))?;
        match extension {
            "ts" => Ok(OutputFormat::TypeScript),
            "go" => Ok(OutputFormat::Go),
            other => Err(GenerateError::UnsupportedExtension(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::TypeScript => "typescript",
            OutputFormat::Go => "go",
        }
    }
}

/// How sum types are discriminated on the wire
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SumStyle {
    /// The variant is identified by which key is present
    #[default]
    Keyed,
    /// A tag field carries the variant's key alongside the payload
    Tagged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub go_package_name: String,
    pub sum_style: SumStyle,
    /// Name of the discriminant field for tagged sums
    pub sum_tag: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            go_package_name: "types".to_string(),
            sum_style: SumStyle::Keyed,
            sum_tag: default_sum_tag(),
        }
    }
}

pub fn default_sum_tag() -> String {
    "_type".to_string()
}

/// Translated schema handed to a generator
#[derive(Debug, Clone, Copy)]
pub struct Schema<'a> {
    pub definitions: &'a [Definition],
    pub used_primitives: &'a BTreeSet<String>,
}

/// A code generator for one target language
pub trait CodeGenerator {
    /// Name of this generator (for logging)
    fn name(&self) -> &'static str;

    /// Render the schema as target source text
    fn generate(&self, schema: Schema<'_>) -> String;

    /// Render the schema and write it to `path`
    fn write(&self, schema: Schema<'_>, path: &Path) -> Result<()> {
        let content = self.generate(schema);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(
            generator = self.name(),
            output = %path.display(),
            definitions = schema.definitions.len(),
            "Generated types"
        );
        Ok(())
    }
}

/// Build the generator for `format`, validating target-specific options
pub fn generator_for(
    format: OutputFormat,
    options: &GeneratorOptions,
) -> Result<Box<dyn CodeGenerator>, GenerateError> {
    match format {
        OutputFormat::TypeScript => Ok(Box::new(TypeScriptGenerator::new(options.clone()))),
        OutputFormat::Go => {
            if !go::is_valid_package_name(&options.go_package_name) {
                return Err(GenerateError::InvalidPackageName(
                    options.go_package_name.clone(),
                ));
            }
            Ok(Box::new(GoGenerator::new(options.clone())))
        }
    }
}

/// Escape a string as a double-quoted literal valid in both TypeScript and Go
pub(crate) fn quote(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out/types.ts")),
            Ok(OutputFormat::TypeScript)
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("demo.go")),
            Ok(OutputFormat::Go)
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("demo.rs")),
            Err(GenerateError::UnsupportedExtension("rs".to_string()))
        );
        assert!(matches!(
            OutputFormat::from_path(Path::new("Makefile")),
            Err(GenerateError::MissingExtension(_))
        ));
    }

    #[test]
    fn test_go_generator_rejects_bad_package() {
        let options = GeneratorOptions {
            go_package_name: "my-types".to_string(),
            ..GeneratorOptions::default()
        };
        assert!(matches!(
            generator_for(OutputFormat::Go, &options),
            Err(GenerateError::InvalidPackageName(_))
        ));
        assert!(generator_for(OutputFormat::TypeScript, &options).is_ok());
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("pending activation"), "\"pending activation\"");
        assert_eq!(quote("a\\b"), "\"a\\\\b\"");
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("gen").join("types.ts");
        let definitions = Vec::new();
        let used = BTreeSet::new();
        let schema = Schema {
            definitions: &definitions,
            used_primitives: &used,
        };
        TypeScriptGenerator::new(GeneratorOptions::default())
            .write(schema, &path)
            .unwrap();
        assert!(path.exists());
    }
}
