//! File-level operations behind `bt generate` and `bt check`.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::diagnostics::{self, CheckResult, Diagnostic};
use crate::generator::{self, OutputFormat, Schema, SumStyle};

/// Inputs of one `bt generate` run; `None` fields fall back to config
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub go_package_name: Option<String>,
    pub sum_style: Option<SumStyle>,
}

#[derive(Debug)]
pub struct BuildReport {
    pub input: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
    /// Set when the output file was written
    pub output: Option<PathBuf>,
}

impl BuildReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Diagnostics rendered as `path:row:col: severity: message`
    pub fn rendered(&self) -> Vec<String> {
        let path = self.input.display().to_string();
        self.diagnostics.iter().map(|d| d.render(&path)).collect()
    }
}

/// Check `request.input` and, if it has no errors, write the generated
/// output. Nothing is written when any error diagnostic is present.
pub fn generate(request: &GenerateRequest, config: &Config) -> Result<BuildReport> {
    let format = OutputFormat::from_path(&request.output)?;

    let source = std::fs::read_to_string(&request.input)
        .with_context(|| format!("Failed to read {}", request.input.display()))?;
    let CheckResult {
        translation,
        diagnostics,
        ..
    } = diagnostics::check(&source, config.translate_options());

    let translation = match translation {
        Some(translation) if !translation.has_errors() => translation,
        _ => {
            tracing::debug!(input = %request.input.display(), "Skipping generation due to errors");
            return Ok(BuildReport {
                input: request.input.clone(),
                diagnostics,
                output: None,
            });
        }
    };

    let mut options = config.generator_options(&default_package_name(&request.output));
    if let Some(name) = &request.go_package_name {
        options.go_package_name = name.clone();
    }
    if let Some(style) = request.sum_style {
        options.sum_style = style;
    }

    let generator = generator::generator_for(format, &options)?;
    generator.write(
        Schema {
            definitions: &translation.definitions,
            used_primitives: &translation.used_primitives,
        },
        &request.output,
    )?;

    Ok(BuildReport {
        input: request.input.clone(),
        diagnostics,
        output: Some(request.output.clone()),
    })
}

/// Go package name taken from the output file name up to its first `.`
/// (`types.gen.go` -> `types`)
fn default_package_name(output: &Path) -> String {
    output
        .file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.split('.').next().map(str::to_string))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| generator::GeneratorOptions::default().go_package_name)
}

/// Expand glob `patterns` and check each matching file
pub fn check_files(patterns: &[String], config: &Config) -> Result<Vec<BuildReport>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let matches =
            glob::glob(pattern).with_context(|| format!("Invalid glob pattern {pattern:?}"))?;
        let before = files.len();
        for entry in matches {
            let path = entry.context("Failed to read glob entry")?;
            if path.is_file() {
                files.push(path);
            }
        }
        if files.len() == before {
            tracing::warn!(pattern = %pattern, "Pattern matched no files");
        }
    }
    files.sort();
    files.dedup();

    if files.is_empty() {
        bail!("No input files matched {}", patterns.join(", "));
    }

    files
        .into_iter()
        .map(|path| {
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let result = diagnostics::check(&source, config.translate_options());
            tracing::debug!(
                file = %path.display(),
                errors = result.error_count(),
                warnings = result.warning_count(),
                "Checked"
            );
            Ok(BuildReport {
                input: path,
                diagnostics: result.diagnostics,
                output: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SCHEMA: &str = "prod User {\n  name Str,\n  when Date?,\n}\n";

    fn request(temp_dir: &TempDir, source: &str, output: &str) -> GenerateRequest {
        let input = temp_dir.path().join("schema.bt");
        std::fs::write(&input, source).unwrap();
        GenerateRequest {
            input,
            output: temp_dir.path().join(output),
            go_package_name: None,
            sum_style: None,
        }
    }

    #[test]
    fn test_generate_go_uses_output_stem_as_package() {
        let temp_dir = TempDir::new().unwrap();
        let request = request(&temp_dir, SCHEMA, "models.go");
        let report = generate(&request, &Config::default()).unwrap();
        assert!(!report.has_errors());
        let written = std::fs::read_to_string(report.output.unwrap()).unwrap();
        assert!(written.starts_with("package models\n\nimport \"time\"\n"));
    }

    #[test]
    fn test_package_name_stops_at_first_dot() {
        let temp_dir = TempDir::new().unwrap();
        let request = request(&temp_dir, SCHEMA, "types.gen.go");
        let report = generate(&request, &Config::default()).unwrap();
        let written = std::fs::read_to_string(report.output.unwrap()).unwrap();
        assert!(written.starts_with("package types\n"));

        assert_eq!(default_package_name(Path::new("gen/api.v2.go")), "api");
        assert_eq!(default_package_name(Path::new(".go")), "types");
    }

    #[test]
    fn test_unsafe_json_name_prevents_writing() {
        let temp_dir = TempDir::new().unwrap();
        let request = request(&temp_dir, "prod User { name \"a,omitempty\" Str, }", "types.go");
        let report = generate(&request, &Config::default()).unwrap();
        assert!(report.has_errors());
        assert!(!request.output.exists());
        assert!(report.rendered()[0].contains("Invalid JSON name \"a,omitempty\""));
    }

    #[test]
    fn test_package_flag_overrides_stem() {
        let temp_dir = TempDir::new().unwrap();
        let mut request = request(&temp_dir, SCHEMA, "models.go");
        request.go_package_name = Some("api".to_string());
        generate(&request, &Config::default()).unwrap();
        let written = std::fs::read_to_string(&request.output).unwrap();
        assert!(written.starts_with("package api\n"));
    }

    #[test]
    fn test_errors_prevent_writing() {
        let temp_dir = TempDir::new().unwrap();
        let request = request(&temp_dir, "prod User { name Missing, }", "types.ts");
        let report = generate(&request, &Config::default()).unwrap();
        assert!(report.has_errors());
        assert!(report.output.is_none());
        assert!(!request.output.exists());
        assert_eq!(report.rendered().len(), 1);
        assert!(report.rendered()[0].ends_with("error: Unknown type Missing"));
    }

    #[test]
    fn test_unsupported_output_extension() {
        let temp_dir = TempDir::new().unwrap();
        let request = request(&temp_dir, SCHEMA, "types.py");
        assert!(generate(&request, &Config::default()).is_err());
    }

    #[test]
    fn test_check_files_expands_globs() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.bt"), "prod A { b Int, }").unwrap();
        std::fs::write(temp_dir.path().join("b.bt"), "prod B { c Nope, }").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let pattern = temp_dir.path().join("*.bt").to_string_lossy().to_string();
        let reports = check_files(&[pattern], &Config::default()).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(!reports[0].has_errors());
        assert!(reports[1].has_errors());
    }

    #[test]
    fn test_check_files_requires_matches() {
        let temp_dir = TempDir::new().unwrap();
        let pattern = temp_dir.path().join("*.bt").to_string_lossy().to_string();
        assert!(check_files(&[pattern], &Config::default()).is_err());
    }
}
