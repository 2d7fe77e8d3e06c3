use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::generator::{default_sum_tag, GeneratorOptions, SumStyle};
use crate::translate::TranslateOptions;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generate: GenerateConfig,
    #[serde(default)]
    pub lint: LintConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Defaults for `bt generate`; CLI flags take precedence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Go package name (unset = output file name up to its first '.')
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub go_package_name: Option<String>,
    #[serde(default)]
    pub sum_style: SumStyle,
    /// Discriminant field name for tagged sums (default: "_type")
    #[serde(default = "default_sum_tag")]
    pub sum_tag: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            go_package_name: None,
            sum_style: SumStyle::Keyed,
            sum_tag: default_sum_tag(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintConfig {
    /// Warn on fields that are not camelCase and types that are not PascalCase
    #[serde(default = "default_naming_warnings")]
    pub naming_warnings: bool,
}

fn default_naming_warnings() -> bool {
    true
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            naming_warnings: default_naming_warnings(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether the language server logs to a file (false = stderr)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// State directory; language server logs go under `<state>/logs`
    #[serde(default = "default_state_path")]
    pub state: String,
}

fn default_state_path() -> String {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|dir| dir.join("between").to_string_lossy().to_string())
        .unwrap_or_else(|| ".between".to_string())
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state: default_state_path(),
        }
    }
}

impl Config {
    /// Project config file, looked up in the working directory
    pub fn project_config_path() -> PathBuf {
        PathBuf::from("between.toml")
    }

    /// User config file in ~/.config/between/
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("between").join("config.toml"))
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::load_from(
            &Self::project_config_path(),
            Self::user_config_path().as_deref(),
            config_path,
            Self::environment(),
        )
    }

    /// `BETWEEN_<SECTION>__<KEY>` variables, e.g. `BETWEEN_GENERATE__SUM_TAG`
    fn environment() -> config::Environment {
        config::Environment::with_prefix("BETWEEN")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_from(
        project_config: &Path,
        user_config: Option<&Path>,
        config_path: Option<&str>,
        environment: config::Environment,
    ) -> Result<Self> {
        // Embedded defaults so bt works without any config file
        let defaults_json = serde_json::to_string(&Config::default())
            .context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        if project_config.exists() {
            builder = builder.add_source(config::File::from(project_config));
        }

        if let Some(user_config) = user_config.filter(|p| p.exists()) {
            builder = builder.add_source(config::File::from(user_config));
        }

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder.add_source(environment);

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Effective configuration rendered as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.state);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }

    pub fn translate_options(&self) -> TranslateOptions {
        TranslateOptions {
            naming_warnings: self.lint.naming_warnings,
        }
    }

    /// Generator options, with `default_package` used when no Go package is configured
    pub fn generator_options(&self, default_package: &str) -> GeneratorOptions {
        GeneratorOptions {
            go_package_name: self
                .generate
                .go_package_name
                .clone()
                .unwrap_or_else(|| default_package.to_string()),
            sum_style: self.generate.sum_style,
            sum_tag: self.generate.sum_tag.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Environment layer fed from `vars` instead of the process environment
    fn environment_with(vars: &[(&str, &str)]) -> config::Environment {
        let vars: config::Map<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::environment().source(Some(vars))
    }

    struct Layers<'a> {
        project: Option<&'a str>,
        user: Option<&'a str>,
        explicit: Option<&'a str>,
        env: &'a [(&'a str, &'a str)],
    }

    fn load_layers(layers: &Layers) -> (TempDir, Config) {
        let temp_dir = TempDir::new().unwrap();
        let write = |name: &str, content: Option<&str>| {
            let path = temp_dir.path().join(name);
            if let Some(content) = content {
                std::fs::write(&path, content).unwrap();
            }
            path
        };
        let project_path = write("between.toml", layers.project);
        let user_path = write("user.toml", layers.user);
        let explicit_path = layers
            .explicit
            .map(|content| write("override.toml", Some(content)).to_string_lossy().to_string());
        let config = Config::load_from(
            &project_path,
            Some(&user_path),
            explicit_path.as_deref(),
            environment_with(layers.env),
        )
        .unwrap();
        (temp_dir, config)
    }

    fn load_with(project: Option<&str>, explicit: Option<&str>) -> (TempDir, Config) {
        load_layers(&Layers {
            project,
            user: None,
            explicit,
            env: &[],
        })
    }

    #[test]
    fn test_defaults_without_files() {
        let (_dir, config) = load_with(None, None);
        assert_eq!(config.generate.sum_style, SumStyle::Keyed);
        assert_eq!(config.generate.sum_tag, "_type");
        assert!(config.generate.go_package_name.is_none());
        assert!(config.lint.naming_warnings);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_project_file_overrides_defaults() {
        let (_dir, config) = load_with(
            Some("[generate]\nsum_style = \"tagged\"\nsum_tag = \"kind\"\n\n[lint]\nnaming_warnings = false\n"),
            None,
        );
        assert_eq!(config.generate.sum_style, SumStyle::Tagged);
        assert_eq!(config.generate.sum_tag, "kind");
        assert!(!config.lint.naming_warnings);
    }

    #[test]
    fn test_explicit_file_wins_over_project_file() {
        let (_dir, config) = load_with(
            Some("[generate]\ngo_package_name = \"project\"\n"),
            Some("[generate]\ngo_package_name = \"explicit\"\n"),
        );
        assert_eq!(config.generate.go_package_name.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_user_file_wins_over_project_file() {
        let (_dir, config) = load_layers(&Layers {
            project: Some("[generate]\ngo_package_name = \"project\"\nsum_tag = \"kind\"\n"),
            user: Some("[generate]\ngo_package_name = \"user\"\n"),
            explicit: None,
            env: &[],
        });
        assert_eq!(config.generate.go_package_name.as_deref(), Some("user"));
        // Keys the user file leaves out still come from the project file
        assert_eq!(config.generate.sum_tag, "kind");

        let (_dir, config) = load_layers(&Layers {
            project: None,
            user: Some("[generate]\ngo_package_name = \"user\"\n"),
            explicit: Some("[generate]\ngo_package_name = \"explicit\"\n"),
            env: &[],
        });
        assert_eq!(config.generate.go_package_name.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_environment_overrides_files() {
        let (_dir, config) = load_layers(&Layers {
            project: Some("[generate]\nsum_tag = \"kind\"\n"),
            user: None,
            explicit: Some("[generate]\nsum_tag = \"tag\"\n"),
            env: &[
                ("BETWEEN_GENERATE__SUM_TAG", "variant"),
                ("BETWEEN_GENERATE__SUM_STYLE", "tagged"),
                ("BETWEEN_LINT__NAMING_WARNINGS", "false"),
            ],
        });
        assert_eq!(config.generate.sum_tag, "variant");
        assert_eq!(config.generate.sum_style, SumStyle::Tagged);
        assert!(!config.lint.naming_warnings);
    }

    #[test]
    fn test_environment_needs_single_underscore_after_prefix() {
        let (_dir, config) = load_layers(&Layers {
            project: None,
            user: None,
            explicit: None,
            env: &[
                ("BETWEEN__GENERATE__SUM_TAG", "double"),
                ("OTHER_GENERATE__SUM_TAG", "other"),
            ],
        });
        assert_eq!(config.generate.sum_tag, "_type");
    }

    #[test]
    fn test_generator_options_fall_back_to_default_package() {
        let config = Config::default();
        assert_eq!(config.generator_options("demo").go_package_name, "demo");

        let mut config = Config::default();
        config.generate.go_package_name = Some("models".to_string());
        assert_eq!(config.generator_options("demo").go_package_name, "models");
    }

    #[test]
    fn test_logs_path_under_state() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.state = temp_dir.path().to_string_lossy().to_string();
        assert!(config.logs_path().starts_with(temp_dir.path()));
        assert!(config.logs_path().ends_with("logs"));
    }

    #[test]
    fn test_to_toml_has_sections() {
        let rendered = Config::default().to_toml().unwrap();
        assert!(rendered.contains("[generate]"));
        assert!(rendered.contains("sum_style = \"keyed\""));
        assert!(rendered.contains("[lint]"));
        assert!(rendered.contains("[logging]"));
    }
}
