//! Fixture configuration.
//!
//! [`FixtureConfig`] is loaded once per test binary by the session and
//! passed down by value. The core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. Environment variables, `COPIER_FIXTURE_<SECTION>__<KEY>`
//!    (`COPIER_FIXTURE_ENGINE__PROGRAM=/venv/bin/copier`)
//! 2. `copier-fixture.toml` in the crate under test
//! 3. Built-in defaults (always present)
//!
//! ```toml
//! [template]
//! root = "template"
//! paths = ["copier.yml", "project"]
//!
//! [defaults]
//! project_name = "demo"
//! ```

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use copier_fixture_adapters::CopierCli;
use copier_fixture_core::{
    domain::{Answers, IgnoreSet},
    error::{Context as _, FixtureError, FixtureResult},
};
use serde::{Deserialize, Serialize};

/// Name of the optional configuration file.
pub const CONFIG_FILE: &str = "copier-fixture.toml";

/// Prefix of the configuration environment variables.
pub const ENV_PREFIX: &str = "COPIER_FIXTURE";

/// Entries never copied into the materialized template by default.
pub const DEFAULT_EXCLUDES: &[&str] = &[".git", "target"];

/// Fixture configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Where the template comes from.
    pub template: TemplateConfig,
    /// How copier is invoked.
    pub engine: EngineConfig,
    /// Answers applied to every render.
    #[serde(default)]
    pub defaults: Answers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Template root; relative paths resolve against the crate under test.
    pub root: PathBuf,
    /// Copy only these paths below `root`. Empty copies the whole tree.
    #[serde(default)]
    pub paths: Vec<PathBuf>,
    /// Patterns skipped when the whole tree is copied.
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub program: String,
    pub python: String,
}

impl FixtureConfig {
    /// Load configuration for the current directory, which is the manifest
    /// directory of the crate under `cargo test`.
    pub fn load() -> FixtureResult<Self> {
        let cwd = std::env::current_dir().context("resolving current directory")?;
        Self::load_from(&cwd)
    }

    /// Load configuration rooted at `dir`.
    pub fn load_from(dir: &Path) -> FixtureResult<Self> {
        let no_paths: Vec<String> = Vec::new();
        let config = Config::builder()
            .set_default("template.root", dir.to_string_lossy().into_owned())
            .and_then(|b| b.set_default("template.paths", no_paths))
            .and_then(|b| b.set_default("template.exclude", DEFAULT_EXCLUDES.to_vec()))
            .and_then(|b| b.set_default("engine.program", CopierCli::DEFAULT_PROGRAM))
            .and_then(|b| b.set_default("engine.python", CopierCli::DEFAULT_PYTHON))
            .map_err(configuration)?
            .add_source(File::from(dir.join(CONFIG_FILE)).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("template.paths")
                    .with_list_parse_key("template.exclude"),
            )
            .build()
            .map_err(configuration)?;

        let mut loaded: Self = config.try_deserialize().map_err(configuration)?;
        if loaded.template.root.is_relative() {
            loaded.template.root = dir.join(&loaded.template.root);
        }
        Ok(loaded)
    }

    /// Exclusions as an ignore set.
    pub fn exclude_set(&self) -> FixtureResult<IgnoreSet> {
        let mut set = IgnoreSet::new();
        for pattern in &self.template.exclude {
            set.push(pattern.as_str())?;
        }
        Ok(set)
    }
}

fn configuration(err: ConfigError) -> FixtureError {
    FixtureError::Configuration {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[serial(process_env)]
    fn defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = FixtureConfig::load_from(dir.path()).unwrap();

        assert_eq!(config.template.root, dir.path());
        assert!(config.template.paths.is_empty());
        assert_eq!(config.template.exclude, [".git", "target"]);
        assert_eq!(config.engine.program, "copier");
        assert_eq!(config.engine.python, "python3");
        assert!(config.defaults.is_empty());
    }

    #[test]
    #[serial(process_env)]
    fn file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
[template]
root = "template"
paths = ["copier.yml", "project"]

[engine]
program = "/venv/bin/copier"

[defaults]
name = "demo"
year = 2025
"#,
        )
        .unwrap();

        let config = FixtureConfig::load_from(dir.path()).unwrap();

        assert_eq!(config.template.root, dir.path().join("template"));
        assert_eq!(
            config.template.paths,
            [PathBuf::from("copier.yml"), PathBuf::from("project")]
        );
        assert_eq!(config.engine.program, "/venv/bin/copier");
        assert_eq!(config.engine.python, "python3");
        assert_eq!(config.defaults.get("name"), Some(&"demo".into()));
        assert!(config.defaults.contains_key("year"));
    }

    #[test]
    #[serial(process_env)]
    fn environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[engine]\nprogram = \"from-file\"\n",
        )
        .unwrap();

        unsafe { std::env::set_var("COPIER_FIXTURE_ENGINE__PROGRAM", "from-env") };
        let config = FixtureConfig::load_from(dir.path());
        unsafe { std::env::remove_var("COPIER_FIXTURE_ENGINE__PROGRAM") };

        assert_eq!(config.unwrap().engine.program, "from-env");
    }

    #[test]
    #[serial(process_env)]
    fn malformed_file_is_a_configuration_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[template\nroot = ").unwrap();

        let err = FixtureConfig::load_from(dir.path()).unwrap_err();
        assert!(matches!(err, FixtureError::Configuration { .. }));
    }

    #[test]
    fn exclude_set_matches_configured_patterns() {
        let config = FixtureConfig {
            template: TemplateConfig {
                root: PathBuf::from("/work"),
                paths: vec![],
                exclude: vec![".git".into(), "target".into()],
            },
            engine: EngineConfig {
                program: "copier".into(),
                python: "python3".into(),
            },
            defaults: Answers::new(),
        };

        let set = config.exclude_set().unwrap();
        assert!(set.matches(Path::new(".git")));
        assert!(set.matches(Path::new("target/debug")));
        assert!(!set.matches(Path::new("copier.yml")));
    }
}
