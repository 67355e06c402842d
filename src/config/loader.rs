//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::{Config, PlanConfig};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Prefix of standalone plan files (`plan-<name>.yaml`).
const PLAN_FILE_PREFIX: &str = "plan-";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Embedded defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/confpush/)
    Project = 1,
    /// User-level config (~/.confpush/)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Paths for each configuration tier.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project-level config directory
    pub project_dir: Option<PathBuf>,
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        // User dir: CONFPUSH_USER_DIR or ~/.confpush
        let user_dir = std::env::var("CONFPUSH_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".confpush")));

        // Project dir: CONFPUSH_PROJECT_DIR or $CWD/confpush
        let project_dir = std::env::var("CONFPUSH_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("confpush")));

        Self {
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }

    /// Directories in ascending priority, paired with their tier.
    fn tiers(&self) -> Vec<(ConfigTier, &Path)> {
        let mut tiers = Vec::new();
        if let Some(ref dir) = self.project_dir {
            tiers.push((ConfigTier::Project, dir.as_path()));
        }
        if let Some(ref dir) = self.user_dir {
            tiers.push((ConfigTier::User, dir.as_path()));
        }
        tiers
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Paths for each tier
    pub paths: ConfigPaths,
    /// Loaded configuration
    config: Config,
    /// Config files that contributed, lowest priority first
    sources: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers with proper merging.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load configuration from one explicit file, skipping the tiers.
    ///
    /// Environment overrides still apply.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Config::load(path)
            .with_context(|| format!("failed to load config file {}", path.display()))?;
        Self::apply_env_overrides(&mut config);
        Ok(Self {
            paths: ConfigPaths::with_dirs(None, None),
            config,
            sources: vec![path.to_path_buf()],
        })
    }

    /// Load configuration with explicit paths.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        // Check for explicit config path override
        if let Ok(explicit_path) = std::env::var("CONFPUSH_CONFIG_PATH") {
            let mut loader = Self::load_file(&explicit_path)?;
            loader.paths = paths;
            return Ok(loader);
        }

        // Collect configs from each tier
        let mut configs: Vec<Value> = Vec::new();
        let mut sources = Vec::new();

        // Tier 1: Defaults (embedded)
        if let Ok(default_json) = serde_json::to_value(Config::default()) {
            configs.push(default_json);
        }

        // Tiers 2-3: Project, then user
        for (tier, dir) in paths.tiers() {
            let config_file = dir.join("config.yaml");
            if let Some(value) = read_yaml_value(&config_file, tier) {
                configs.push(value);
                sources.push(config_file);
            }
        }

        // Merge all configs
        let merged = deep_merge_all(configs);
        let mut config: Config = serde_json::from_value(merged)?;

        // Standalone plan files override same-named plans from config.yaml
        for (tier, dir) in paths.tiers() {
            for (name, plan, file) in load_plan_files(dir, tier)? {
                debug!(plan = %name, tier = %tier, "Loaded plan file");
                config.plans.insert(name, plan);
                sources.push(file);
            }
        }

        // Tier 4: Environment variable overrides
        Self::apply_env_overrides(&mut config);

        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides(config: &mut Config) {
        if let Ok(root) = std::env::var("CONFPUSH_ROOT") {
            config.publish.root = PathBuf::from(root);
        }

        if let Ok(program) = std::env::var("CONFPUSH_GIT_BIN") {
            config.git.program = program;
        }

        if let Ok(remote) = std::env::var("CONFPUSH_REMOTE") {
            config.git.remote = Some(remote);
        }

        if let Ok(branch) = std::env::var("CONFPUSH_BRANCH") {
            config.git.branch = Some(branch);
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Files that contributed to the configuration, lowest priority first.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Get the project directory.
    pub fn project_dir(&self) -> Option<&Path> {
        self.paths.project_dir.as_deref()
    }

    /// Get the user directory.
    pub fn user_dir(&self) -> Option<&Path> {
        self.paths.user_dir.as_deref()
    }
}

/// Read a YAML file as a JSON value for merging.
///
/// Missing files are skipped silently; unreadable or malformed files are
/// skipped with a warning so one bad tier does not block the others.
fn read_yaml_value(path: &Path, tier: ConfigTier) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), tier = %tier, "Cannot read config file: {}", e);
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), tier = %tier, "Ignoring malformed config file: {}", e);
            None
        }
    }
}

/// Load every `plan-<name>.yaml` in `dir`, sorted by name.
fn load_plan_files(dir: &Path, tier: ConfigTier) -> Result<Vec<(String, PlanConfig, PathBuf)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut plans = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = plan_name_from_path(&path) else {
            continue;
        };
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {} plan {}", tier, path.display()))?;
        let plan: PlanConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {} plan {}", tier, path.display()))?;
        plans.push((name, plan, path));
    }
    plans.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(plans)
}

/// `confpush/plan-render-docker.yaml` → `render-docker`.
fn plan_name_from_path(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if ext != "yaml" && ext != "yml" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let name = stem.strip_prefix(PLAN_FILE_PREFIX)?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_paths_discover() {
        let paths = ConfigPaths::discover();
        assert!(paths.project_dir.is_some());
        // user_dir may or may not exist depending on environment
    }

    #[test]
    fn test_load_defaults_only() {
        // Create empty temp dirs so no config files are found
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );

        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        let config = loader.config();

        assert_eq!(config.git.program, "git");
        assert!(config.plans.is_empty());
        assert!(loader.sources().is_empty());
    }

    #[test]
    fn test_user_config_overrides_project() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("confpush");
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::create_dir_all(&user_dir).unwrap();

        let project_config = r#"
git:
  remote: origin
  branch: main
publish:
  allow_nothing_to_commit: true
"#;
        std::fs::write(project_dir.join("config.yaml"), project_config).unwrap();

        let user_config = r#"
git:
  remote: upstream
"#;
        std::fs::write(user_dir.join("config.yaml"), user_config).unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), Some(user_dir));
        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        let config = loader.config();

        // remote from user, branch and publish settings from project
        assert_eq!(config.git.remote.as_deref(), Some("upstream"));
        assert_eq!(config.git.branch.as_deref(), Some("main"));
        assert!(config.publish.allow_nothing_to_commit);
        assert_eq!(loader.sources().len(), 2);
    }

    #[test]
    fn test_malformed_tier_is_skipped() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("confpush");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join("config.yaml"), "git: [unclosed").unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), None);
        let loader = ConfigLoader::load_with_paths(paths).unwrap();

        assert_eq!(loader.config().git.program, "git");
    }

    #[test]
    fn test_plan_name_from_path() {
        assert_eq!(
            plan_name_from_path(Path::new("confpush/plan-render-docker.yaml")).as_deref(),
            Some("render-docker")
        );
        assert_eq!(
            plan_name_from_path(Path::new("plan-fix-json.yml")).as_deref(),
            Some("fix-json")
        );
        assert_eq!(plan_name_from_path(Path::new("config.yaml")), None);
        assert_eq!(plan_name_from_path(Path::new("plan-.yaml")), None);
        assert_eq!(plan_name_from_path(Path::new("plan-notes.txt")), None);
    }
}
