//! Configuration loading for flipdeck.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.flipdeck/config.toml`)
//! 3. User config (`~/.flipdeck/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The system runs with sensible defaults
//! when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::core::{Graduation, MasteryPolicy, RebuildOrder, ReinsertPolicy, LEARNED_THRESHOLD};
use crate::error::{FlipdeckError, Result};

/// Main configuration struct for flipdeck.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Mastery and reinsertion policy.
    pub policy: PolicyConfig,
    /// Full-rebuild behavior.
    pub queue: QueueConfig,
    /// Snapshot persistence.
    pub persistence: PersistenceConfig,
    /// Source deck location.
    pub deck: DeckConfig,
}

/// Mastery and reinsertion policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PolicyConfig {
    /// `know_count` at which a card counts as learned.
    pub learned_threshold: u32,
    /// `know_count` lost on a failed review.
    pub failure_decrement: u32,
    /// Queue index a failed card returns to.
    pub failure_reinsert_offset: usize,
    pub success_reinsert_base: usize,
    pub success_reinsert_step: usize,
    pub success_reinsert_jitter: usize,
    /// When a known card leaves the queue.
    pub graduation: Graduation,
    /// Consecutive successes required for learned (0 disables the rule).
    pub streak_length: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        let reinsert = ReinsertPolicy::default();
        Self {
            learned_threshold: LEARNED_THRESHOLD,
            failure_decrement: 1,
            failure_reinsert_offset: reinsert.failure_offset,
            success_reinsert_base: reinsert.success_base,
            success_reinsert_step: reinsert.success_step,
            success_reinsert_jitter: reinsert.success_jitter,
            graduation: reinsert.graduation,
            streak_length: 0,
        }
    }
}

/// Minimum accepted learned threshold.
pub const MIN_LEARNED_THRESHOLD: u32 = 1;

/// Full-rebuild configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QueueConfig {
    /// Sort direction by `know_count`.
    pub rebuild_order: RebuildOrder,
    /// Shuffle after sorting.
    pub shuffle_on_rebuild: bool,
}

/// Snapshot persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Quiet period before a snapshot is written, in milliseconds.
    /// 0 writes every snapshot immediately.
    pub debounce_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self { debounce_ms: 2000 }
    }
}

/// Source deck configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeckConfig {
    /// Path to the JSON deck file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.flipdeck/config.toml` in cwd)
    /// 3. User config (`~/.flipdeck/config.toml`)
    /// 4. Defaults
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(e) => {
                tracing::warn!("current directory unavailable ({}), skipping project config", e);
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config.validate();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();
        config.validate();
        config
    }

    fn load_user_config() -> Option<Config> {
        let path = flipdeck_home()?.join("config.toml");
        Self::load_optional(&path)
    }

    fn load_project_config(cwd: &Path) -> Option<Config> {
        Self::load_optional(&project_config_path(cwd))
    }

    /// A missing file is silent; an unreadable or invalid one is warned about.
    fn load_optional(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("ignoring config {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| FlipdeckError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| FlipdeckError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        let policy = &mut self.policy;
        override_from_env("FLIPDECK_LEARNED_THRESHOLD", &mut policy.learned_threshold);
        override_from_env("FLIPDECK_FAILURE_DECREMENT", &mut policy.failure_decrement);
        override_from_env("FLIPDECK_FAILURE_OFFSET", &mut policy.failure_reinsert_offset);
        override_from_env("FLIPDECK_SUCCESS_BASE", &mut policy.success_reinsert_base);
        override_from_env("FLIPDECK_SUCCESS_STEP", &mut policy.success_reinsert_step);
        override_from_env("FLIPDECK_SUCCESS_JITTER", &mut policy.success_reinsert_jitter);
        override_from_env("FLIPDECK_STREAK_LENGTH", &mut policy.streak_length);
        override_from_env("FLIPDECK_GRADUATION", &mut policy.graduation);
        override_from_env("FLIPDECK_REBUILD_ORDER", &mut self.queue.rebuild_order);
        override_from_env(
            "FLIPDECK_SHUFFLE_ON_REBUILD",
            &mut self.queue.shuffle_on_rebuild,
        );
        override_from_env("FLIPDECK_DEBOUNCE_MS", &mut self.persistence.debounce_ms);

        if let Ok(val) = env::var("FLIPDECK_DECK") {
            if val.trim().is_empty() {
                tracing::warn!("FLIPDECK_DECK is empty, ignoring");
            } else {
                self.deck.path = Some(PathBuf::from(val));
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// Non-default fields of `other` win, field by field. A layer therefore
    /// cannot set a value back to its default once a lower layer changed it.
    fn merge(mut self, other: Config) -> Self {
        let default_policy = PolicyConfig::default();
        macro_rules! take_if_set {
            ($($section:ident . $field:ident, $default:expr);* $(;)?) => {
                $(
                    if other.$section.$field != $default.$field {
                        self.$section.$field = other.$section.$field;
                    }
                )*
            };
        }

        take_if_set! {
            policy.learned_threshold, default_policy;
            policy.failure_decrement, default_policy;
            policy.failure_reinsert_offset, default_policy;
            policy.success_reinsert_base, default_policy;
            policy.success_reinsert_step, default_policy;
            policy.success_reinsert_jitter, default_policy;
            policy.graduation, default_policy;
            policy.streak_length, default_policy;
            queue.rebuild_order, QueueConfig::default();
            queue.shuffle_on_rebuild, QueueConfig::default();
            persistence.debounce_ms, PersistenceConfig::default();
        }

        if other.deck.path.is_some() {
            self.deck.path = other.deck.path;
        }

        self
    }

    /// Clamp values that would make the scheduler meaningless.
    pub fn validate(&mut self) {
        if self.policy.learned_threshold < MIN_LEARNED_THRESHOLD {
            tracing::warn!(
                "learned_threshold {} is below {}, clamping",
                self.policy.learned_threshold,
                MIN_LEARNED_THRESHOLD
            );
            self.policy.learned_threshold = MIN_LEARNED_THRESHOLD;
        }
    }

    /// Mastery rules for the card store.
    pub fn mastery_policy(&self) -> MasteryPolicy {
        MasteryPolicy {
            learned_threshold: self.policy.learned_threshold,
            streak_length: self.policy.streak_length,
            failure_decrement: self.policy.failure_decrement,
        }
    }

    /// Reinsertion rules for the queue.
    pub fn reinsert_policy(&self) -> ReinsertPolicy {
        ReinsertPolicy {
            failure_offset: self.policy.failure_reinsert_offset,
            success_base: self.policy.success_reinsert_base,
            success_step: self.policy.success_reinsert_step,
            success_jitter: self.policy.success_reinsert_jitter,
            graduation: self.policy.graduation,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.persistence.debounce_ms)
    }

    /// Deck path, resolved against `cwd` when relative.
    pub fn deck_path(&self, cwd: &Path) -> Option<PathBuf> {
        self.deck.path.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                cwd.join(p)
            }
        })
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FlipdeckError::config(e.to_string()))
    }
}

/// Overwrite `target` with the parsed value of `name`, if set and valid.
fn override_from_env<T>(name: &str, target: &mut T)
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Ok(val) = env::var(name) else {
        return;
    };
    match val.trim().parse::<T>() {
        Ok(parsed) => *target = parsed,
        Err(e) => tracing::warn!(
            "Invalid {} value '{}' ({}). Using '{}'.",
            name,
            val,
            e,
            target
        ),
    }
}

/// Get the flipdeck home directory.
///
/// Checks `FLIPDECK_HOME` first, then falls back to `~/.flipdeck`. An empty
/// `FLIPDECK_HOME` is ignored.
pub fn flipdeck_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("FLIPDECK_HOME") {
        if home.is_empty() {
            tracing::warn!("FLIPDECK_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("FLIPDECK_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".flipdeck"));
    }

    // Containerized/minimal environments without HOME
    let fallback_path = fallback_flipdeck_home();
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

#[cfg(unix)]
fn fallback_flipdeck_home() -> PathBuf {
    use std::os::unix::fs::MetadataExt;
    let uid = std::fs::metadata("/").map(|m| m.uid()).unwrap_or(0);
    env::temp_dir().join(format!("flipdeck-{}", uid))
}

#[cfg(not(unix))]
fn fallback_flipdeck_home() -> PathBuf {
    env::temp_dir().join("flipdeck")
}

/// Returns `<flipdeck_home>/snapshots/`.
pub fn snapshots_dir() -> Option<PathBuf> {
    flipdeck_home().map(|h| h.join("snapshots"))
}

/// Returns `<flipdeck_home>/crash.log`.
pub fn crash_log_path() -> Option<PathBuf> {
    flipdeck_home().map(|h| h.join("crash.log"))
}

/// Returns `<cwd>/.flipdeck/config.toml`.
pub fn project_config_path(cwd: &Path) -> PathBuf {
    cwd.join(".flipdeck").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const ENV_VARS: &[&str] = &[
        "FLIPDECK_LEARNED_THRESHOLD",
        "FLIPDECK_FAILURE_DECREMENT",
        "FLIPDECK_FAILURE_OFFSET",
        "FLIPDECK_SUCCESS_BASE",
        "FLIPDECK_SUCCESS_STEP",
        "FLIPDECK_SUCCESS_JITTER",
        "FLIPDECK_STREAK_LENGTH",
        "FLIPDECK_GRADUATION",
        "FLIPDECK_REBUILD_ORDER",
        "FLIPDECK_SHUFFLE_ON_REBUILD",
        "FLIPDECK_DEBOUNCE_MS",
        "FLIPDECK_DECK",
    ];

    /// Point FLIPDECK_HOME at an empty temp dir and clear every override.
    fn isolated_home() -> TempDir {
        let home = TempDir::new().unwrap();
        env::set_var("FLIPDECK_HOME", home.path());
        for var in ENV_VARS {
            env::remove_var(var);
        }
        home
    }

    fn write_project_config(dir: &Path, content: &str) {
        let path = project_config_path(dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.policy.learned_threshold, 5);
        assert_eq!(config.policy.failure_decrement, 1);
        assert_eq!(config.policy.failure_reinsert_offset, 2);
        assert_eq!(config.policy.success_reinsert_base, 2);
        assert_eq!(config.policy.success_reinsert_step, 2);
        assert_eq!(config.policy.success_reinsert_jitter, 2);
        assert_eq!(config.policy.graduation, Graduation::OnLearned);
        assert_eq!(config.policy.streak_length, 0);
        assert_eq!(config.queue.rebuild_order, RebuildOrder::Descending);
        assert!(!config.queue.shuffle_on_rebuild);
        assert_eq!(config.persistence.debounce_ms, 2000);
        assert!(config.deck.path.is_none());
    }

    #[test]
    fn test_policies_match_defaults() {
        let config = Config::default();
        assert_eq!(config.mastery_policy(), MasteryPolicy::default());
        assert_eq!(config.reinsert_policy(), ReinsertPolicy::default());
        assert_eq!(config.debounce(), Duration::from_secs(2));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        let toml_content = r#"
[policy]
learned_threshold = 3
failure_decrement = 2
graduation = "after_learned_review"

[queue]
rebuild_order = "ascending"
shuffle_on_rebuild = true
"#;
        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_file(&config_path).unwrap();

        assert_eq!(config.policy.learned_threshold, 3);
        assert_eq!(config.policy.failure_decrement, 2);
        assert_eq!(config.policy.graduation, Graduation::AfterLearnedReview);
        assert_eq!(config.queue.rebuild_order, RebuildOrder::Ascending);
        assert!(config.queue.shuffle_on_rebuild);

        // Other fields should be defaults
        assert_eq!(config.policy.failure_reinsert_offset, 2);
        assert_eq!(config.persistence.debounce_ms, 2000);
    }

    #[test]
    fn test_load_from_file_missing() {
        let result = Config::load_from_file(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "this is not valid toml [[[").unwrap();

        let result = Config::load_from_file(&config_path);
        assert!(matches!(result, Err(FlipdeckError::Config { .. })));
    }

    #[test]
    #[serial]
    fn test_project_config_precedence() {
        let _home = isolated_home();
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[policy]\nfailure_reinsert_offset = 4\n");

        let config = Config::load_from_cwd(dir.path());

        assert_eq!(config.policy.failure_reinsert_offset, 4);
        assert_eq!(config.policy.learned_threshold, 5);

        env::remove_var("FLIPDECK_HOME");
    }

    #[test]
    #[serial]
    fn test_project_overrides_user_config() {
        let home = isolated_home();
        fs::write(
            home.path().join("config.toml"),
            "[policy]\nlearned_threshold = 8\nstreak_length = 3\n",
        )
        .unwrap();
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[policy]\nlearned_threshold = 6\n");

        let config = Config::load_from_cwd(dir.path());

        assert_eq!(config.policy.learned_threshold, 6);
        // Untouched by the project layer
        assert_eq!(config.policy.streak_length, 3);

        env::remove_var("FLIPDECK_HOME");
    }

    #[test]
    #[serial]
    fn test_env_var_precedence() {
        let _home = isolated_home();
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[policy]\nfailure_reinsert_offset = 4\n");

        env::set_var("FLIPDECK_FAILURE_OFFSET", "7");
        let config = Config::load_from_cwd(dir.path());
        assert_eq!(config.policy.failure_reinsert_offset, 7);

        env::remove_var("FLIPDECK_FAILURE_OFFSET");
        env::remove_var("FLIPDECK_HOME");
    }

    #[test]
    #[serial]
    fn test_env_var_overrides() {
        let _home = isolated_home();
        let dir = TempDir::new().unwrap();

        env::set_var("FLIPDECK_LEARNED_THRESHOLD", "3");
        env::set_var("FLIPDECK_FAILURE_DECREMENT", "2");
        env::set_var("FLIPDECK_FAILURE_OFFSET", "1");
        env::set_var("FLIPDECK_SUCCESS_BASE", "4");
        env::set_var("FLIPDECK_SUCCESS_STEP", "3");
        env::set_var("FLIPDECK_GRADUATION", "after_learned_review");
        env::set_var("FLIPDECK_REBUILD_ORDER", "ascending");
        env::set_var("FLIPDECK_DEBOUNCE_MS", "0");
        env::set_var("FLIPDECK_DECK", "decks/spanish.json");

        let config = Config::load_from_cwd(dir.path());

        assert_eq!(config.policy.learned_threshold, 3);
        assert_eq!(config.policy.failure_decrement, 2);
        assert_eq!(config.policy.failure_reinsert_offset, 1);
        assert_eq!(config.policy.success_reinsert_base, 4);
        assert_eq!(config.policy.success_reinsert_step, 3);
        assert_eq!(config.policy.graduation, Graduation::AfterLearnedReview);
        assert_eq!(config.queue.rebuild_order, RebuildOrder::Ascending);
        assert_eq!(config.persistence.debounce_ms, 0);
        assert_eq!(
            config.deck.path.as_deref(),
            Some(Path::new("decks/spanish.json"))
        );

        for var in ENV_VARS {
            env::remove_var(var);
        }
        env::remove_var("FLIPDECK_HOME");
    }

    #[test]
    #[serial]
    fn test_env_var_overrides_jitter_streak_and_shuffle() {
        let _home = isolated_home();
        let dir = TempDir::new().unwrap();

        env::set_var("FLIPDECK_SUCCESS_JITTER", "0");
        env::set_var("FLIPDECK_STREAK_LENGTH", "3");
        env::set_var("FLIPDECK_SHUFFLE_ON_REBUILD", "true");

        let config = Config::load_from_cwd(dir.path());

        assert_eq!(config.policy.success_reinsert_jitter, 0);
        assert_eq!(config.policy.streak_length, 3);
        assert!(config.queue.shuffle_on_rebuild);
        assert_eq!(config.reinsert_policy().success_jitter, 0);
        assert_eq!(config.mastery_policy().streak_length, 3);

        env::set_var("FLIPDECK_SHUFFLE_ON_REBUILD", "sometimes");
        let config = Config::load_from_cwd(dir.path());
        assert!(!config.queue.shuffle_on_rebuild);

        for var in ENV_VARS {
            env::remove_var(var);
        }
        env::remove_var("FLIPDECK_HOME");
    }

    #[test]
    #[serial]
    fn test_env_var_invalid_values_ignored() {
        let _home = isolated_home();
        let dir = TempDir::new().unwrap();

        env::set_var("FLIPDECK_LEARNED_THRESHOLD", "many");
        env::set_var("FLIPDECK_GRADUATION", "never");
        env::set_var("FLIPDECK_DEBOUNCE_MS", "-5");

        let config = Config::load_from_cwd(dir.path());

        assert_eq!(config.policy.learned_threshold, 5);
        assert_eq!(config.policy.graduation, Graduation::OnLearned);
        assert_eq!(config.persistence.debounce_ms, 2000);

        for var in ENV_VARS {
            env::remove_var(var);
        }
        env::remove_var("FLIPDECK_HOME");
    }

    #[test]
    #[serial]
    fn test_zero_threshold_is_clamped() {
        let _home = isolated_home();
        let dir = TempDir::new().unwrap();
        env::set_var("FLIPDECK_LEARNED_THRESHOLD", "0");

        let config = Config::load_from_cwd(dir.path());
        assert_eq!(config.policy.learned_threshold, MIN_LEARNED_THRESHOLD);

        env::remove_var("FLIPDECK_LEARNED_THRESHOLD");
        env::remove_var("FLIPDECK_HOME");
    }

    #[test]
    #[serial]
    fn test_invalid_project_config_falls_back() {
        let _home = isolated_home();
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[policy\nbroken");

        let config = Config::load_from_cwd(dir.path());
        assert_eq!(config, Config::default());

        env::remove_var("FLIPDECK_HOME");
    }

    #[test]
    fn test_merge_field_by_field() {
        let mut base = Config::default();
        base.policy.learned_threshold = 8;
        base.persistence.debounce_ms = 500;

        let mut layer = Config::default();
        layer.policy.failure_decrement = 2;
        layer.deck.path = Some(PathBuf::from("deck.json"));

        let merged = base.merge(layer);

        assert_eq!(merged.policy.learned_threshold, 8);
        assert_eq!(merged.policy.failure_decrement, 2);
        assert_eq!(merged.persistence.debounce_ms, 500);
        assert_eq!(merged.deck.path, Some(PathBuf::from("deck.json")));
    }

    #[test]
    fn test_deck_path_resolution() {
        let mut config = Config::default();
        assert!(config.deck_path(Path::new("/work")).is_none());

        config.deck.path = Some(PathBuf::from("cards.json"));
        assert_eq!(
            config.deck_path(Path::new("/work")),
            Some(PathBuf::from("/work/cards.json"))
        );

        config.deck.path = Some(PathBuf::from("/decks/cards.json"));
        assert_eq!(
            config.deck_path(Path::new("/work")),
            Some(PathBuf::from("/decks/cards.json"))
        );
    }

    #[test]
    #[serial]
    fn test_flipdeck_home_with_env() {
        let dir = TempDir::new().unwrap();
        env::set_var("FLIPDECK_HOME", dir.path());

        assert_eq!(flipdeck_home().unwrap(), dir.path());
        assert_eq!(snapshots_dir().unwrap(), dir.path().join("snapshots"));
        assert_eq!(crash_log_path().unwrap(), dir.path().join("crash.log"));

        env::remove_var("FLIPDECK_HOME");
    }

    #[test]
    #[serial]
    fn test_flipdeck_home_empty_env() {
        env::set_var("FLIPDECK_HOME", "");

        let home = flipdeck_home();
        assert!(home.is_some());
        assert!(home.unwrap().to_string_lossy().contains("flipdeck"));

        env::remove_var("FLIPDECK_HOME");
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = Config::default();
        config.policy.graduation = Graduation::AfterLearnedReview;
        config.queue.rebuild_order = RebuildOrder::Ascending;
        config.deck.path = Some(PathBuf::from("deck.json"));

        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("graduation = \"after_learned_review\""));

        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[persistence]\ndebounce_ms = 250\n").unwrap();
        assert_eq!(config.persistence.debounce_ms, 250);
        assert_eq!(config.policy, PolicyConfig::default());
    }
}
