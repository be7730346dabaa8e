//! Config command: show the effective configuration and where it came from.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{flipdeck_home, project_config_path, snapshots_dir, Config};

/// Options for the config command.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the config command.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshots_dir: Option<PathBuf>,
    /// User config file and whether it exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_config: Option<ConfigFile>,
    pub project_config: ConfigFile,
    /// The merged configuration in effect.
    pub effective: Config,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub exists: bool,
}

impl ConfigFile {
    fn at(path: PathBuf) -> Self {
        let exists = path.is_file();
        Self { path, exists }
    }
}

/// The config command implementation.
pub struct ConfigCommand {
    config: Config,
    cwd: PathBuf,
}

impl ConfigCommand {
    pub fn new(config: Config, cwd: impl AsRef<Path>) -> Self {
        Self {
            config,
            cwd: cwd.as_ref().to_path_buf(),
        }
    }

    pub fn run(&self) -> ConfigOutput {
        let home = flipdeck_home();
        ConfigOutput {
            success: true,
            user_config: home.as_ref().map(|h| ConfigFile::at(h.join("config.toml"))),
            home,
            snapshots_dir: snapshots_dir(),
            project_config: ConfigFile::at(project_config_path(&self.cwd)),
            effective: self.config.clone(),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ConfigOutput, options: &ConfigOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &ConfigOutput) -> String {
        let describe = |file: &ConfigFile| {
            format!(
                "{}{}",
                file.path.display(),
                if file.exists { "" } else { " (not found)" }
            )
        };

        let mut lines = Vec::new();
        if let Some(home) = &output.home {
            lines.push(format!("# home: {}", home.display()));
        }
        if let Some(user) = &output.user_config {
            lines.push(format!("# user config: {}", describe(user)));
        }
        lines.push(format!("# project config: {}", describe(&output.project_config)));
        lines.push(String::new());
        match output.effective.to_toml() {
            Ok(toml) => lines.push(toml),
            Err(e) => lines.push(format!("# could not render config: {}", e)),
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_reports_paths_and_effective_config() {
        let home = TempDir::new().unwrap();
        env::set_var("FLIPDECK_HOME", home.path());
        let project = TempDir::new().unwrap();
        let project_path = project_config_path(project.path());
        fs::create_dir_all(project_path.parent().unwrap()).unwrap();
        fs::write(&project_path, "[policy]\nlearned_threshold = 3\n").unwrap();

        let config = Config::load_from_cwd(project.path());
        let cmd = ConfigCommand::new(config, project.path());
        let output = cmd.run();

        assert_eq!(output.home.as_deref(), Some(home.path()));
        assert_eq!(output.snapshots_dir, Some(home.path().join("snapshots")));
        assert!(!output.user_config.as_ref().unwrap().exists);
        assert!(output.project_config.exists);
        assert_eq!(output.effective.policy.learned_threshold, 3);

        let formatted = cmd.format_output(&output, &ConfigOptions::default());
        assert!(formatted.contains("(not found)"));
        assert!(formatted.contains("learned_threshold = 3"));

        env::remove_var("FLIPDECK_HOME");
    }

    #[test]
    #[serial]
    fn test_format_output_json() {
        let home = TempDir::new().unwrap();
        env::set_var("FLIPDECK_HOME", home.path());

        let cmd = ConfigCommand::new(Config::default(), home.path());
        let output = cmd.run();
        let formatted = cmd.format_output(
            &output,
            &ConfigOptions {
                json: true,
                ..Default::default()
            },
        );
        assert!(formatted.contains("\"debounce_ms\": 2000"));

        env::remove_var("FLIPDECK_HOME");
    }
}
