//! Build configuration.
//!
//! Mirrors the teacher's `ResourceLimits`/`RenderServiceConfig` shape: a
//! plain struct with a `Default` impl and a `validate()` method, deserialized
//! from JSON rather than read from environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, CompileError};

/// Build-wide configuration, overridable via a JSON config file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Root directory for Command outputs (folder subdirectories allowed).
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Directory containing the bundled `runtime.js`.
    #[serde(default = "default_runtime_dir")]
    pub runtime_dir: PathBuf,
    /// Passed through to the bundler.
    #[serde(default)]
    pub minify: bool,
    /// One runtime module per namespace when true.
    #[serde(default)]
    pub code_split: bool,
    /// Directory `readAgentFile` resolves agent files against. Leading `~`
    /// is expanded by [`Config::agents_dir_expanded`].
    #[serde(default = "default_agents_dir")]
    pub agents_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".claude/commands")
}

fn default_runtime_dir() -> PathBuf {
    PathBuf::from(".claude/runtime")
}

fn default_agents_dir() -> PathBuf {
    PathBuf::from("~/.claude/agents/")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            runtime_dir: default_runtime_dir(),
            minify: false,
            code_split: false,
            agents_dir: default_agents_dir(),
        }
    }
}

impl Config {
    /// Reads and parses a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, CompileError> {
        let text = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        serde_json::from_str(&text).map_err(|e| CompileError::ConfigError {
            message: format!("invalid configuration at {}: {e}", path.display()),
        })
    }

    /// Validates the `outputDir`/`runtimeDir` non-nesting rule.
    pub fn validate(&self) -> Result<(), CompileError> {
        if self.output_dir == self.runtime_dir {
            return Err(CompileError::ConfigError {
                message: format!(
                    "outputDir and runtimeDir must not be equal (both {})",
                    self.output_dir.display()
                ),
            });
        }
        if self.output_dir.starts_with(&self.runtime_dir) || self.runtime_dir.starts_with(&self.output_dir)
        {
            return Err(CompileError::ConfigError {
                message: format!(
                    "outputDir ({}) and runtimeDir ({}) must not nest inside each other",
                    self.output_dir.display(),
                    self.runtime_dir.display()
                ),
            });
        }
        Ok(())
    }

    /// Expands a leading `~` in `agentsDir` to the user's home directory.
    pub fn agents_dir_expanded(&self) -> PathBuf {
        expand_tilde(&self.agents_dir)
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(stripped) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(stripped),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_equal_dirs() {
        let config = Config {
            output_dir: PathBuf::from(".claude/out"),
            runtime_dir: PathBuf::from(".claude/out"),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_nested_dirs() {
        let config = Config {
            output_dir: PathBuf::from(".claude/commands"),
            runtime_dir: PathBuf::from(".claude/commands/runtime"),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn expands_leading_tilde() {
        std::env::set_var("HOME", "/home/tester");
        let config = Config {
            agents_dir: PathBuf::from("~/.claude/agents/"),
            ..Config::default()
        };
        assert_eq!(
            config.agents_dir_expanded(),
            PathBuf::from("/home/tester/.claude/agents/")
        );
    }

    #[test]
    fn from_file_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"outputDir": "out", "runtimeDir": "rt"}"#).unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.runtime_dir, PathBuf::from("rt"));
    }
}
