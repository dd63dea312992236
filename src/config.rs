use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
type Result<T> = anyhow::Result<T>;

/// Environment variable that overrides the configured root
pub const ROOT_ENV_VAR: &str = "SANDFM_ROOT";

/// Directory name used under the home directory when no root is configured
pub const DEFAULT_ROOT_DIR: &str = "FileSystemSandbox";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SandboxConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_create_root")]
    pub create_root: bool,
}

impl SandboxConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("failed to deserialize sandbox config")
    }

    /// Apply `SANDFM_ROOT` if it is set and non-empty
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(root) = std::env::var_os(ROOT_ENV_VAR).filter(|v| !v.is_empty()) {
            self.root = PathBuf::from(root);
        }
        self
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            create_root: default_create_root(),
        }
    }
}

fn default_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_ROOT_DIR)
}

fn default_create_root() -> bool {
    true
}
