//! build-native.toml configuration parsing
//!
//! The file is optional. Every key has a default, so a project that builds
//! the `bigint-utils` package with `cargo` for the Node.js loader does not
//! need one at all.
//!
//! ```toml
//! [package]
//! name = "bigint-utils"
//!
//! [toolchain]
//! program = "cargo"
//!
//! [loader]
//! extension = "node"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::error::{hints, BuildError};

/// Configuration file looked up in the current directory
pub const CONFIG_FILE_NAME: &str = "build-native.toml";

/// Root configuration from build-native.toml
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Package to build
    pub package: PackageConfig,

    /// External toolchain settings
    pub toolchain: ToolchainConfig,

    /// Host loader settings
    pub loader: LoaderConfig,
}

/// `[package]` section
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PackageConfig {
    /// Package name passed to `cargo build -p`
    pub name: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: "bigint-utils".to_string(),
        }
    }
}

/// `[toolchain]` section
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Executable name or path of the cargo-compatible toolchain
    pub program: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            program: "cargo".to_string(),
        }
    }
}

/// `[loader]` section
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// File extension the native-extension loader expects, without the dot
    pub extension: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extension: "node".to_string(),
        }
    }
}

impl ProjectConfig {
    /// Resolve the configuration for a run
    ///
    /// An explicit path must exist. Without one, `build-native.toml` in the
    /// current directory is used when present, otherwise the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, BuildError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default_path = PathBuf::from(CONFIG_FILE_NAME);
                if !default_path.is_file() {
                    return Ok(Self::default());
                }
                default_path
            }
        };

        Self::load_from_path(&path).map_err(|e| {
            BuildError::config_error_with_hint(
                format!("failed to load {}", path.display()),
                Some(e),
                hints::invalid_config(),
            )
        })
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Self =
            toml::from_str(content).context("Failed to parse build-native.toml")?;

        if config.package.name.trim().is_empty() {
            bail!("[package].name must not be empty");
        }
        if config.toolchain.program.trim().is_empty() {
            bail!("[toolchain].program must not be empty");
        }

        let extension = config.loader.extension.trim_start_matches('.');
        if extension.is_empty() {
            bail!("[loader].extension must not be empty");
        }
        config.loader.extension = extension.to_string();

        Ok(config)
    }

    /// Library base name as the toolchain writes it (`-` becomes `_`)
    pub fn lib_name(&self) -> String {
        self.package.name.replace('-', "_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ProjectConfig::default();
        assert_eq!(config.package.name, "bigint-utils");
        assert_eq!(config.toolchain.program, "cargo");
        assert_eq!(config.loader.extension, "node");
        assert_eq!(config.lib_name(), "bigint_utils");
    }

    #[test]
    fn test_parse_empty_file_uses_defaults() {
        assert_eq!(ProjectConfig::parse("").unwrap(), ProjectConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[package]
name = "my-addon"

[toolchain]
program = "/opt/rust/bin/cargo"

[loader]
extension = ".node"
"#;

        let config = ProjectConfig::parse(toml).unwrap();
        assert_eq!(config.package.name, "my-addon");
        assert_eq!(config.lib_name(), "my_addon");
        assert_eq!(config.toolchain.program, "/opt/rust/bin/cargo");
        assert_eq!(config.loader.extension, "node");
    }

    #[test]
    fn test_parse_rejects_empty_values() {
        assert!(ProjectConfig::parse("[package]\nname = \"\"").is_err());
        assert!(ProjectConfig::parse("[toolchain]\nprogram = \" \"").is_err());
        assert!(ProjectConfig::parse("[loader]\nextension = \".\"").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        assert!(ProjectConfig::parse("[package]\nversion = \"1.0.0\"").is_err());
    }

    #[test]
    fn test_resolve_missing_explicit_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");

        let err = ProjectConfig::resolve(Some(missing.as_path())).unwrap_err();
        assert!(matches!(err, BuildError::Config { .. }));
    }

    #[test]
    #[serial]
    fn test_resolve_picks_up_file_in_current_dir() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "[package]\nname = \"from-cwd\"\n",
        )
        .unwrap();

        let previous = std::env::current_dir().unwrap();
        std::env::set_current_dir(temp_dir.path()).unwrap();
        let resolved = ProjectConfig::resolve(None);
        std::env::set_current_dir(previous).unwrap();

        assert_eq!(resolved.unwrap().package.name, "from-cwd");
    }
}
