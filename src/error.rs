//! Error types and helpers for user-friendly error messages
//!
//! Every failure of a run ends in one of these variants. They are rendered
//! with an actionable hint and the process exits with status 1, except for
//! usage errors which keep clap's own rendering and exit code.

use std::path::PathBuf;

use thiserror::Error;

use crate::utils::terminal::print_error;

/// Invalid command-line arguments, detected before anything is spawned
#[derive(Error, Debug)]
#[error(transparent)]
pub struct UsageError(#[from] clap::Error);

impl UsageError {
    /// Print clap's usage diagnostic and exit with clap's exit code
    pub fn exit(&self) -> ! {
        self.0.exit()
    }

    /// The clap error kind (missing argument, invalid value, ...)
    #[cfg(test)]
    pub fn kind(&self) -> clap::error::ErrorKind {
        self.0.kind()
    }
}

/// Failures of the build pipeline
#[derive(Error, Debug)]
pub enum BuildError {
    /// Project configuration could not be read or is invalid
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },

    /// The toolchain program is not on PATH
    #[error("Missing tool: {tool}")]
    MissingToolchain { tool: String, hint: String },

    /// The toolchain ran and exited unsuccessfully
    #[error("{program} build failed for {target} (exit code: {})", exit_code_label(.exit_code))]
    ToolchainFailure {
        program: String,
        target: String,
        exit_code: Option<i32>,
    },

    /// The toolchain succeeded but no library was found where expected
    #[error("could not find generated library")]
    ArtifactNotFound { searched: Vec<PathBuf> },

    /// Creating the output directory or copying the library failed
    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "terminated by signal".to_string(),
    }
}

impl BuildError {
    /// Create a configuration error with source and hint
    pub fn config_error_with_hint(
        message: impl Into<String>,
        source: Option<anyhow::Error>,
        hint: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source,
            hint: Some(hint.into()),
        }
    }

    /// Create a missing toolchain error
    pub fn missing_toolchain(tool: impl Into<String>) -> Self {
        Self::MissingToolchain {
            tool: tool.into(),
            hint: hints::toolchain().to_string(),
        }
    }

    /// Wrap an I/O failure from the publish step
    pub fn io(message: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Display error with formatting and hints
    ///
    /// Diagnostics go to standard output, next to the progress lines they
    /// belong to.
    pub fn display_with_hints(&self) {
        use console::style;

        print_error(&self.to_string());

        match self {
            BuildError::Config { source, hint, .. } => {
                if let Some(source) = source {
                    println!("  {} {:#}", style("caused by:").dim(), source);
                }
                if let Some(h) = hint {
                    println!("\n{} {}", style("HINT:").yellow().bold(), h);
                }
            }
            BuildError::MissingToolchain { hint, .. } => {
                println!("\n{} {}", style("HINT:").yellow().bold(), hint);
            }
            BuildError::ToolchainFailure { .. } => {}
            BuildError::ArtifactNotFound { searched } => {
                println!("\n{}", style("SEARCHED:").cyan().bold());
                for path in searched {
                    println!("  • {}", path.display());
                }
                println!("\n{} {}", style("HINT:").yellow().bold(), hints::artifact_not_found());
            }
            BuildError::Io { source, .. } => {
                println!("  {} {:#}", style("caused by:").dim(), source);
            }
        }
    }
}

/// Common error hints
pub mod hints {
    /// Hint for a toolchain program that cannot be found
    pub fn toolchain() -> &'static str {
        "Install the Rust toolchain from https://rustup.rs/ and make sure `cargo` is on PATH,\n\
         or point [toolchain].program in build-native.toml at a cargo-compatible executable."
    }

    /// Hint for a successful build with no recognizable output
    pub fn artifact_not_found() -> &'static str {
        "The toolchain finished but no shared library was found. Check that:\n\
         • the package is built as a cdylib (crate-type = [\"cdylib\"])\n\
         • --build-dir matches the toolchain's target directory\n\
         • [package].name in build-native.toml matches the built package"
    }

    /// Hint for an invalid build-native.toml
    pub fn invalid_config() -> &'static str {
        "build-native.toml is invalid. Supported keys:\n\
         • [package] name = \"<cargo package>\"\n\
         • [toolchain] program = \"cargo\"\n\
         • [loader] extension = \"node\""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolchain_failure_message() {
        let err = BuildError::ToolchainFailure {
            program: "cargo".to_string(),
            target: "x86_64-unknown-linux-gnu".to_string(),
            exit_code: Some(101),
        };
        assert_eq!(
            err.to_string(),
            "cargo build failed for x86_64-unknown-linux-gnu (exit code: 101)"
        );

        let err = BuildError::ToolchainFailure {
            program: "cargo".to_string(),
            target: "aarch64-apple-darwin".to_string(),
            exit_code: None,
        };
        assert!(err.to_string().ends_with("(exit code: terminated by signal)"));
    }

    #[test]
    fn test_missing_toolchain_carries_hint() {
        match BuildError::missing_toolchain("cargo") {
            BuildError::MissingToolchain { tool, hint } => {
                assert_eq!(tool, "cargo");
                assert!(hint.contains("rustup"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
