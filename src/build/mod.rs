//! Native addon build orchestration
//!
//! A run goes through the stages below in order and stops at the first
//! failure. Nothing is retried.
//!
//! ```text
//! BuildRequest → env (overlay) → toolchain (cargo build) → artifact (locate, publish)
//! ```
//!
//! ## Modules
//!
//! - `env` - Environment overlay for the toolchain process
//! - `toolchain` - Toolchain command construction and invocation
//! - `artifact` - Shared library discovery and publication

pub mod artifact;
pub mod env;
pub mod toolchain;

use std::path::PathBuf;

use clap::ValueEnum;

use crate::config::ProjectConfig;
use crate::error::BuildError;
use crate::utils::terminal::print_info;

use artifact::{locate_artifact, publish_artifact, PublishedArtifact};
use env::EnvironmentOverlay;
use toolchain::ToolchainCommand;

/// Root directory of the default output location (`build/<profile>`)
pub const DEFAULT_OUT_ROOT: &str = "build";

/// Default toolchain output root
pub const DEFAULT_BUILD_DIR: &str = "target";

/// Build profile selected on the command line
///
/// Distinct from cargo's own profile names: only the output subdirectory
/// and the `--release` flag derive from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    #[default]
    #[value(name = "Release")]
    Release,
    #[value(name = "Debug")]
    Debug,
}

impl Profile {
    /// Subdirectory cargo writes this profile's output to
    pub fn output_subdir(&self) -> &'static str {
        match self {
            Profile::Release => "release",
            Profile::Debug => "debug",
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Profile::Release => write!(f, "Release"),
            Profile::Debug => write!(f, "Debug"),
        }
    }
}

/// Validated parameters of one build, immutable once resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Directory the addon is published to
    pub out_dir: PathBuf,
    /// Toolchain output root (`CARGO_BUILD_TARGET_DIR`)
    pub build_dir: PathBuf,
    pub profile: Profile,
    /// Node.js platform name (`linux`, `darwin`, `win32`, ...)
    pub target_os: String,
    /// Node.js architecture name (`x64`, `ia32`, `arm64`, ...)
    pub target_arch: String,
    /// Cargo target triple
    pub target_triple: String,
    /// Explicit build-native.toml
    pub config: Option<PathBuf>,
    pub verbose: bool,
}

impl BuildRequest {
    /// Directory cargo leaves the built library in
    pub fn libs_dir(&self) -> PathBuf {
        self.build_dir
            .join(&self.target_triple)
            .join(self.profile.output_subdir())
    }
}

/// Default output directory for a profile
pub fn default_out_dir(profile: Profile) -> PathBuf {
    PathBuf::from(DEFAULT_OUT_ROOT).join(profile.to_string())
}

/// Run the whole pipeline for one request
pub fn run(request: &BuildRequest, config: &ProjectConfig) -> Result<PublishedArtifact, BuildError> {
    let overlay = EnvironmentOverlay::from_request(request);
    if request.verbose {
        for (key, value) in overlay.iter() {
            print_info(&format!("{}={}", key, value.to_string_lossy()));
        }
    }

    let command = ToolchainCommand::new(request, config);
    command.run(&overlay, request.verbose)?;

    let lib_name = config.lib_name();
    let candidate = locate_artifact(&request.libs_dir(), &lib_name)?;
    if request.verbose {
        print_info(&format!("Matched '{}' at {}", candidate.pattern, candidate.path.display()));
    }
    publish_artifact(&candidate, request, &lib_name, &config.loader.extension)
}
