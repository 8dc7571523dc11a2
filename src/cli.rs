//! CLI argument parsing using clap derive macros

use std::ffi::OsString;
use std::iter;
use std::path::PathBuf;

use clap::builder::NonEmptyStringValueParser;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::build::artifact::PublishedArtifact;
use crate::build::{self, default_out_dir, BuildRequest, Profile, DEFAULT_BUILD_DIR};
use crate::config::ProjectConfig;
use crate::error::{BuildError, UsageError};
use crate::utils::cmdline::{effective_args, join_quoted, Platform};
use crate::utils::terminal::{print_info, print_success};

/// Program name used as argv[0] when parsing
const BIN_NAME: &str = "build-native";

/// build-native - Build a cargo cdylib as a Node.js native addon
///
/// Runs `cargo build` for one target and copies the resulting shared
/// library to `<out-dir>/<lib>_<os>_<arch>.node`.
#[derive(Parser, Debug)]
#[command(name = "build-native")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Destination directory (default: build/<PROFILE>)
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Cargo build directory
    #[arg(long, value_name = "DIR", default_value = DEFAULT_BUILD_DIR)]
    pub build_dir: PathBuf,

    /// Build profile
    #[arg(long, value_enum, value_name = "PROFILE", default_value_t = Profile::Release)]
    pub profile: Profile,

    /// Node.js OS name (eg. linux, darwin, win32)
    #[arg(long, value_name = "OS", value_parser = NonEmptyStringValueParser::new())]
    pub os: String,

    /// Node.js arch (eg. x64, ia32, arm64)
    #[arg(long, value_name = "ARCH", value_parser = NonEmptyStringValueParser::new())]
    pub arch: String,

    /// Cargo target triple
    #[arg(long, value_name = "TARGET", value_parser = NonEmptyStringValueParser::new())]
    pub target: String,

    /// Project configuration (default: ./build-native.toml if present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the toolchain environment and command before running it
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Turn parsed flags into an immutable build request
    pub fn into_request(self) -> BuildRequest {
        BuildRequest {
            out_dir: self.out_dir.unwrap_or_else(|| default_out_dir(self.profile)),
            build_dir: self.build_dir,
            profile: self.profile,
            target_os: self.os,
            target_arch: self.arch,
            target_triple: self.target,
            config: self.config,
            verbose: self.verbose,
        }
    }
}

/// Resolve raw process arguments (without argv[0]) into a build request
///
/// On Windows the arguments are re-split with Windows quoting rules first,
/// see [`effective_args`]. The effective list is logged so quoting problems
/// can be diagnosed from the build output.
///
/// Path arguments are kept as raw OS strings, so a non-UTF-8 `--out-dir`
/// or `--build-dir` reaches the filesystem unchanged on Unix.
pub fn resolve_arguments(raw_args: &[OsString], platform: Platform) -> Result<BuildRequest, UsageError> {
    let args = effective_args(raw_args, platform).map_err(|arg| {
        Cli::command().error(
            ErrorKind::InvalidUtf8,
            format!("invalid UTF-8 in argument '{}'", arg.to_string_lossy()),
        )
    })?;

    let shown: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
    print_info(&format!("Invoked with '{}'", join_quoted(&shown)));

    let cli = Cli::try_parse_from(iter::once(OsString::from(BIN_NAME)).chain(args))?;
    Ok(cli.into_request())
}

/// Run the build described by a request
pub fn execute(request: &BuildRequest) -> Result<PublishedArtifact, BuildError> {
    let config = ProjectConfig::resolve(request.config.as_deref())?;
    let published = build::run(request, &config)?;
    print_success(&format!(
        "Published {} (from {})",
        published.destination.display(),
        published.source.display()
    ));
    Ok(published)
}
