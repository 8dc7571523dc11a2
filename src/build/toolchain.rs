//! Toolchain command construction and invocation

use std::path::PathBuf;

use crate::config::ProjectConfig;
use crate::error::BuildError;
use crate::exec::subprocess::{build_command, run_command};
use crate::utils::cmdline::join_quoted;
use crate::utils::terminal::print_info;

use super::env::EnvironmentOverlay;
use super::{BuildRequest, Profile};

/// A `cargo build` invocation for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainCommand {
    /// Program as configured (name or path)
    pub program: String,
    pub args: Vec<String>,
    /// Target triple, for diagnostics
    target: String,
}

impl ToolchainCommand {
    /// Build the command line for a request
    pub fn new(request: &BuildRequest, config: &ProjectConfig) -> Self {
        let mut args = vec![
            "build".to_string(),
            "--target".to_string(),
            request.target_triple.clone(),
            "-p".to_string(),
            config.package.name.clone(),
        ];
        if request.profile == Profile::Release {
            args.push("--release".to_string());
        }

        Self {
            program: config.toolchain.program.clone(),
            args,
            target: request.target_triple.clone(),
        }
    }

    /// Full command line, quoted so it can be pasted back into a shell
    pub fn display(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.as_str());
        parts.extend(self.args.iter().map(String::as_str));
        join_quoted(&parts)
    }

    /// Resolve the program through PATH
    fn find_program(&self) -> Result<PathBuf, BuildError> {
        which::which(&self.program).map_err(|_| BuildError::missing_toolchain(&self.program))
    }

    /// Run the toolchain and wait for it
    pub fn run(&self, overlay: &EnvironmentOverlay, verbose: bool) -> Result<(), BuildError> {
        let program = self.find_program()?;

        print_info(&format!("Running '{}'", self.display()));
        if verbose {
            print_info(&format!("{:?}", build_command(&program, &self.args, overlay)));
        }

        let result = run_command(&program, &self.args, overlay)
            .map_err(|e| BuildError::io(format!("failed to run {}", self.program), e))?;

        if !result.success {
            return Err(BuildError::ToolchainFailure {
                program: self.program.clone(),
                target: self.target.clone(),
                exit_code: result.exit_code,
            });
        }

        if verbose {
            print_info(&format!("Toolchain finished in {:.1?}", result.duration));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{default_out_dir, DEFAULT_BUILD_DIR};

    fn request(profile: Profile) -> BuildRequest {
        BuildRequest {
            out_dir: default_out_dir(profile),
            build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
            profile,
            target_os: "linux".to_string(),
            target_arch: "x64".to_string(),
            target_triple: "x86_64-unknown-linux-gnu".to_string(),
            config: None,
            verbose: false,
        }
    }

    #[test]
    fn test_release_adds_release_flag() {
        let cmd = ToolchainCommand::new(&request(Profile::Release), &ProjectConfig::default());
        assert_eq!(cmd.program, "cargo");
        assert_eq!(
            cmd.args,
            vec!["build", "--target", "x86_64-unknown-linux-gnu", "-p", "bigint-utils", "--release"]
        );
        assert_eq!(
            cmd.display(),
            "cargo build --target x86_64-unknown-linux-gnu -p bigint-utils --release"
        );
    }

    #[test]
    fn test_debug_omits_release_flag() {
        let cmd = ToolchainCommand::new(&request(Profile::Debug), &ProjectConfig::default());
        assert!(!cmd.args.iter().any(|a| a == "--release"));
        assert_eq!(cmd.args.len(), 5);
    }

    #[test]
    fn test_uses_configured_package_and_program() {
        let config = ProjectConfig::parse(
            "[package]\nname = \"my-addon\"\n[toolchain]\nprogram = \"cross\"\n",
        )
        .unwrap();
        let cmd = ToolchainCommand::new(&request(Profile::Debug), &config);
        assert_eq!(cmd.program, "cross");
        assert_eq!(cmd.args[4], "my-addon");
    }

    #[test]
    fn test_missing_program_fails_before_spawn() {
        let config = ProjectConfig::parse(
            "[toolchain]\nprogram = \"no-such-toolchain-for-build-native\"\n",
        )
        .unwrap();
        let cmd = ToolchainCommand::new(&request(Profile::Release), &config);
        let err = cmd.run(&EnvironmentOverlay::default(), false).unwrap_err();
        assert!(matches!(err, BuildError::MissingToolchain { .. }));
    }
}
