//! Environment overlay for the toolchain process
//!
//! The overlay is applied on top of the inherited environment: variables it
//! does not name pass through unchanged, variables it names are replaced.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::process::Command;

use super::BuildRequest;

/// Redirects cargo's output root
pub const TARGET_DIR_VAR: &str = "CARGO_BUILD_TARGET_DIR";

/// LTO mode of cargo's `release` profile
pub const RELEASE_LTO_VAR: &str = "CARGO_PROFILE_RELEASE_LTO";

/// Extra rustc flags
pub const RUSTFLAGS_VAR: &str = "RUSTFLAGS";

/// Links the C runtime statically on Windows targets
pub const STATIC_CRT_RUSTFLAGS: &str = "-C target-feature=+crt-static";

/// Variables set for one toolchain invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentOverlay {
    vars: BTreeMap<String, OsString>,
}

impl EnvironmentOverlay {
    /// Derive the overlay for a request
    pub fn from_request(request: &BuildRequest) -> Self {
        let mut overlay = Self::default();
        overlay.set(TARGET_DIR_VAR, request.build_dir.as_os_str());

        // A cdylib on ELF platforms does not export public symbols of its
        // dependencies, even when they are re-exported in the Rust source
        // (rust-lang/rfcs#2771). LTO works around it. The variable only
        // affects cargo's `release` profile, so it is set for every profile.
        overlay.set(RELEASE_LTO_VAR, "thin");

        if is_windows_os(&request.target_os) {
            // Without this the library needs the MSVC runtime redistributable
            overlay.set(RUSTFLAGS_VAR, STATIC_CRT_RUSTFLAGS);
        }

        overlay
    }

    fn set(&mut self, key: &str, value: impl AsRef<OsStr>) {
        self.vars.insert(key.to_string(), value.as_ref().to_os_string());
    }

    /// Value of a variable in the overlay
    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(key).map(|v| v.as_os_str())
    }

    /// Variables in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_os_str()))
    }

    /// Apply the overlay to a command, keeping the inherited environment
    pub fn apply(&self, cmd: &mut Command) {
        cmd.envs(self.iter());
    }
}

/// Whether a Node.js platform name denotes Windows
pub fn is_windows_os(target_os: &str) -> bool {
    target_os.eq_ignore_ascii_case("win32") || target_os.eq_ignore_ascii_case("windows")
}
