//! Shared library discovery and publication
//!
//! cargo names a cdylib differently per platform. Instead of dispatching on
//! the target OS, the three known names are tried in a fixed order and the
//! first readable file wins. The order matters when the shared target
//! directory still holds stale output for other platforms: the same tree
//! always resolves to the same file.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::error::BuildError;
use crate::utils::paths::ensure_dir;
use crate::utils::terminal::{print_info, print_warning};

use super::BuildRequest;

/// Library file name patterns, in lookup order (`{}` is the library name)
pub const LIBRARY_TEMPLATES: [&str; 3] = ["{}.dll", "lib{}.so", "lib{}.dylib"];

/// A possible location of the built library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCandidate {
    /// Template the file name was derived from
    pub pattern: &'static str,
    pub path: PathBuf,
}

impl ArtifactCandidate {
    /// Whether the candidate is an existing, readable regular file
    pub fn is_readable(&self) -> bool {
        self.path.is_file() && File::open(&self.path).is_ok()
    }
}

/// The library copied to its final location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifact {
    /// Library as the toolchain left it
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Candidates for a library in `libs_dir`, in lookup order
pub fn candidates<'a>(
    libs_dir: &'a Path,
    lib_name: &'a str,
) -> impl Iterator<Item = ArtifactCandidate> + 'a {
    LIBRARY_TEMPLATES.into_iter().map(move |pattern| ArtifactCandidate {
        pattern,
        path: libs_dir.join(pattern.replace("{}", lib_name)),
    })
}

/// Find the first readable candidate
///
/// Later candidates are not looked at once one matches.
pub fn locate_artifact(libs_dir: &Path, lib_name: &str) -> Result<ArtifactCandidate, BuildError> {
    let mut searched = Vec::with_capacity(LIBRARY_TEMPLATES.len());
    for candidate in candidates(libs_dir, lib_name) {
        if candidate.is_readable() {
            return Ok(candidate);
        }
        searched.push(candidate.path);
    }

    Err(BuildError::ArtifactNotFound { searched })
}

/// File name the native-extension loader expects
pub fn published_file_name(lib_name: &str, target_os: &str, target_arch: &str, extension: &str) -> String {
    format!("{}_{}_{}.{}", lib_name, target_os, target_arch, extension)
}

/// Copy the located library into the request's output directory
///
/// The source is left in place and an existing destination is overwritten.
pub fn publish_artifact(
    candidate: &ArtifactCandidate,
    request: &BuildRequest,
    lib_name: &str,
    extension: &str,
) -> Result<PublishedArtifact, BuildError> {
    let destination = request.out_dir.join(published_file_name(
        lib_name,
        &request.target_os,
        &request.target_arch,
        extension,
    ));

    print_info(&format!(
        "Copying {} to {}",
        candidate.path.display(),
        destination.display()
    ));

    if destination.exists() {
        print_warning(&format!("Overwriting {}", destination.display()));
    }

    ensure_dir(&request.out_dir).map_err(|e| {
        BuildError::io(
            format!("failed to create output directory {}", request.out_dir.display()),
            e,
        )
    })?;

    std::fs::copy(&candidate.path, &destination)
        .with_context(|| format!("Failed to copy {}", candidate.path.display()))
        .map_err(|e| BuildError::io(format!("failed to publish {}", destination.display()), e))?;

    Ok(PublishedArtifact {
        source: candidate.path.clone(),
        destination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::Profile;
    use tempfile::TempDir;

    fn touch(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn request(out_dir: PathBuf) -> BuildRequest {
        BuildRequest {
            out_dir,
            build_dir: PathBuf::from("target"),
            profile: Profile::Release,
            target_os: "linux".to_string(),
            target_arch: "x64".to_string(),
            target_triple: "x86_64-unknown-linux-gnu".to_string(),
            config: None,
            verbose: false,
        }
    }

    #[test]
    fn test_candidates_in_fixed_order() {
        let libs_dir = Path::new("target/x86_64-apple-darwin/release");
        let names: Vec<_> = candidates(libs_dir, "bigint_utils")
            .map(|c| c.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["bigint_utils.dll", "libbigint_utils.so", "libbigint_utils.dylib"]
        );
    }

    #[test]
    fn test_locate_first_match_wins() {
        let temp_dir = TempDir::new().unwrap();
        let libs_dir = temp_dir.path();
        touch(&libs_dir.join("libbigint_utils.dylib"), "macho");
        touch(&libs_dir.join("libbigint_utils.so"), "elf");

        let found = locate_artifact(libs_dir, "bigint_utils").unwrap();
        assert_eq!(found.pattern, "lib{}.so");
        assert_eq!(found.path, libs_dir.join("libbigint_utils.so"));

        touch(&libs_dir.join("bigint_utils.dll"), "pe");
        let found = locate_artifact(libs_dir, "bigint_utils").unwrap();
        assert_eq!(found.pattern, "{}.dll");
    }

    #[test]
    fn test_locate_skips_directories() {
        let temp_dir = TempDir::new().unwrap();
        let libs_dir = temp_dir.path();
        std::fs::create_dir_all(libs_dir.join("bigint_utils.dll")).unwrap();
        touch(&libs_dir.join("libbigint_utils.dylib"), "macho");

        let found = locate_artifact(libs_dir, "bigint_utils").unwrap();
        assert_eq!(found.pattern, "lib{}.dylib");
    }

    #[test]
    fn test_locate_reports_searched_paths() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("libother.so"), "elf");

        match locate_artifact(temp_dir.path(), "bigint_utils").unwrap_err() {
            BuildError::ArtifactNotFound { searched } => {
                assert_eq!(searched.len(), 3);
                assert_eq!(searched[0], temp_dir.path().join("bigint_utils.dll"));
                assert_eq!(searched[2], temp_dir.path().join("libbigint_utils.dylib"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_published_file_name() {
        assert_eq!(
            published_file_name("bigint_utils", "linux", "x64", "node"),
            "bigint_utils_linux_x64.node"
        );
    }

    #[test]
    fn test_publish_creates_out_dir_and_keeps_source() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("libs").join("libbigint_utils.so");
        touch(&source, "elf-bytes");
        let out_dir = temp_dir.path().join("build").join("Release");

        let candidate = locate_artifact(source.parent().unwrap(), "bigint_utils").unwrap();
        let published =
            publish_artifact(&candidate, &request(out_dir.clone()), "bigint_utils", "node").unwrap();

        assert_eq!(published.source, source);
        assert_eq!(published.destination, out_dir.join("bigint_utils_linux_x64.node"));
        assert_eq!(std::fs::read_to_string(&published.destination).unwrap(), "elf-bytes");
        assert!(source.exists());
    }

    #[test]
    fn test_publish_overwrites_previous_output() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("libbigint_utils.so");
        touch(&source, "new");
        let out_dir = temp_dir.path().join("out");
        touch(&out_dir.join("bigint_utils_linux_x64.node"), "stale");

        let candidate = locate_artifact(temp_dir.path(), "bigint_utils").unwrap();
        let published = publish_artifact(&candidate, &request(out_dir), "bigint_utils", "node").unwrap();
        assert_eq!(std::fs::read_to_string(published.destination).unwrap(), "new");
    }
}
