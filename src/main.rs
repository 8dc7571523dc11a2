//! build-native - packages a cargo cdylib as a Node.js native addon
//!
//! ## Architecture
//!
//! ```text
//! argv → cli (BuildRequest) → build/ (env → cargo build → locate → publish)
//! ```

mod build;
mod cli;
mod config;
mod error;
mod exec;
mod utils;

use std::ffi::OsString;
use std::process::ExitCode;

use utils::cmdline::Platform;

fn main() -> ExitCode {
    let raw_args: Vec<OsString> = std::env::args_os().skip(1).collect();

    let request = match cli::resolve_arguments(&raw_args, Platform::current()) {
        Ok(request) => request,
        Err(err) => err.exit(),
    };

    match cli::execute(&request) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            err.display_with_hints();
            ExitCode::FAILURE
        }
    }
}
