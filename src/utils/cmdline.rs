//! Command-line tokenization helpers
//!
//! When invoked through `npm`/`node-gyp` on Windows, arguments can arrive
//! pre-joined with Windows-style quoting. Splitting them again with POSIX
//! rules would corrupt paths such as `C:\Program Files\...`, so the
//! Windows rules used by the MSVC C runtime are implemented here instead.

use std::ffi::OsString;
use std::iter;

/// Host platform family, as far as argument handling is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    /// Platform this binary was compiled for
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

/// Join arguments with single spaces
pub fn join_space<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| arg.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a command line using the Windows (MSVC CRT) quoting rules
///
/// - spaces and tabs separate arguments outside double quotes
/// - a double quote toggles quoted mode and is dropped
/// - `2n` backslashes followed by a quote produce `n` backslashes,
///   `2n + 1` produce `n` backslashes and a literal quote
/// - `""` inside a quoted run produces a literal quote
/// - any other backslash is literal
pub fn split_windows(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let mut backslashes = 1;
                while chars.peek() == Some(&'\\') {
                    chars.next();
                    backslashes += 1;
                }
                in_token = true;
                if chars.peek() == Some(&'"') {
                    current.extend(iter::repeat('\\').take(backslashes / 2));
                    if backslashes % 2 == 1 {
                        chars.next();
                        current.push('"');
                    }
                } else {
                    current.extend(iter::repeat('\\').take(backslashes));
                }
            }
            '"' => {
                in_token = true;
                if in_quotes && chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ' ' | '\t' if !in_quotes => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }

    if in_token {
        args.push(current);
    }

    args
}

/// Quote a single argument so that [`split_windows`] reads it back unchanged
pub fn quote_windows(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains([' ', '\t', '"']) {
        return arg.to_string();
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    let mut backslashes = 0;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                quoted.extend(iter::repeat('\\').take(backslashes * 2 + 1));
                quoted.push('"');
                backslashes = 0;
            }
            c => {
                quoted.extend(iter::repeat('\\').take(backslashes));
                quoted.push(c);
                backslashes = 0;
            }
        }
    }
    // Trailing backslashes would otherwise escape the closing quote
    quoted.extend(iter::repeat('\\').take(backslashes * 2));
    quoted.push('"');
    quoted
}

/// Render arguments as one re-parsable command line
pub fn join_quoted<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| quote_windows(arg.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Effective argument list for the given platform
///
/// On Windows the raw list is rejoined and split again; elsewhere it is
/// returned unchanged, byte for byte. Re-splitting needs text, so on
/// Windows an argument that is not valid Unicode is returned as the error.
pub fn effective_args(raw_args: &[OsString], platform: Platform) -> Result<Vec<OsString>, OsString> {
    match platform {
        Platform::Windows => {
            let text = raw_args
                .iter()
                .map(|arg| arg.clone().into_string())
                .collect::<Result<Vec<String>, OsString>>()?;
            Ok(split_windows(&join_space(&text))
                .into_iter()
                .map(OsString::from)
                .collect())
        }
        Platform::Unix => Ok(raw_args.to_vec()),
    }
}
