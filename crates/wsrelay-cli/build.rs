//! Build script that stamps the binary with `WSRELAY_VERSION`.
//!
//! A tagged commit reports its tag. Any other commit reports the package
//! version with the short commit hash appended. Outside a git checkout the
//! package version is used as is.

use std::process::Command;

fn main() {
    // Rebuild when HEAD moves or a tag is added
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/refs/");

    let package = env!("CARGO_PKG_VERSION");
    let version = match git(&["describe", "--tags", "--exact-match"]) {
        Some(tag) => tag.trim_start_matches('v').to_string(),
        None => match git(&["rev-parse", "--short", "HEAD"]) {
            Some(commit) => format!("{}+{}", package, commit),
            None => package.to_string(),
        },
    };

    println!("cargo:rustc-env=WSRELAY_VERSION={}", version);
}

/// Run git, returning its trimmed stdout when it succeeds with output.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8(output.stdout).ok()?;
    let stdout = stdout.trim();
    (!stdout.is_empty()).then(|| stdout.to_string())
}
