//! Embeds `APP_VERSION`: the package version, with `+<sha>` appended when the
//! commit is known.

use std::path::Path;
use std::process::Command;

fn commit_sha() -> Option<String> {
    // Release tarballs have no .git; packagers pass the commit instead
    if let Ok(sha) = std::env::var("EMCP_GIT_SHA")
        && !sha.trim().is_empty()
    {
        return Some(sha.trim().to_string());
    }
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let sha = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!sha.is_empty()).then_some(sha)
}

fn main() {
    let version = match commit_sha() {
        Some(sha) => format!("{}+{}", env!("CARGO_PKG_VERSION"), sha),
        None => env!("CARGO_PKG_VERSION").to_string(),
    };
    println!("cargo:rustc-env=APP_VERSION={}", version);

    println!("cargo:rerun-if-env-changed=EMCP_GIT_SHA");
    if Path::new(".git/HEAD").exists() {
        println!("cargo:rerun-if-changed=.git/HEAD");
    }
}
