use std::process::Command;

/// Run a command and return its trimmed stdout, if it succeeded
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn main() {
    let git_hash = command_output("git", &["rev-parse", "--short", "HEAD"])
        .unwrap_or_else(|| "unknown".to_string());
    let tagged = command_output("git", &["describe", "--exact-match", "--tags", "HEAD"]).is_some();

    // Untagged builds get a `-dev.<hash>` suffix on `qp --version`
    if tagged {
        println!("cargo:rustc-env=QP_VERSION_SUFFIX=");
    } else {
        println!("cargo:rustc-env=QP_VERSION_SUFFIX=-dev.{}", git_hash);
    }
    println!("cargo:rustc-env=QP_GIT_HASH={}", git_hash);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
}
