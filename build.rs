use std::process::Command;

// Stamp `smsvc --version` with the git revision it was built from.
// Builds outside a checkout (release tarballs) just omit the hash.
fn main() {
    let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
    else {
        return;
    };
    if !output.status.success() {
        return;
    }
    if let Ok(revision) = String::from_utf8(output.stdout) {
        println!("cargo:rustc-env=SMSVC_GIT_HASH={}", revision.trim());
    }
}
