//! With the `embedded-shaders` feature, compiles the compositor's kernel by
//! running `mirrorball-shader-builder` in a separate target directory (it
//! needs rust-gpu's own toolchain); its `mirrorball_shaders::<name>.path` and
//! `.entry_point` env lines are then picked up by `Shaders::new()`.
//!
//! Without the feature, this script does nothing and the SPIR-V has to be
//! provided at runtime through `ShaderSource`.

use std::error::Error;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::{env, process};

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_EMBEDDED_SHADERS");

    if env::var_os("CARGO_FEATURE_EMBEDDED_SHADERS").is_none() {
        return Ok(());
    }

    let profile = env::var("PROFILE").unwrap();

    println!("cargo:rerun-if-changed=../mirrorball-gpu/src");
    println!("cargo:rerun-if-changed=../mirrorball-shaders/src");
    println!("cargo:rerun-if-changed=../mirrorball-shader-builder/Cargo.toml");
    println!("cargo:rerun-if-changed=../mirrorball-shader-builder/src/main.rs");

    let mut dir = PathBuf::from(env::var_os("OUT_DIR").unwrap());

    // Strip `$profile/build/*/out`.
    let ok = dir.ends_with("out")
        && dir.pop()
        && dir.pop()
        && dir.ends_with("build")
        && dir.pop()
        && dir.ends_with(profile)
        && dir.pop();

    assert!(ok);

    let dir = dir.join("shader-builder");

    let status = Command::new("cargo")
        .args([
            "run",
            "--release",
            "-p",
            "mirrorball-shader-builder",
            "--target-dir",
        ])
        .arg(dir)
        .env_remove("CARGO_ENCODED_RUSTFLAGS")
        .stderr(Stdio::inherit())
        .stdout(Stdio::inherit())
        .status()?;

    if !status.success() {
        process::exit(status.code().unwrap_or(1));
    }

    Ok(())
}
