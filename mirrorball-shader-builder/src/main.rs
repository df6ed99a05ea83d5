//! Compiles `mirrorball-shaders` into SPIR-V, one module per entry point.
//!
//! For each module it prints a pair of `cargo:rustc-env` lines:
//!
//! - `mirrorball_shaders::<name>.path` - path of the compiled `.spv` file,
//! - `mirrorball_shaders::<name>.entry_point` - entry point within it,
//!
//! where `<name>` is the entry point's path without the trailing `::main`
//! (e.g. `mirror_compose`). `mirrorball`'s build script runs this binary and
//! forwards the lines to Cargo, which is how `Shaders` finds the modules.

use std::env;
use std::error::Error;
use std::path::Path;

use spirv_builder::{MetadataPrintout, SpirvBuilder};

fn main() -> Result<(), Box<dyn Error>> {
    let crate_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("mirrorball-shaders");

    let result = SpirvBuilder::new(crate_path, "spirv-unknown-spv1.3")
        .multimodule(true)
        .print_metadata(MetadataPrintout::DependencyOnly)
        .extra_arg("--spirt-passes=reduce,fuse_selects")
        .build()?;

    for (shader_name, shader_path) in result.module.unwrap_multi() {
        let shader_id = shader_name.replace("::", "_");
        let shader_id = shader_id.strip_suffix("_main").unwrap_or(&shader_id);

        println!(
            "cargo:rustc-env=mirrorball_shaders::{}.path={}",
            shader_id,
            shader_path.display()
        );

        println!(
            "cargo:rustc-env=mirrorball_shaders::{}.entry_point={}",
            shader_id, shader_name,
        );
    }

    Ok(())
}
