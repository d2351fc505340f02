use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

/// Publish memory.x (flash, RAM and the reserved settings page) to the linker
fn main() -> Result<(), Box<dyn Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    fs::write(out_dir.join("memory.x"), fs::read("memory.x")?)?;

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
