use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    // Rerun when an image or a shader changes.
    println!("cargo:rerun-if-changed=assets");
    println!("cargo:rerun-if-changed=src/pipelines");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets_src = manifest_dir.join("assets");
    if !assets_src.exists() {
        println!("cargo:warning=no assets/ directory, scenes will render with blank textures");
        return Ok(());
    }

    // Native builds read the images from the bundled copy next to the build output.
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    copy_items(&[&assets_src], &out_dir, &copy_options)?;
    println!(
        "cargo:rustc-env=SCENE_FADE_ASSET_DIR={}",
        out_dir.join("assets").display()
    );

    Ok(())
}
