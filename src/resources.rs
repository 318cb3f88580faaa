//! Loading images from the asset directory.
//!
//! Natively the files come from the directory `build.rs` bundles next to the build output
//! (or `./assets` when the crate was built without one). On the web they are fetched from
//! `<origin>/assets/`.

use anyhow::Context as _;

use crate::scene::{AssetRequest, AssetSlot};

#[cfg(not(target_arch = "wasm32"))]
pub fn asset_dir() -> std::path::PathBuf {
    match option_env!("SCENE_FADE_ASSET_DIR") {
        Some(dir) => std::path::PathBuf::from(dir),
        None => std::path::Path::new("./").join("assets"),
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no browser window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("cannot read the page origin: {:?}", e))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = asset_dir().join(file_name);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("cannot read {}", path.display()))?
    };

    Ok(data)
}

pub async fn load_image(file_name: &str) -> anyhow::Result<image::DynamicImage> {
    let data = load_binary(file_name).await?;
    image::load_from_memory(&data).with_context(|| format!("cannot decode {}", file_name))
}

/// Loads one requested image. The slot travels along so the result can be matched up.
pub async fn load_asset(
    request: AssetRequest,
) -> (AssetSlot, anyhow::Result<image::DynamicImage>) {
    let image = load_image(&request.path).await;
    (request.slot, image)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::scene::{AssetKind, default_scenes};

    #[test]
    fn bundled_images_decode() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        for scene in default_scenes() {
            for path in [&scene.background, &scene.matcap] {
                let image = runtime.block_on(load_image(path)).unwrap();
                assert!(image.width() > 0 && image.height() > 0);
            }
        }
    }

    #[test]
    fn missing_image_is_an_error_not_a_panic() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let request = AssetRequest {
            slot: AssetSlot {
                scene: 0,
                kind: AssetKind::Matcap,
            },
            path: "does-not-exist.png".to_string(),
        };
        let (slot, image) = runtime.block_on(load_asset(request));
        assert_eq!(slot.kind, AssetKind::Matcap);
        let message = format!("{:#}", image.unwrap_err());
        assert!(message.contains("does-not-exist.png"));
    }
}
