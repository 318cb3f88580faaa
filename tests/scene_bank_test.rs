#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
use common::test_utils::{Gpu, assert_pixel_near, headless_gpu, read_texture, solid_image};
#[cfg(feature = "integration-tests")]
use scene_fade::{
    camera::CameraResources,
    scene::{AssetKind, AssetSlot, INSTANCES_PER_SCENE, SceneBank, default_scenes},
};

#[cfg(feature = "integration-tests")]
fn bank(gpu: &Gpu, camera: &CameraResources, size: [u32; 2]) -> SceneBank {
    let (bank, requests) = SceneBank::new(
        &gpu.device,
        &gpu.queue,
        &camera.bind_group_layout,
        default_scenes(),
        size,
    );
    assert_eq!(requests.len(), 6);
    bank
}

#[cfg(feature = "integration-tests")]
fn render(gpu: &Gpu, bank: &SceneBank, camera: &CameraResources, index: usize) -> image::RgbaImage {
    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Scene Encoder"),
        });
    bank.render_entry(index, &mut encoder, &camera.bind_group);
    gpu.queue.submit(std::iter::once(encoder.finish()));
    read_texture(gpu, &bank.get(index).unwrap().target.color.texture)
}

#[test]
#[cfg(feature = "integration-tests")]
fn every_scene_is_built_at_the_viewport_size() {
    let gpu = headless_gpu();
    let camera = CameraResources::new(&gpu.device, 64, 48);
    let bank = bank(&gpu, &camera, [64, 48]);

    assert_eq!(bank.len(), 3);
    for entry in bank.entries() {
        assert_eq!(entry.placements.len(), INSTANCES_PER_SCENE);
        assert_eq!(entry.target.size(), [64, 48]);
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn resize_rebuilds_every_target() {
    let gpu = headless_gpu();
    let camera = CameraResources::new(&gpu.device, 64, 48);
    let mut bank = bank(&gpu, &camera, [64, 48]);

    bank.resize_targets(&gpu.device, [32, 16]);
    for entry in bank.entries() {
        assert_eq!(entry.target.size(), [32, 16]);
        assert_eq!(entry.target.depth.size(), [32, 16]);
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn placeholders_render_in_the_clear_colour() {
    let gpu = headless_gpu();
    let camera = CameraResources::new(&gpu.device, 64, 48);
    let bank = bank(&gpu, &camera, [64, 48]);

    let entry = bank.get(1).unwrap();
    assert_eq!(entry.background().size(), [1, 1]);
    assert_eq!(entry.matcap().size(), [1, 1]);

    let image = render(&gpu, &bank, &camera, 1);
    for pixel in image.pixels() {
        assert_pixel_near(pixel, [0xEE, 0xEE, 0xEE, 0xFF], 1);
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn loaded_background_replaces_the_placeholder() {
    let gpu = headless_gpu();
    let camera = CameraResources::new(&gpu.device, 64, 48);
    let mut bank = bank(&gpu, &camera, [64, 48]);

    let slot = AssetSlot {
        scene: 0,
        kind: AssetKind::Background,
    };
    assert!(bank.apply_asset(&gpu.device, &gpu.queue, slot, &solid_image([255, 0, 0, 255])));
    assert_eq!(bank.get(0).unwrap().background().size(), [4, 4]);

    // The boxes stay well inside the frame, the corners show the background.
    let image = render(&gpu, &bank, &camera, 0);
    assert_pixel_near(image.get_pixel(0, 0), [255, 0, 0, 255], 1);
    assert_pixel_near(image.get_pixel(63, 47), [255, 0, 0, 255], 1);

    // Other scenes keep their placeholder.
    let image = render(&gpu, &bank, &camera, 2);
    assert_pixel_near(image.get_pixel(0, 0), [0xEE, 0xEE, 0xEE, 0xFF], 1);
}

#[test]
#[cfg(feature = "integration-tests")]
fn asset_for_an_unknown_scene_is_ignored() {
    let gpu = headless_gpu();
    let camera = CameraResources::new(&gpu.device, 64, 48);
    let mut bank = bank(&gpu, &camera, [64, 48]);

    let slot = AssetSlot {
        scene: 7,
        kind: AssetKind::Matcap,
    };
    assert!(!bank.apply_asset(&gpu.device, &gpu.queue, slot, &solid_image([0, 255, 0, 255])));
    assert_eq!(bank.len(), 3);
    assert!(!bank.is_empty());
}

#[test]
#[cfg(feature = "integration-tests")]
fn image_beyond_the_texture_limit_keeps_the_placeholder() {
    let gpu = headless_gpu();
    let camera = CameraResources::new(&gpu.device, 64, 48);
    let mut bank = bank(&gpu, &camera, [64, 48]);

    let max_side = gpu.device.limits().max_texture_dimension_2d;
    let wide = image::DynamicImage::ImageRgba8(image::RgbaImage::new(max_side + 1, 1));
    let slot = AssetSlot {
        scene: 0,
        kind: AssetKind::Background,
    };
    assert!(!bank.apply_asset(&gpu.device, &gpu.queue, slot, &wide));
    assert_eq!(bank.get(0).unwrap().background().size(), [1, 1]);

    let image = render(&gpu, &bank, &camera, 0);
    assert_pixel_near(image.get_pixel(0, 0), [0xEE, 0xEE, 0xEE, 0xFF], 1);
}
