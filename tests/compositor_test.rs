#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
use common::test_utils::{Gpu, assert_pixel_near, headless_gpu, read_texture};
#[cfg(feature = "integration-tests")]
use scene_fade::{compositor::Compositor, data_structures::texture::Texture};

#[cfg(feature = "integration-tests")]
const RED: [u8; 4] = [255, 0, 0, 255];
#[cfg(feature = "integration-tests")]
const BLUE: [u8; 4] = [0, 0, 255, 255];

/// Composites a red source into a blue one at `progress` and reads the result back.
#[cfg(feature = "integration-tests")]
fn composite_at(gpu: &Gpu, progress: f32) -> image::RgbaImage {
    let first = Texture::blank(&gpu.device, &gpu.queue, RED, "first");
    let second = Texture::blank(&gpu.device, &gpu.queue, BLUE, "second");
    let output = Texture::create_color_target(&gpu.device, [64, 48], "output");

    let mut compositor = Compositor::new(&gpu.device, Texture::TARGET_FORMAT);
    compositor.set_progress(&gpu.queue, progress);

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Composite Encoder"),
        });
    compositor.composite(&gpu.device, &mut encoder, &output.view, &first, &second);
    gpu.queue.submit(std::iter::once(encoder.finish()));

    read_texture(gpu, &output.texture)
}

#[test]
#[cfg(feature = "integration-tests")]
fn progress_zero_shows_the_first_scene() {
    let gpu = headless_gpu();
    let image = composite_at(&gpu, 0.0);
    for pixel in image.pixels() {
        assert_pixel_near(pixel, RED, 1);
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn progress_one_shows_the_second_scene() {
    let gpu = headless_gpu();
    let image = composite_at(&gpu, 1.0);
    for pixel in image.pixels() {
        assert_pixel_near(pixel, BLUE, 1);
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn progress_beyond_one_is_clamped() {
    let gpu = headless_gpu();
    let image = composite_at(&gpu, 1.7);
    for pixel in image.pixels() {
        assert_pixel_near(pixel, BLUE, 1);
    }
    let image = composite_at(&gpu, -0.4);
    assert_pixel_near(image.get_pixel(32, 24), RED, 1);
}

#[test]
#[cfg(feature = "integration-tests")]
fn halfway_mixes_in_linear_space() {
    let gpu = headless_gpu();
    let image = composite_at(&gpu, 0.5);
    // linear 0.5 encodes to sRGB 188
    assert_pixel_near(image.get_pixel(32, 24), [188, 0, 188, 255], 2);
}

#[test]
#[cfg(feature = "integration-tests")]
fn uniform_holds_the_last_progress() {
    let gpu = headless_gpu();
    let mut compositor = Compositor::new(&gpu.device, Texture::TARGET_FORMAT);
    assert_eq!(compositor.progress(), 0.0);
    compositor.set_progress(&gpu.queue, 0.37);
    assert_eq!(compositor.progress(), 0.37);
    assert_eq!(compositor.uniform().progress, 0.37);
}

#[test]
#[cfg(feature = "integration-tests")]
fn bind_group_is_reused_for_the_same_pair() {
    let gpu = headless_gpu();
    let first = Texture::blank(&gpu.device, &gpu.queue, RED, "first");
    let second = Texture::blank(&gpu.device, &gpu.queue, BLUE, "second");
    let mut compositor = Compositor::new(&gpu.device, Texture::TARGET_FORMAT);

    let a = compositor.bind_group_for(&gpu.device, &first, &second);
    let b = compositor.bind_group_for(&gpu.device, &first, &second);
    assert_eq!(a, b);

    // swapped order and rebuilt targets both bind again
    let swapped = compositor.bind_group_for(&gpu.device, &second, &first);
    assert_ne!(a, swapped);
    let rebuilt = Texture::create_color_target(&gpu.device, [8, 8], "rebuilt");
    let fresh = compositor.bind_group_for(&gpu.device, &rebuilt, &first);
    assert_ne!(swapped, fresh);
}
