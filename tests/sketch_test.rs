#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
use common::test_utils::headless_gpu;
#[cfg(feature = "integration-tests")]
use scene_fade::{
    camera::CameraResources,
    compositor::Compositor,
    config::TargetResize,
    data_structures::texture::Texture,
    gui::Settings,
    scene::{SceneBank, default_scenes},
    sketch::{resize_scene_targets, sync_progress},
    transition::Transition,
};

#[test]
#[cfg(feature = "integration-tests")]
fn uniform_follows_the_slider_every_tick() {
    let gpu = headless_gpu();
    let mut compositor = Compositor::new(&gpu.device, Texture::TARGET_FORMAT);
    let mut transition = Transition::new(3).unwrap();

    for value in [0.25, 0.25, 0.8, 0.0] {
        let settings = Settings { progress: value };
        sync_progress(&settings, &mut transition, &mut compositor, &gpu.queue);
        assert_eq!(transition.progress(), value);
        assert_eq!(compositor.uniform().progress, value);
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn fixed_targets_ignore_resizes() {
    let gpu = headless_gpu();
    let camera = CameraResources::new(&gpu.device, 64, 48);
    let (mut bank, _) = SceneBank::new(
        &gpu.device,
        &gpu.queue,
        &camera.bind_group_layout,
        default_scenes(),
        [64, 48],
    );

    assert!(!resize_scene_targets(TargetResize::Fixed, &mut bank, &gpu.device, [32, 16]));
    assert!(bank.entries().iter().all(|e| e.target.size() == [64, 48]));

    assert!(resize_scene_targets(TargetResize::Follow, &mut bank, &gpu.device, [32, 16]));
    assert!(bank.entries().iter().all(|e| e.target.size() == [32, 16]));
}
