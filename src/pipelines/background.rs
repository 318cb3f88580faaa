use crate::{
    data_structures::texture::Texture,
    pipelines::basic::{depth_state, mk_render_pipeline},
};

/// Full-target background pass. Draws three vertices generated in the shader, so no
/// vertex buffer is bound.
pub fn mk_background_pipeline(
    device: &wgpu::Device,
    texture_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Background Pipeline Layout"),
        bind_group_layouts: &[texture_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Background Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("background.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        "Background Pipeline",
        &layout,
        Texture::TARGET_FORMAT,
        Some(depth_state(false, wgpu::CompareFunction::Always)),
        None,
        &[],
        shader,
    )
}
