use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::{depth_state, mk_render_pipeline},
};

/// Opaque, depth-tested pipeline for instanced matcap meshes.
///
/// Group 0 holds the matcap texture and sampler, group 1 the scene camera.
pub fn mk_matcap_pipeline(
    device: &wgpu::Device,
    material_layout: &wgpu::BindGroupLayout,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Matcap Pipeline Layout"),
        bind_group_layouts: &[material_layout, camera_bind_group_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Matcap Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("matcap.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        "Matcap Pipeline",
        &layout,
        Texture::TARGET_FORMAT,
        Some(depth_state(true, wgpu::CompareFunction::Less)),
        Some(wgpu::Face::Back),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}
