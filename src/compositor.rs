//! Cross-fade compositor.
//!
//! A unit quad framed by a fixed 1x1 orthographic camera covers the whole output. Its
//! shader samples two scene targets and mixes them by the `progress` uniform, so drawing
//! the quad once blends scene A into scene B.

use wgpu::util::DeviceExt;

use crate::{
    camera::OrthographicCamera,
    data_structures::texture::{self, Texture},
    pipelines::crossfade::{
        CrossfadeUniform, QuadVertex, mk_crossfade_bind_group_layout, mk_crossfade_pipeline,
    },
};

const QUAD_VERTICES: &[QuadVertex] = &[
    QuadVertex {
        position: [-0.5, 0.5, 0.0],
        uv: [0.0, 0.0],
    },
    QuadVertex {
        position: [-0.5, -0.5, 0.0],
        uv: [0.0, 1.0],
    },
    QuadVertex {
        position: [0.5, -0.5, 0.0],
        uv: [1.0, 1.0],
    },
    QuadVertex {
        position: [0.5, 0.5, 0.0],
        uv: [1.0, 0.0],
    },
];

const QUAD_INDICES: &[u16] = &[0, 1, 2, 0, 2, 3];

/// Bind group of the last composited pair of targets.
///
/// Views compare by identity, so targets rebuilt by a resize never hit.
#[derive(Debug)]
struct PairBinding {
    first: wgpu::TextureView,
    second: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

#[derive(Debug)]
pub struct Compositor {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    uniform: CrossfadeUniform,
    uniform_buffer: wgpu::Buffer,
    pair: Option<PairBinding>,
}

impl Compositor {
    /// Creates the quad, uniform and pipeline. The pipeline renders in `output_format`.
    pub fn new(device: &wgpu::Device, output_format: wgpu::TextureFormat) -> Self {
        let camera = OrthographicCamera::default();
        let uniform = CrossfadeUniform {
            view_proj: camera.view_proj().into(),
            progress: 0.0,
            _padding: [0.0; 3],
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Crossfade Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Crossfade Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Crossfade Quad Index Buffer"),
            contents: bytemuck::cast_slice(QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let bind_group_layout = mk_crossfade_bind_group_layout(device);
        let pipeline = mk_crossfade_pipeline(device, &bind_group_layout, output_format);

        Self {
            pipeline,
            bind_group_layout,
            sampler: texture::create_clamped_sampler(device),
            vertex_buffer,
            index_buffer,
            uniform,
            uniform_buffer,
            pair: None,
        }
    }

    pub fn progress(&self) -> f32 {
        self.uniform.progress
    }

    pub fn uniform(&self) -> &CrossfadeUniform {
        &self.uniform
    }

    /// Uploads `progress` as is. Values outside `[0, 1]` are clamped by the shader.
    pub fn set_progress(&mut self, queue: &wgpu::Queue, progress: f32) {
        if self.uniform.progress == progress {
            return;
        }
        self.uniform.progress = progress;
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }

    /// Bind group sampling `first` and `second`, reused while the same pair is composited.
    pub fn bind_group_for(
        &mut self,
        device: &wgpu::Device,
        first: &Texture,
        second: &Texture,
    ) -> wgpu::BindGroup {
        let pair = match self.pair.take() {
            Some(pair) if pair.first == first.view && pair.second == second.view => pair,
            _ => PairBinding {
                first: first.view.clone(),
                second: second.view.clone(),
                bind_group: self.create_bind_group(device, first, second),
            },
        };
        self.pair.insert(pair).bind_group.clone()
    }

    fn create_bind_group(
        &self,
        device: &wgpu::Device,
        first: &Texture,
        second: &Texture,
    ) -> wgpu::BindGroup {
        log::debug!("binding a new crossfade pair");
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&first.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&second.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
            label: Some("crossfade_bind_group"),
        })
    }

    /// Draws `mix(first, second, progress)` over all of `view`.
    pub fn composite(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        first: &Texture,
        second: &Texture,
    ) {
        let bind_group = self.bind_group_for(device, first, second);

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Crossfade Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }
}
