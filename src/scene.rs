//! Scene bank: the fixed list of box-cloud scenes and their offscreen targets.
//!
//! Every [`SceneDescriptor`] is built once into a [`SceneEntry`] holding 300 instances of
//! one box mesh with a matcap material. The boxes sit on the unit sphere in front of a
//! background image. Each entry owns a color and depth target. The render loop draws
//! entries into their targets and the compositor then samples those targets.
//!
//! Images are requested when an entry is built but arrive later. Until then the entry
//! renders with blank 1x1 placeholders, see [`SceneBank::apply_asset`].

use cgmath::{Rad, Vector3};
use image::GenericImageView;
use rand::Rng;
use wgpu::util::DeviceExt;

use crate::data_structures::{
    instance::Instance,
    model::{DrawMesh, Geometry, Mesh},
    texture::{self, Texture},
};
use crate::pipelines::{background::mk_background_pipeline, matcap::mk_matcap_pipeline};

/// Number of boxes per scene.
pub const INSTANCES_PER_SCENE: usize = 300;
/// Edge length of the box geometry shared by the built-in scenes.
pub const BOX_SIZE: f32 = 0.1;
/// Clear colour of every scene target, as an sRGB hex triplet.
pub const CLEAR_COLOUR_HEX: u32 = 0xEEEEEE;

const PLACEHOLDER_RGBA: [u8; 4] = [0xEE, 0xEE, 0xEE, 0xFF];

/// Static description of a scene: background image, matcap image and the mesh every box uses.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneDescriptor {
    pub background: String,
    pub matcap: String,
    pub geometry: Geometry,
}

impl SceneDescriptor {
    pub fn new(background: &str, matcap: &str, geometry: Geometry) -> Self {
        Self {
            background: background.to_string(),
            matcap: matcap.to_string(),
            geometry,
        }
    }

    fn asset_requests(&self, scene: usize) -> [AssetRequest; 2] {
        [
            AssetRequest {
                slot: AssetSlot {
                    scene,
                    kind: AssetKind::Background,
                },
                path: self.background.clone(),
            },
            AssetRequest {
                slot: AssetSlot {
                    scene,
                    kind: AssetKind::Matcap,
                },
                path: self.matcap.clone(),
            },
        ]
    }
}

/// The red, green and gray scenes.
pub fn default_scenes() -> Vec<SceneDescriptor> {
    [
        ("red-bg.png", "red.png"),
        ("green-bg.png", "green.png"),
        ("gray-bg.png", "gray.png"),
    ]
    .into_iter()
    .map(|(background, matcap)| {
        SceneDescriptor::new(
            background,
            matcap,
            Geometry::cuboid(BOX_SIZE, BOX_SIZE, BOX_SIZE),
        )
    })
    .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Background,
    Matcap,
}

/// Which texture of which scene an image belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AssetSlot {
    pub scene: usize,
    pub kind: AssetKind,
}

/// An image an entry is waiting for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRequest {
    pub slot: AssetSlot,
    pub path: String,
}

/// Where one box sits and how it is turned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub position: Vector3<f32>,
    pub rotation_x: Rad<f32>,
    pub rotation_y: Rad<f32>,
}

impl Placement {
    pub fn to_instance(&self) -> Instance {
        Instance {
            position: self.position,
            rotation: Instance::euler_xyz(self.rotation_x, self.rotation_y, Rad(0.0)),
            ..Default::default()
        }
    }
}

/// A uniformly distributed point on the unit sphere.
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vector3<f32> {
    let u = (rng.r#gen::<f32>() - 0.5) * 2.0;
    let theta = rng.r#gen::<f32>() * std::f32::consts::TAU;
    let f = (1.0 - u * u).max(0.0).sqrt();
    Vector3::new(f * theta.cos(), f * theta.sin(), u)
}

/// `count` placements on the unit sphere.
///
/// Rotations about X and Y are drawn from `[0, 1)` radians, so the boxes are only
/// slightly tilted.
pub fn scatter<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Placement> {
    (0..count)
        .map(|_| {
            let position = random_direction(rng);
            let rotation_x = Rad(rng.r#gen::<f32>());
            let rotation_y = Rad(rng.r#gen::<f32>());
            Placement {
                position,
                rotation_x,
                rotation_y,
            }
        })
        .collect()
}

/// Converts an sRGB hex triplet into the linear clear colour wgpu expects for sRGB targets.
pub fn hex_colour(hex: u32) -> wgpu::Color {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xFF) as f64 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    wgpu::Color {
        r: channel(16),
        g: channel(8),
        b: channel(0),
        a: 1.0,
    }
}

/// Color and depth buffer a scene is drawn into.
#[derive(Debug)]
pub struct OffscreenTarget {
    pub color: Texture,
    pub depth: Texture,
}

impl OffscreenTarget {
    pub fn new(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        Self {
            color: Texture::create_color_target(device, size, label),
            depth: Texture::create_depth_texture(device, size, label),
        }
    }

    pub fn size(&self) -> [u32; 2] {
        self.color.size()
    }
}

/// A built scene: placements, GPU mesh and instances, its two textures and its target.
#[derive(Debug)]
pub struct SceneEntry {
    pub descriptor: SceneDescriptor,
    pub placements: Vec<Placement>,
    pub target: OffscreenTarget,
    mesh: Mesh,
    instance_buffer: wgpu::Buffer,
    background: Texture,
    matcap: Texture,
    background_bind_group: wgpu::BindGroup,
    matcap_bind_group: wgpu::BindGroup,
}

impl SceneEntry {
    pub fn background(&self) -> &Texture {
        &self.background
    }

    pub fn matcap(&self) -> &Texture {
        &self.matcap
    }
}

/// Owns every scene entry plus the two pipelines that draw them.
#[derive(Debug)]
pub struct SceneBank {
    entries: Vec<SceneEntry>,
    texture_layout: wgpu::BindGroupLayout,
    fallback_sampler: wgpu::Sampler,
    background_pipeline: wgpu::RenderPipeline,
    matcap_pipeline: wgpu::RenderPipeline,
    clear_colour: wgpu::Color,
}

impl SceneBank {
    /// Builds one entry per descriptor with targets of `size`.
    ///
    /// Returns the bank together with the images its entries are waiting for. The bank
    /// renders right away; hand each decoded image to [`apply_asset`](Self::apply_asset).
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        descriptors: Vec<SceneDescriptor>,
        size: [u32; 2],
    ) -> (Self, Vec<AssetRequest>) {
        let texture_layout = texture::texture_sampler_layout(device);
        let fallback_sampler = texture::create_clamped_sampler(device);
        let background_pipeline = mk_background_pipeline(device, &texture_layout);
        let matcap_pipeline =
            mk_matcap_pipeline(device, &texture_layout, camera_bind_group_layout);

        let mut bank = Self {
            entries: Vec::with_capacity(descriptors.len()),
            texture_layout,
            fallback_sampler,
            background_pipeline,
            matcap_pipeline,
            clear_colour: hex_colour(CLEAR_COLOUR_HEX),
        };

        let mut rng = rand::thread_rng();
        let mut requests = Vec::with_capacity(descriptors.len() * 2);
        for (index, descriptor) in descriptors.into_iter().enumerate() {
            requests.extend(descriptor.asset_requests(index));
            let entry = bank.build(device, queue, index, descriptor, size, &mut rng);
            bank.entries.push(entry);
        }
        log::info!("built {} scenes at {}x{}", bank.entries.len(), size[0], size[1]);

        (bank, requests)
    }

    /// Builds a renderable entry from `descriptor`.
    ///
    /// Both textures start out as placeholders; the entry is immediately drawable.
    pub fn build<R: Rng + ?Sized>(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        index: usize,
        descriptor: SceneDescriptor,
        size: [u32; 2],
        rng: &mut R,
    ) -> SceneEntry {
        let label = format!("scene {}", index);
        let placements = scatter(INSTANCES_PER_SCENE, rng);
        let instance_data = placements
            .iter()
            .map(|placement| placement.to_instance().to_raw())
            .collect::<Vec<_>>();
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Instance Buffer", label)),
            contents: bytemuck::cast_slice(&instance_data),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let mesh = Mesh::new(device, &label, &descriptor.geometry);

        let background = Texture::blank(device, queue, PLACEHOLDER_RGBA, &descriptor.background);
        let matcap = Texture::blank(device, queue, PLACEHOLDER_RGBA, &descriptor.matcap);
        let background_bind_group = self.bind(device, &background, "background_bind_group");
        let matcap_bind_group = self.bind(device, &matcap, "matcap_bind_group");

        SceneEntry {
            descriptor,
            placements,
            target: OffscreenTarget::new(device, size, &label),
            mesh,
            instance_buffer,
            background,
            matcap,
            background_bind_group,
            matcap_bind_group,
        }
    }

    fn bind(&self, device: &wgpu::Device, texture: &Texture, label: &str) -> wgpu::BindGroup {
        texture::texture_sampler_bind_group(
            device,
            &self.texture_layout,
            texture,
            &self.fallback_sampler,
            label,
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SceneEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[SceneEntry] {
        &self.entries
    }

    /// Replaces a placeholder with the decoded image.
    ///
    /// Returns `false` and keeps the placeholder for an unknown scene or an image the
    /// device cannot hold as one texture.
    pub fn apply_asset(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        slot: AssetSlot,
        image: &image::DynamicImage,
    ) -> bool {
        let Some(entry) = self.entries.get(slot.scene) else {
            log::warn!("image for unknown scene {}", slot.scene);
            return false;
        };
        let label = match slot.kind {
            AssetKind::Background => &entry.descriptor.background,
            AssetKind::Matcap => &entry.descriptor.matcap,
        };
        let max_side = device.limits().max_texture_dimension_2d;
        if !texture::fits_texture_limit(image.dimensions(), max_side) {
            log::warn!(
                "{} is {}x{}, the device allows at most {}x{}; keeping the placeholder",
                label,
                image.width(),
                image.height(),
                max_side,
                max_side
            );
            return false;
        }
        let texture = Texture::from_image(device, queue, image, Some(label));
        let bind_group = self.bind(device, &texture, label);
        log::debug!("scene {} {:?} ready: {}", slot.scene, slot.kind, label);

        let entry = &mut self.entries[slot.scene];
        match slot.kind {
            AssetKind::Background => {
                entry.background = texture;
                entry.background_bind_group = bind_group;
            }
            AssetKind::Matcap => {
                entry.matcap = texture;
                entry.matcap_bind_group = bind_group;
            }
        }
        true
    }

    /// Reallocates every target at `size`. The old contents are dropped.
    pub fn resize_targets(&mut self, device: &wgpu::Device, size: [u32; 2]) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.target = OffscreenTarget::new(device, size, &format!("scene {}", index));
        }
    }

    /// Clears the target of entry `index`, draws its background and then its boxes.
    pub fn render_entry(
        &self,
        index: usize,
        encoder: &mut wgpu::CommandEncoder,
        camera_bind_group: &wgpu::BindGroup,
    ) {
        let Some(entry) = self.entries.get(index) else {
            log::error!("no scene at index {}", index);
            return;
        };
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &entry.target.color.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &entry.target.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_pipeline(&self.background_pipeline);
        render_pass.set_bind_group(0, &entry.background_bind_group, &[]);
        render_pass.draw(0..3, 0..1);

        render_pass.set_pipeline(&self.matcap_pipeline);
        render_pass.set_vertex_buffer(1, entry.instance_buffer.slice(..));
        render_pass.draw_mesh_instanced(
            &entry.mesh,
            0..entry.placements.len() as u32,
            &entry.matcap_bind_group,
            camera_bind_group,
        );
    }
}
