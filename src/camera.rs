//! Cameras and the uniforms they feed.
//!
//! - [`PerspectiveCamera`] looks at every scene. Its settings are fixed and only the
//!   aspect ratio follows the viewport.
//! - [`OrthographicCamera`] frames the compositor's unit quad. Its 1x1 frustum does not
//!   depend on the window shape, so the quad always covers the whole output.

use cgmath::{Deg, Matrix4, Point3, Vector3};
use wgpu::util::DeviceExt;

/// Vertical field of view of the scene camera.
pub const FOV_Y: Deg<f32> = Deg(70.0);
pub const Z_NEAR: f32 = 0.01;
pub const Z_FAR: f32 = 1000.0;
pub const CAMERA_POSITION: [f32; 3] = [0.0, 0.0, 2.0];

/// Maps OpenGL clip space (z in [-1, 1]) to wgpu clip space (z in [0, 1]).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Point3<f32>,
    pub aspect: f32,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl PerspectiveCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: CAMERA_POSITION.into(),
            aspect: aspect(width, height),
            fovy: FOV_Y,
            znear: Z_NEAR,
            zfar: Z_FAR,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect(width, height);
    }

    /// Looks down -Z with +Y up.
    pub fn view(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, -Vector3::unit_z(), Vector3::unit_y())
    }

    pub fn projection(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

fn aspect(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// Orthographic camera fixed to a `frustum_size` square.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthographicCamera {
    pub frustum_size: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrthographicCamera {
    fn default() -> Self {
        Self {
            frustum_size: 1.0,
            near: -1000.0,
            far: 1000.0,
        }
    }
}

impl OrthographicCamera {
    pub fn view_proj(&self) -> Matrix4<f32> {
        let half = self.frustum_size / 2.0;
        OPENGL_TO_WGPU_MATRIX * cgmath::ortho(-half, half, -half, half, self.near, self.far)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view: [[f32; 4]; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view: Matrix4::identity().into(),
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &PerspectiveCamera) {
        let view = camera.view();
        self.view = view.into();
        self.view_proj = (camera.projection() * view).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// The scene camera together with its GPU buffer and bind group.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: PerspectiveCamera,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let camera = PerspectiveCamera::new(width, height);
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            camera,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Recomputes the aspect ratio and uploads the new matrices.
    pub fn resize(&mut self, queue: &wgpu::Queue, width: u32, height: u32) {
        self.camera.resize(width, height);
        self.uniform.update_view_proj(&self.camera);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Vector4, Transform};

    use super::*;

    #[test]
    fn resize_sets_exact_aspect() {
        let mut camera = PerspectiveCamera::new(800, 600);
        camera.resize(1920, 1080);
        assert_eq!(camera.aspect, 1920.0 / 1080.0);
        assert_eq!(camera.fovy, Deg(70.0));
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn zero_sized_window_does_not_divide_by_zero() {
        let camera = PerspectiveCamera::new(0, 0);
        assert_eq!(camera.aspect, 1.0);
    }

    #[test]
    fn orthographic_frustum_maps_unit_quad_to_clip_corners() {
        let m = OrthographicCamera::default().view_proj();
        let corner = m * Vector4::new(0.5, 0.5, 0.0, 1.0);
        assert!((corner.x - 1.0).abs() < 1e-6);
        assert!((corner.y - 1.0).abs() < 1e-6);
        let corner = m.transform_point(Point3::new(-0.5, -0.5, 0.0));
        assert!((corner.x + 1.0).abs() < 1e-6);
        assert!((corner.y + 1.0).abs() < 1e-6);
        assert!((0.0..=1.0).contains(&corner.z));
    }

    #[test]
    fn scene_origin_is_in_front_of_the_camera() {
        let camera = PerspectiveCamera::new(100, 100);
        let clip = camera.projection() * camera.view() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc_z = clip.z / clip.w;
        assert!(clip.w > 0.0);
        assert!((0.0..=1.0).contains(&ndc_z));
    }
}
