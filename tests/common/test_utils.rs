use std::time::Duration;

/// Device and queue without a window.
pub(crate) struct Gpu {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

pub(crate) fn headless_gpu() -> Gpu {
    futures::executor::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .expect("integration tests need a GPU adapter");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("test device"),
                ..Default::default()
            })
            .await
            .expect("Failed to open the test device");
        Gpu { device, queue }
    })
}

/// Copies an `Rgba8` texture back to the CPU.
pub(crate) fn read_texture(gpu: &Gpu, texture: &wgpu::Texture) -> image::RgbaImage {
    let size = texture.size();
    let (width, height) = (size.width, size.height);
    // Rows of a texture copy must be 256 byte aligned
    let unpadded = 4 * width;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded = unpadded.div_ceil(align) * align;

    let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Buffer"),
        size: (padded * height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(height),
            },
        },
        size,
    );
    gpu.queue.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).unwrap();
    });
    gpu.device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })
        .expect("Readback timed out");
    futures::executor::block_on(rx.receive())
        .expect("map callback dropped")
        .expect("Failed to map the readback buffer");

    let data = slice.get_mapped_range();
    let mut pixels = Vec::with_capacity((unpadded * height) as usize);
    for row in data.chunks(padded as usize) {
        pixels.extend_from_slice(&row[..unpadded as usize]);
    }
    drop(data);
    buffer.unmap();
    image::RgbaImage::from_raw(width, height, pixels).expect("readback has the texture's size")
}

pub(crate) fn assert_pixel_near(actual: &image::Rgba<u8>, expected: [u8; 4], tolerance: u8) {
    for (a, e) in actual.0.iter().zip(expected) {
        assert!(
            a.abs_diff(e) <= tolerance,
            "pixel {:?} is not within {} of {:?}",
            actual.0,
            tolerance,
            expected
        );
    }
}

pub(crate) fn solid_image(rgba: [u8; 4]) -> image::DynamicImage {
    image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(4, 4, image::Rgba(rgba)))
}
