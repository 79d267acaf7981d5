//! Glowing text-trail rendering.

use glam::Vec3;
use sheen_text::{TextRasterizer, TextStyle, TextTextureCache};

/// Glow intensity as a function of elapsed seconds.
///
/// This is the exact curve the effect applies to the text color each frame:
/// a sinusoidal pulse between 0.4 and 1.0 centered on 0.7.
pub fn glow_intensity(t: f32) -> f32 {
    0.7 + 0.3 * (2.0 * t).sin()
}

/// Per-frame shader uniforms for the text trail.
///
/// Matches the `Uniforms` struct in `shaders/text_trail.wgsl`: a vec3 color
/// with the glow scalar packed into its padding slot.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct TextTrailUniforms {
    pub color: [f32; 3],
    pub glow: f32,
}

/// Pulsing GPU-shaded text label.
///
/// The coverage texture is generated once from the configured [`TextStyle`]
/// and regenerated only when [`TextTrailRenderer::set_style`] observes a
/// changed style. All GPU resources are owned here and released on drop.
pub struct TextTrailRenderer {
    render_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    // Kept alive while the bind group references its view.
    _text_texture: wgpu::Texture,
    cache: TextTextureCache,
    color: Vec3,
}

impl TextTrailRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        rasterizer: &mut TextRasterizer,
        style: TextStyle,
    ) -> Self {
        let mut cache = TextTextureCache::new();
        cache.needs_update(&style);

        let color = Vec3::from_array(style.color());
        let text_texture = upload_text_texture(device, queue, rasterizer, &style);
        let text_view = text_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Text Trail Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Text Trail Uniform Buffer"),
            size: std::mem::size_of::<TextTrailUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Text Trail Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/text_trail.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Text Trail Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = create_bind_group(
            device,
            &bind_group_layout,
            &uniform_buffer,
            &text_view,
            &sampler,
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Text Trail Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Text Trail Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        log::info!("✓ Text trail renderer initialized (\"{}\")", style.text);

        Self {
            render_pipeline,
            uniform_buffer,
            bind_group_layout,
            bind_group,
            sampler,
            _text_texture: text_texture,
            cache,
            color,
        }
    }

    /// Apply a new style. The coverage texture is regenerated if and only
    /// if the style differs from the current one; returns whether it was.
    pub fn set_style(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rasterizer: &mut TextRasterizer,
        style: TextStyle,
    ) -> bool {
        if !self.cache.needs_update(&style) {
            return false;
        }

        log::debug!("regenerating text texture (\"{}\")", style.text);

        self.color = Vec3::from_array(style.color());
        let text_texture = upload_text_texture(device, queue, rasterizer, &style);
        let text_view = text_texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.bind_group = create_bind_group(
            device,
            &self.bind_group_layout,
            &self.uniform_buffer,
            &text_view,
            &self.sampler,
        );
        // The previous texture drops here, releasing its GPU memory.
        self._text_texture = text_texture;

        true
    }

    /// Draw one frame into `view`, loading whatever is already there.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        elapsed: f32,
    ) {
        let uniforms = TextTrailUniforms {
            color: self.color.to_array(),
            glow: glow_intensity(elapsed),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Text Trail Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Text Trail Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..6, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

fn upload_text_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    rasterizer: &mut TextRasterizer,
    style: &TextStyle,
) -> wgpu::Texture {
    let bitmap = rasterizer.rasterize(style);

    let texture_size = wgpu::Extent3d {
        width: bitmap.size[0],
        height: bitmap.size[1],
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Text Coverage Texture"),
        size: texture_size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::R8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        texture.as_image_copy(),
        &bitmap.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(bitmap.size[0]),
            rows_per_image: Some(bitmap.size[1]),
        },
        texture_size,
    );

    texture
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform_buffer: &wgpu::Buffer,
    text_view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Text Trail Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(text_view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_4, PI};

    #[test]
    fn glow_at_sampled_times() {
        assert!((glow_intensity(0.0) - 0.7).abs() < 1e-6);
        assert!((glow_intensity(FRAC_PI_4) - 1.0).abs() < 1e-6);
        assert!((glow_intensity(3.0 * FRAC_PI_4) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn glow_is_periodic_in_pi() {
        for i in 0..8 {
            let t = i as f32 * 0.37;
            assert!((glow_intensity(t) - glow_intensity(t + PI)).abs() < 1e-4);
        }
    }

    #[test]
    fn glow_stays_within_its_band() {
        for i in 0..1000 {
            let g = glow_intensity(i as f32 * 0.01);
            assert!((0.4 - 1e-6..=1.0 + 1e-6).contains(&g));
        }
    }

    #[test]
    fn uniform_record_matches_wgsl_layout() {
        // vec3<f32> color with the glow scalar in the padding slot.
        assert_eq!(std::mem::size_of::<TextTrailUniforms>(), 16);
        assert_eq!(std::mem::offset_of!(TextTrailUniforms, glow), 12);
    }
}
