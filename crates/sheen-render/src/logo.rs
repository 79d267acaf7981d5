//! Liquid-metal logo rendering.

use crate::params::LiquidParams;
use sheen_field::ImageField;

/// Per-frame shader uniforms for the liquid-logo effect.
///
/// Field order matches the `Uniforms` struct in `shaders/liquid_logo.wgsl`.
/// Only `time` varies after configuration.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct LiquidUniforms {
    pub time: f32,
    pub ratio: f32,
    pub img_ratio: f32,
    pub edge: f32,
    pub pattern_blur: f32,
    pub pattern_scale: f32,
    pub refraction: f32,
    pub liquid: f32,
}

impl LiquidUniforms {
    /// Build the frame's uniform record. Animation speed is folded into the
    /// time value here so the shader sees a single pre-scaled clock.
    pub fn new(params: &LiquidParams, ratio: f32, img_ratio: f32, elapsed: f32) -> Self {
        Self {
            time: elapsed * params.speed,
            ratio,
            img_ratio,
            edge: params.edge,
            pattern_blur: params.pattern_blur,
            pattern_scale: params.pattern_scale,
            refraction: params.refraction,
            liquid: params.liquid,
        }
    }
}

/// Continuously animated liquid-metal rendering of a silhouette field.
///
/// Owns every GPU resource it allocates; dropping the renderer releases the
/// pipeline, texture, sampler and uniform buffer in one place.
pub struct LiquidLogoRenderer {
    render_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    // Kept alive for the lifetime of the bind group that references it.
    _field_texture: wgpu::Texture,
    params: LiquidParams,
    img_ratio: f32,
}

impl LiquidLogoRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        field: &ImageField,
        params: LiquidParams,
    ) -> Self {
        let params = params.clamped();

        // Upload the silhouette as a single-channel texture.
        let texture_size = wgpu::Extent3d {
            width: field.width(),
            height: field.height(),
            depth_or_array_layers: 1,
        };
        let field_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Silhouette Field Texture"),
            size: texture_size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            field_texture.as_image_copy(),
            &field.to_r8(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(field.width()),
                rows_per_image: Some(field.height()),
            },
            texture_size,
        );

        let field_view = field_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Silhouette Field Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Liquid Logo Uniform Buffer"),
            size: std::mem::size_of::<LiquidUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Liquid Logo Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/liquid_logo.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Liquid Logo Bind Group Layout"),
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

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Liquid Logo Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&field_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Liquid Logo Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Liquid Logo Render Pipeline"),
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

        log::info!(
            "✓ Liquid logo renderer initialized ({}x{} field)",
            field.width(),
            field.height()
        );

        Self {
            render_pipeline,
            uniform_buffer,
            bind_group,
            _field_texture: field_texture,
            params,
            img_ratio: field.width() as f32 / field.height() as f32,
        }
    }

    /// Draw one frame into `view`. The pass clears the target; this
    /// renderer is the bottom layer of the frame.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        viewport: [u32; 2],
        elapsed: f32,
    ) {
        let ratio = viewport[0].max(1) as f32 / viewport[1].max(1) as f32;
        let uniforms = LiquidUniforms::new(&self.params, ratio, self.img_ratio, elapsed);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Liquid Logo Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Liquid Logo Render Pass"),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_record_matches_wgsl_layout() {
        // Eight packed f32 fields, no implicit padding.
        assert_eq!(std::mem::size_of::<LiquidUniforms>(), 32);
        assert_eq!(std::mem::offset_of!(LiquidUniforms, time), 0);
        assert_eq!(std::mem::offset_of!(LiquidUniforms, liquid), 28);
    }

    #[test]
    fn speed_is_folded_into_the_time_uniform() {
        let params = LiquidParams {
            speed: 0.5,
            ..LiquidParams::default()
        };
        let uniforms = LiquidUniforms::new(&params, 1.5, 1.0, 2.0);

        assert_eq!(uniforms.time, 1.0);
        assert_eq!(uniforms.ratio, 1.5);
        assert_eq!(uniforms.img_ratio, 1.0);
    }

    #[test]
    fn configuration_fields_pass_through() {
        let params = LiquidParams::default();
        let uniforms = LiquidUniforms::new(&params, 1.0, 1.0, 0.0);

        assert_eq!(uniforms.edge, params.edge);
        assert_eq!(uniforms.pattern_blur, params.pattern_blur);
        assert_eq!(uniforms.pattern_scale, params.pattern_scale);
        assert_eq!(uniforms.refraction, params.refraction);
        assert_eq!(uniforms.liquid, params.liquid);
        assert_eq!(uniforms.time, 0.0);
    }
}
