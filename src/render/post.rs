use super::helpers::{
    blit, create_uniform_buffer, make_fullscreen_pipeline, sampler_entry, texture_entry,
    uniform_entry,
};
use super::targets::RenderTargets;
use super::{HDR_FORMAT, POST_WGSL};

#[repr(C)]
#[derive(Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct PostUniforms {
    resolution: [f32; 2],
    time: f32,
    bloom_strength: f32,
    blur_dir: [f32; 2],
    threshold: f32,
    _pad: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostParams {
    pub time: f32,
    pub bloom_strength: f32,
    pub threshold: f32,
}

/// One uniform buffer per pass; every pass of a frame sees its own values.
struct PassUniforms {
    bright: wgpu::Buffer,
    blur_h: wgpu::Buffer,
    blur_v: wgpu::Buffer,
    composite: wgpu::Buffer,
}

impl PassUniforms {
    fn destroy(&self) {
        self.bright.destroy();
        self.blur_h.destroy();
        self.blur_v.destroy();
        self.composite.destroy();
    }
}

struct PassBindGroups {
    bright: wgpu::BindGroup,
    blur_h: wgpu::BindGroup,
    blur_v: wgpu::BindGroup,
    composite_src: wgpu::BindGroup,
    composite_bloom: wgpu::BindGroup,
}

/// HDR scene target followed by bright pass, ping-pong blur and composite.
pub struct PostChain {
    bgl0: wgpu::BindGroupLayout, // tex+sampler+uniform
    bgl1: wgpu::BindGroupLayout, // tex+sampler
    sampler: wgpu::Sampler,
    bright_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    targets: RenderTargets,
    uniforms: PassUniforms,
    bind_groups: PassBindGroups,
}

impl PostChain {
    pub fn new(
        device: &wgpu::Device,
        swap_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("post_shader"),
            source: wgpu::ShaderSource::Wgsl(POST_WGSL.into()),
        });
        let bgl0 = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_bgl0"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let bgl1 = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_bgl1"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let pl_single = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl_post_0"),
            bind_group_layouts: &[&bgl0],
            push_constant_ranges: &[],
        });
        let pl_composite = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl_post_comp"),
            bind_group_layouts: &[&bgl0, &bgl1],
            push_constant_ranges: &[],
        });
        let bright_pipeline = make_fullscreen_pipeline(
            device,
            "bright_pipeline",
            &pl_single,
            &shader,
            "fs_bright",
            HDR_FORMAT,
            None,
        );
        let blur_pipeline = make_fullscreen_pipeline(
            device,
            "blur_pipeline",
            &pl_single,
            &shader,
            "fs_blur",
            HDR_FORMAT,
            None,
        );
        let composite_pipeline = make_fullscreen_pipeline(
            device,
            "composite_pipeline",
            &pl_composite,
            &shader,
            "fs_composite",
            swap_format,
            Some(wgpu::BlendState::REPLACE),
        );

        let zero = PostUniforms::default();
        let uniforms = PassUniforms {
            bright: create_uniform_buffer(device, "post_u_bright", &zero),
            blur_h: create_uniform_buffer(device, "post_u_blur_h", &zero),
            blur_v: create_uniform_buffer(device, "post_u_blur_v", &zero),
            composite: create_uniform_buffer(device, "post_u_composite", &zero),
        };
        let targets = RenderTargets::new(device, width, height);
        let bind_groups = build_bind_groups(device, &bgl0, &bgl1, &sampler, &targets, &uniforms);

        Self {
            bgl0,
            bgl1,
            sampler,
            bright_pipeline,
            blur_pipeline,
            composite_pipeline,
            targets,
            uniforms,
            bind_groups,
        }
    }

    /// Recreate the offscreen targets and the bind groups that view them.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width.max(1) == self.targets.width && height.max(1) == self.targets.height {
            return;
        }
        self.targets.destroy();
        self.targets = RenderTargets::new(device, width, height);
        self.bind_groups = build_bind_groups(
            device,
            &self.bgl0,
            &self.bgl1,
            &self.sampler,
            &self.targets,
            &self.uniforms,
        );
    }

    /// Scene passes render into this view.
    pub fn hdr_view(&self) -> &wgpu::TextureView {
        &self.targets.hdr_view
    }

    pub fn size(&self) -> (u32, u32) {
        (self.targets.width, self.targets.height)
    }

    /// Encode the bright, blur and composite passes, writing into `output`.
    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        output: &wgpu::TextureView,
        params: PostParams,
    ) {
        let (bw, bh) = self.targets.bloom_size();
        let base = PostUniforms {
            resolution: [bw as f32, bh as f32],
            time: params.time,
            bloom_strength: params.bloom_strength,
            blur_dir: [0.0, 0.0],
            threshold: params.threshold,
            _pad: 0.0,
        };
        let write = |buf: &wgpu::Buffer, blur_dir: [f32; 2]| {
            queue.write_buffer(buf, 0, bytemuck::bytes_of(&PostUniforms { blur_dir, ..base }));
        };
        write(&self.uniforms.bright, [0.0, 0.0]);
        write(&self.uniforms.blur_h, [1.0, 0.0]);
        write(&self.uniforms.blur_v, [0.0, 1.0]);
        write(&self.uniforms.composite, [0.0, 0.0]);

        let t = &self.targets;
        let bg = &self.bind_groups;
        blit(
            encoder,
            "bright_pass",
            &t.bloom_a_view,
            wgpu::Color::BLACK,
            &self.bright_pipeline,
            &[&bg.bright],
        );
        blit(
            encoder,
            "blur_h",
            &t.bloom_b_view,
            wgpu::Color::BLACK,
            &self.blur_pipeline,
            &[&bg.blur_h],
        );
        blit(
            encoder,
            "blur_v",
            &t.bloom_a_view,
            wgpu::Color::BLACK,
            &self.blur_pipeline,
            &[&bg.blur_v],
        );
        blit(
            encoder,
            "composite",
            output,
            wgpu::Color::BLACK,
            &self.composite_pipeline,
            &[&bg.composite_src, &bg.composite_bloom],
        );
    }

    pub fn destroy(&self) {
        self.targets.destroy();
        self.uniforms.destroy();
    }
}

fn build_bind_groups(
    device: &wgpu::Device,
    bgl0: &wgpu::BindGroupLayout,
    bgl1: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    targets: &RenderTargets,
    uniforms: &PassUniforms,
) -> PassBindGroups {
    let with_uniform = |label: &str, view: &wgpu::TextureView, buf: &wgpu::Buffer| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: bgl0,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buf.as_entire_binding(),
                },
            ],
        })
    };
    PassBindGroups {
        bright: with_uniform("bg_bright", &targets.hdr_view, &uniforms.bright),
        blur_h: with_uniform("bg_blur_h", &targets.bloom_a_view, &uniforms.blur_h),
        blur_v: with_uniform("bg_blur_v", &targets.bloom_b_view, &uniforms.blur_v),
        composite_src: with_uniform("bg_composite", &targets.hdr_view, &uniforms.composite),
        composite_bloom: device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bg_bloom_a_only"),
            layout: bgl1,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&targets.bloom_a_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }),
    }
}
