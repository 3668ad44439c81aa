use super::WebSketch;
use crate::constants::*;
use crate::render::helpers::{blit, create_uniform_buffer, make_fullscreen_pipeline, uniform_entry};
use crate::render::{clear_color, GpuContext, PostChain, PostParams, HDR_FORMAT, WAVES_WGSL};
use sketch_core::{
    ControlOptions, DebugPanel, FrameContext, Lens, Observed, Sketch, ViewportSize,
};

#[repr(C)]
#[derive(Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct WavesUniforms {
    resolution: [f32; 2],
    time: f32,
    amplitude: f32,
    pointer: [f32; 2],
    frequency: f32,
    speed: f32,
    tint: [f32; 3],
    pointer_influence: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WavesParams {
    pub speed: f32,
    pub amplitude: f32,
    pub frequency: f32,
    pub tint: [f32; 3],
    pub pointer_influence: f32,
    pub bloom_strength: f32,
    pub threshold: f32,
}

impl Default for WavesParams {
    fn default() -> Self {
        Self {
            speed: WAVES_SPEED,
            amplitude: WAVES_AMPLITUDE,
            frequency: WAVES_FREQUENCY,
            tint: WAVES_TINT,
            pointer_influence: WAVES_POINTER_INFLUENCE,
            bloom_strength: BLOOM_STRENGTH,
            threshold: BLOOM_THRESHOLD,
        }
    }
}

const SPEED: Lens<WavesParams, f32> = Lens::new("speed", |p| p.speed, |p, v| p.speed = v);
const AMPLITUDE: Lens<WavesParams, f32> =
    Lens::new("amplitude", |p| p.amplitude, |p, v| p.amplitude = v);
const FREQUENCY: Lens<WavesParams, f32> =
    Lens::new("frequency", |p| p.frequency, |p, v| p.frequency = v);
const POINTER_INFLUENCE: Lens<WavesParams, f32> = Lens::new(
    "pointer_influence",
    |p| p.pointer_influence,
    |p, v| p.pointer_influence = v,
);
const TINT: Lens<WavesParams, [f32; 3]> = Lens::new("tint", |p| p.tint, |p, v| p.tint = v);
const BLOOM: Lens<WavesParams, f32> =
    Lens::new("bloom_strength", |p| p.bloom_strength, |p, v| p.bloom_strength = v);
const THRESHOLD: Lens<WavesParams, f32> =
    Lens::new("threshold", |p| p.threshold, |p, v| p.threshold = v);

/// Full-screen interference pattern steered by the smoothed pointer.
pub struct Waves {
    gpu: GpuContext,
    params: Observed<WavesParams>,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    post: PostChain,
    uniforms: WavesUniforms,
}

pub fn build(gpu: GpuContext) -> anyhow::Result<Box<dyn WebSketch>> {
    Ok(Box::new(Waves::new(gpu)))
}

impl Waves {
    pub fn new(gpu: GpuContext) -> Self {
        let device = &gpu.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("waves_shader"),
            source: wgpu::ShaderSource::Wgsl(WAVES_WGSL.into()),
        });
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("waves_bgl"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("waves_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let pipeline = make_fullscreen_pipeline(
            device,
            "waves_pipeline",
            &layout,
            &shader,
            "fs_waves",
            HDR_FORMAT,
            None,
        );
        let uniforms = WavesUniforms::default();
        let uniform_buffer = create_uniform_buffer(device, "waves_uniforms", &uniforms);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("waves_bg"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let (w, h) = gpu.size();
        let post = PostChain::new(device, gpu.format(), w, h);
        log::info!("[waves] pipeline ready {}x{}", w, h);

        Self {
            gpu,
            params: Observed::new(WavesParams::default()),
            pipeline,
            uniform_buffer,
            bind_group,
            post,
            uniforms,
        }
    }
}

impl Sketch for Waves {
    fn resize(&mut self, viewport: &ViewportSize) {
        if self.gpu.resize(viewport) {
            let (w, h) = self.gpu.size();
            self.post.resize(&self.gpu.device, w, h);
            log::info!("[waves] resized to {}x{}", w, h);
        }
    }

    fn update(&mut self, frame: &FrameContext<'_>) -> anyhow::Result<()> {
        let p = *self.params.borrow();
        let (w, h) = self.gpu.size();
        self.uniforms = WavesUniforms {
            resolution: [w as f32, h as f32],
            time: frame.time.elapsed,
            amplitude: p.amplitude,
            pointer: frame.pointer.smoothed().to_array(),
            frequency: p.frequency,
            speed: p.speed,
            tint: p.tint,
            pointer_influence: p.pointer_influence,
        };
        Ok(())
    }

    fn render(&mut self, frame: &FrameContext<'_>) -> anyhow::Result<()> {
        let output = self.gpu.acquire()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let queue = &self.gpu.queue;
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("waves_encoder"),
            });
        blit(
            &mut encoder,
            "waves_pass",
            self.post.hdr_view(),
            clear_color(CLEAR_RGB),
            &self.pipeline,
            &[&self.bind_group],
        );
        let p = self.params.borrow();
        self.post.run(
            &mut encoder,
            queue,
            &view,
            PostParams {
                time: frame.time.elapsed,
                bloom_strength: p.bloom_strength,
                threshold: p.threshold,
            },
        );
        queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }

    fn dispose(&mut self) {
        self.uniform_buffer.destroy();
        self.post.destroy();
        log::info!("[waves] disposed");
    }
}

impl WebSketch for Waves {
    fn name(&self) -> &'static str {
        "waves"
    }

    fn build_panel(&mut self, panel: &mut DebugPanel) {
        let waves = panel.add_folder("Waves");
        panel.bind_number(
            &self.params,
            SPEED,
            ControlOptions::new().folder(waves).range(0.0, 5.0).step(0.01),
        );
        panel.bind_number(
            &self.params,
            AMPLITUDE,
            ControlOptions::new().folder(waves).range(0.0, 2.0).step(0.01),
        );
        panel.bind_number(
            &self.params,
            FREQUENCY,
            ControlOptions::new().folder(waves).range(1.0, 40.0).step(0.1),
        );
        panel.bind_number(
            &self.params,
            POINTER_INFLUENCE,
            ControlOptions::new()
                .label("pointer")
                .folder(waves)
                .range(0.0, 4.0)
                .step(0.01),
        );
        panel.bind_color(&self.params, TINT, ControlOptions::new().folder(waves));

        let bloom = panel.add_folder("Bloom");
        panel.bind_number(
            &self.params,
            BLOOM,
            ControlOptions::new()
                .label("strength")
                .folder(bloom)
                .range(0.0, BLOOM_STRENGTH_MAX)
                .step(0.01),
        );
        panel.bind_number(
            &self.params,
            THRESHOLD,
            ControlOptions::new().folder(bloom).range(0.0, 2.0).step(0.01),
        );
    }
}
