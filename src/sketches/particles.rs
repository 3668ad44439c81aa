use super::WebSketch;
use crate::constants::*;
use crate::render::helpers::uniform_entry;
use crate::render::{clear_color, GpuContext, PostChain, PostParams, HDR_FORMAT, PARTICLES_WGSL};
use glam::Vec3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use sketch_core::{
    Camera, ControlOptions, DebugPanel, FrameContext, InteractionMode, Lens, Observed,
    OrbitControls, OrbitOptions, Plane, PointerInput, PointerState, RayCastTarget, Sketch,
    ViewportSize, WobbleCamera, WobbleOptions,
};
use sketch_core::constants::DEFAULT_SMOOTHING;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Particle {
    pos: [f32; 4],
    vel: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct SimUniforms {
    attractor: [f32; 3],
    dt: f32,
    strength: f32,
    damping: f32,
    time: f32,
    count: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct RenderUniforms {
    view_proj: [[f32; 4]; 4],
    color: [f32; 3],
    point_size: f32,
    viewport: [f32; 2],
    _pad: [f32; 2],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleParams {
    pub attractor_strength: f32,
    pub damping: f32,
    pub point_size: f32,
    pub color: [f32; 3],
    pub bloom_strength: f32,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            attractor_strength: ATTRACTOR_STRENGTH,
            damping: PARTICLE_DAMPING,
            point_size: PARTICLE_SIZE_PX,
            color: PARTICLE_COLOR,
            bloom_strength: BLOOM_STRENGTH,
        }
    }
}

const STRENGTH: Lens<ParticleParams, f32> = Lens::new(
    "attractor_strength",
    |p| p.attractor_strength,
    |p, v| p.attractor_strength = v,
);
const DAMPING: Lens<ParticleParams, f32> =
    Lens::new("damping", |p| p.damping, |p, v| p.damping = v);
const POINT_SIZE: Lens<ParticleParams, f32> =
    Lens::new("point_size", |p| p.point_size, |p, v| p.point_size = v);
const COLOR: Lens<ParticleParams, [f32; 3]> =
    Lens::new("color", |p| p.color, |p, v| p.color = v);
const BLOOM: Lens<ParticleParams, f32> =
    Lens::new("bloom_strength", |p| p.bloom_strength, |p, v| p.bloom_strength = v);
const FOV: Lens<Camera, f32> = Lens::new("fov", |c| c.fov_degrees, |c, v| c.fov_degrees = v);

/// Compute-integrated particle field pulled toward an attractor.
///
/// Orbit mode drags the camera, wobble mode perturbs a captured pose with
/// the pointer, ray-cast mode moves the attractor across the ground plane.
pub struct Particles {
    gpu: GpuContext,
    camera: Observed<Camera>,
    orbit: OrbitControls,
    wobble: WobbleCamera,
    attractor: RayCastTarget,
    mode: InteractionMode,
    params: Observed<ParticleParams>,
    count: u32,
    particle_buffer: wgpu::Buffer,
    sim_buffer: wgpu::Buffer,
    render_buffer: wgpu::Buffer,
    compute_bg: wgpu::BindGroup,
    render_bg: wgpu::BindGroup,
    compute_pipeline: wgpu::ComputePipeline,
    render_pipeline: wgpu::RenderPipeline,
    post: PostChain,
    sim: SimUniforms,
    draw: RenderUniforms,
}

pub fn build(gpu: GpuContext) -> anyhow::Result<Box<dyn WebSketch>> {
    Ok(Box::new(Particles::new(gpu)))
}

fn seed_particles(count: u32, seed: u64) -> Vec<Particle> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            // uniform in a ball
            let dir = loop {
                let v = Vec3::new(
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-1.0..=1.0),
                );
                if v.length_squared() <= 1.0 {
                    break v;
                }
            };
            let pos = dir * PARTICLE_SPAWN_RADIUS;
            Particle {
                pos: [pos.x, pos.y, pos.z, 1.0],
                vel: [0.0; 4],
            }
        })
        .collect()
}

impl Particles {
    pub fn new(gpu: GpuContext) -> Self {
        let device = &gpu.device;
        let count = PARTICLE_COUNT;
        let particles = seed_particles(count, PARTICLE_SEED);
        let particle_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("particles"),
            contents: bytemuck::cast_slice(&particles),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::VERTEX,
        });
        let sim_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particles_sim_u"),
            size: std::mem::size_of::<SimUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let render_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particles_render_u"),
            size: std::mem::size_of::<RenderUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("particles_shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLES_WGSL.into()),
        });
        let compute_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("particles_compute_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                uniform_entry(1, wgpu::ShaderStages::COMPUTE),
            ],
        });
        let render_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("particles_render_bgl"),
            entries: &[uniform_entry(
                2,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });
        let compute_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("particles_compute_bg"),
            layout: &compute_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: particle_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: sim_buffer.as_entire_binding(),
                },
            ],
        });
        let render_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("particles_render_bg"),
            layout: &render_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 2,
                resource: render_buffer.as_entire_binding(),
            }],
        });

        let compute_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("particles_compute_pl"),
            bind_group_layouts: &[&compute_bgl],
            push_constant_ranges: &[],
        });
        let compute_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("particles_simulate"),
            layout: Some(&compute_pl),
            module: &shader,
            entry_point: Some("cs_simulate"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        let render_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("particles_render_pl"),
            bind_group_layouts: &[&render_bgl],
            push_constant_ranges: &[],
        });
        let instance_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Particle>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4],
        };
        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };
        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("particles_render"),
            layout: Some(&render_pl),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_particle"),
                buffers: &[instance_layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_particle"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: Some(additive),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let (w, h) = gpu.size();
        let post = PostChain::new(device, gpu.format(), w, h);

        let [x, y, z] = CAMERA_POSITION;
        let camera = Camera::new(Vec3::new(x, y, z), Vec3::ZERO);
        let orbit = OrbitControls::new(&camera, OrbitOptions::default());
        let attractor = RayCastTarget::new(
            Plane::from_normal_and_point(Vec3::Y, Vec3::ZERO),
            Vec3::ZERO,
            DEFAULT_SMOOTHING,
        );
        log::info!("[particles] {} particles, surface {}x{}", count, w, h);

        Self {
            gpu,
            camera: Observed::new(camera),
            orbit,
            wobble: WobbleCamera::new(WobbleOptions::default()),
            attractor,
            mode: InteractionMode::Orbit,
            params: Observed::new(ParticleParams::default()),
            count,
            particle_buffer,
            sim_buffer,
            render_buffer,
            compute_bg,
            render_bg,
            compute_pipeline,
            render_pipeline,
            post,
            sim: SimUniforms::default(),
            draw: RenderUniforms::default(),
        }
    }

    fn step_camera(&mut self, pointer: &PointerState) {
        match self.mode {
            InteractionMode::Orbit => {
                let orbit = &mut self.orbit;
                self.camera.modify_if(|c| orbit.update(c));
            }
            InteractionMode::Wobble => {
                self.wobble.set_target(pointer.target());
                let wobble = &mut self.wobble;
                self.camera.modify_if(|c| {
                    let before = (c.position, c.target, c.up);
                    wobble.update(c);
                    before != (c.position, c.target, c.up)
                });
            }
            InteractionMode::RayCast => {
                self.attractor.cast(&self.camera.borrow(), pointer.target());
            }
        }
    }
}

impl Sketch for Particles {
    fn resize(&mut self, viewport: &ViewportSize) {
        let aspect = viewport.aspect();
        self.camera.modify_if(|c| {
            if c.aspect == aspect {
                return false;
            }
            c.set_aspect(aspect);
            true
        });
        if self.gpu.resize(viewport) {
            let (w, h) = self.gpu.size();
            self.post.resize(&self.gpu.device, w, h);
            log::info!("[particles] resized to {}x{}", w, h);
        }
    }

    fn update(&mut self, frame: &FrameContext<'_>) -> anyhow::Result<()> {
        self.step_camera(frame.pointer);
        let attractor = self.attractor.step();

        let p = *self.params.borrow();
        let (w, h) = self.gpu.size();
        self.sim = SimUniforms {
            attractor: attractor.to_array(),
            dt: frame.time.dt,
            strength: p.attractor_strength,
            damping: p.damping,
            time: frame.time.elapsed,
            count: self.count,
        };
        self.draw = RenderUniforms {
            view_proj: self.camera.borrow().view_projection().to_cols_array_2d(),
            color: p.color,
            // CSS pixels to backing pixels
            point_size: p.point_size * frame.viewport.pixel_ratio,
            viewport: [w as f32, h as f32],
            _pad: [0.0; 2],
        };
        Ok(())
    }

    fn render(&mut self, frame: &FrameContext<'_>) -> anyhow::Result<()> {
        let output = self.gpu.acquire()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let queue = &self.gpu.queue;
        queue.write_buffer(&self.sim_buffer, 0, bytemuck::bytes_of(&self.sim));
        queue.write_buffer(&self.render_buffer, 0, bytemuck::bytes_of(&self.draw));

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("particles_encoder"),
            });
        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("particles_simulate"),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&self.compute_pipeline);
            cpass.set_bind_group(0, &self.compute_bg, &[]);
            cpass.dispatch_workgroups(self.count.div_ceil(PARTICLE_WORKGROUP_SIZE), 1, 1);
        }
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("particles_draw"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.post.hdr_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(CLEAR_RGB)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.render_pipeline);
            rpass.set_bind_group(0, &self.render_bg, &[]);
            rpass.set_vertex_buffer(0, self.particle_buffer.slice(..));
            rpass.draw(0..6, 0..self.count);
        }
        let p = self.params.borrow();
        self.post.run(
            &mut encoder,
            queue,
            &view,
            PostParams {
                time: frame.time.elapsed,
                bloom_strength: p.bloom_strength,
                threshold: BLOOM_THRESHOLD,
            },
        );
        queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }

    fn pointer(&mut self, input: &PointerInput, _pointer: &PointerState, _viewport: &ViewportSize) {
        if self.mode != InteractionMode::Orbit {
            return;
        }
        match *input {
            PointerInput::Down { client, button: 0 } => self.orbit.pointer_down(client),
            PointerInput::Move { client } => self.orbit.pointer_move(client),
            PointerInput::Up { .. } => self.orbit.pointer_up(),
            PointerInput::Wheel { delta_y } => self.orbit.wheel(delta_y),
            PointerInput::Down { .. } => {}
        }
    }

    fn dispose(&mut self) {
        self.particle_buffer.destroy();
        self.sim_buffer.destroy();
        self.render_buffer.destroy();
        self.post.destroy();
        log::info!("[particles] disposed");
    }
}

impl WebSketch for Particles {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn build_panel(&mut self, panel: &mut DebugPanel) {
        let camera = panel.add_folder("Camera");
        panel.bind_number(
            &self.camera,
            FOV,
            ControlOptions::new()
                .label("fov")
                .folder(camera)
                .range(FOV_MIN_DEG, FOV_MAX_DEG)
                .step(1.0)
                .on_change(|c: &mut Camera, _| c.update_projection_matrix()),
        );

        let field = panel.add_folder("Particles");
        panel.bind_number(
            &self.params,
            STRENGTH,
            ControlOptions::new()
                .label("attractor")
                .folder(field)
                .range(0.0, 10.0)
                .step(0.1),
        );
        panel.bind_number(
            &self.params,
            DAMPING,
            ControlOptions::new().folder(field).range(0.9, 1.0).step(0.001),
        );
        panel.bind_number(
            &self.params,
            POINT_SIZE,
            ControlOptions::new()
                .label("size")
                .folder(field)
                .range(1.0, 12.0)
                .step(0.5),
        );
        panel.bind_color(&self.params, COLOR, ControlOptions::new().folder(field));
        panel.bind_number(
            &self.params,
            BLOOM,
            ControlOptions::new()
                .label("bloom")
                .folder(field)
                .range(0.0, BLOOM_STRENGTH_MAX)
                .step(0.01),
        );
    }

    fn mode(&self) -> Option<InteractionMode> {
        Some(self.mode)
    }

    fn set_mode(&mut self, mode: InteractionMode) -> bool {
        if mode == self.mode {
            return true;
        }
        if self.mode == InteractionMode::Wobble {
            self.wobble.release();
        }
        match mode {
            InteractionMode::Wobble => self.wobble.capture(&self.camera.borrow()),
            InteractionMode::Orbit => self.orbit.sync_from_camera(&self.camera.borrow()),
            InteractionMode::RayCast => {}
        }
        log::info!("[particles] mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        true
    }

    fn camera(&self) -> Option<Observed<Camera>> {
        Some(self.camera.clone())
    }

    fn on_camera_restored(&mut self) {
        let camera = self.camera.borrow();
        self.orbit.sync_from_camera(&camera);
        if self.wobble.is_active() {
            self.wobble.capture(&camera);
        }
    }
}
