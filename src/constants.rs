// Front-end tuning constants.
//
// Rendering, panel and sketch defaults live here so the magic numbers stay
// out of the sketch code.

// Debug panel
pub const PANEL_Z_INDEX: i32 = 1000; // above route content
pub const PANEL_WIDTH_PX: u32 = 260;
pub const PANEL_MARGIN_PX: u32 = 8;

// Clear color for the HDR scene target
pub const CLEAR_RGB: [f64; 3] = [0.03, 0.04, 0.08];

// Post-processing defaults
pub const BLOOM_STRENGTH: f32 = 0.9;
pub const BLOOM_THRESHOLD: f32 = 0.6;
pub const BLOOM_STRENGTH_MAX: f32 = 3.0;

// Waves sketch defaults
pub const WAVES_SPEED: f32 = 1.0;
pub const WAVES_AMPLITUDE: f32 = 0.8;
pub const WAVES_FREQUENCY: f32 = 12.0;
pub const WAVES_POINTER_INFLUENCE: f32 = 1.2;
pub const WAVES_TINT: [f32; 3] = [0.25, 0.55, 1.0];

// Particles sketch
pub const PARTICLE_COUNT: u32 = 16_384;
pub const PARTICLE_WORKGROUP_SIZE: u32 = 64; // must match @workgroup_size in particles.wgsl
pub const PARTICLE_SPAWN_RADIUS: f32 = 3.0;
pub const PARTICLE_SEED: u64 = 42;
pub const PARTICLE_SIZE_PX: f32 = 3.0;
pub const PARTICLE_DAMPING: f32 = 0.985; // velocity kept per 60 Hz step
pub const ATTRACTOR_STRENGTH: f32 = 2.5;
pub const PARTICLE_COLOR: [f32; 3] = [1.0, 0.55, 0.2];

// Camera
pub const CAMERA_POSITION: [f32; 3] = [0.0, 3.0, 8.0];
pub const FOV_MIN_DEG: f32 = 20.0;
pub const FOV_MAX_DEG: f32 = 100.0;
