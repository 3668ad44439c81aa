// Shared lifecycle and interaction tuning constants.

// Viewport
pub const MAX_PIXEL_RATIO: f32 = 2.0; // bounds GPU fill cost on dense displays
pub const DEFAULT_HEADER_OFFSET: f32 = 0.0; // CSS px reserved above the canvas

// Frame clock
pub const FIXED_TIME_STEP: f32 = 1.0 / 60.0;
pub const DT_MIN_SEC: f32 = 0.0001;
pub const DT_MAX_SEC: f32 = 0.25; // long stalls (tab hidden, debugger) count as one short frame
pub const FPS_BLEND_ALPHA: f32 = 0.1; // new = (1-α)*old + α*instant

// Render loop
pub const MAX_CONSECUTIVE_FRAME_ERRORS: u32 = 120; // about two seconds at 60 Hz

// Pointer smoothing
pub const SMOOTHING_MIN: f32 = 0.001;
pub const SMOOTHING_MAX: f32 = 1.0;
pub const DEFAULT_SMOOTHING: f32 = 0.08;

// Wobble camera
pub const WOBBLE_MAX_OFFSET: f32 = 1.0; // clamp on the smoothed, normalized offset
pub const WOBBLE_TRANSLATE_AMPLITUDE: f32 = 0.5; // world units at full offset
pub const WOBBLE_ROTATE_AMPLITUDE_RAD: f32 = 0.12; // radians at full offset

// Camera defaults
pub const DEFAULT_FOV_DEG: f32 = 45.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 100.0;

// Orbit controls
pub const ORBIT_ROTATE_SPEED: f32 = 0.005; // radians per CSS pixel dragged
pub const ORBIT_ZOOM_SPEED: f32 = 0.001; // per wheel delta unit
pub const ORBIT_DAMPING: f32 = 0.1;
pub const ORBIT_MIN_DISTANCE: f32 = 1.0;
pub const ORBIT_MAX_DISTANCE: f32 = 50.0;
pub const ORBIT_POLAR_EPS: f32 = 0.01; // keeps the camera off the poles

// Persistence
pub const PERSIST_DECIMALS: i32 = 2;
