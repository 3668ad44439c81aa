pub mod binding;
pub mod camera;
pub mod clock;
pub mod color;
pub mod constants;
pub mod lifecycle;
pub mod observed;
pub mod orbit;
pub mod panel;
pub mod persist;
pub mod pointer;
pub mod raycast;
pub mod viewport;
pub mod wobble;

pub use binding::*;
pub use camera::*;
pub use clock::*;
pub use color::*;
pub use lifecycle::*;
pub use observed::*;
pub use orbit::*;
pub use panel::*;
pub use persist::*;
pub use pointer::*;
pub use raycast::*;
pub use viewport::*;
pub use wobble::*;
