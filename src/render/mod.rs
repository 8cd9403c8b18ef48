pub mod animator;
pub mod camera;
pub mod dispersion;
pub mod picking;
pub mod scene;
pub mod starfield;

pub use camera::{OrbitCamera, Ray};
pub use scene::GalaxyScene;
