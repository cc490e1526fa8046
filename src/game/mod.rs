// Game layer: robots, hit stars, background, the hit-box overlay and the
// scene tying them together

pub mod background;
pub mod debug;
pub mod effects;
pub mod robots;
pub mod scene;

pub use scene::{Game, SceneResources};
