// Robot system
//
// This module contains everything related to the fighting robots:
// - Robot data structure, input handling, hits and drawing
// - Shared gameplay tuning
// - State machine for robot behavior
// - Pose engine placing each part per tick

pub mod pose;
pub mod robot;
pub mod state;
pub mod tuning;

// Re-export commonly used types
pub use pose::PartTexture;
pub use robot::{Palette, PartTextures, Robot, RobotResources};
pub use state::Facing;
pub use tuning::RobotTuning;
