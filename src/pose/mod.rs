pub mod landmark;
pub mod skeleton;

pub use landmark::{Landmark, LandmarkIndex, PoseFrame};
pub use skeleton::POSE_CONNECTIONS;
