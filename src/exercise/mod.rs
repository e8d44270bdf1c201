pub mod profile;

pub use profile::{Axis, ExerciseId, ExerciseProfile};
