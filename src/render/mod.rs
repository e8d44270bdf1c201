pub mod overlay;

pub use overlay::{connection_styles, predicted_landmarks, ConnectionStyle};
