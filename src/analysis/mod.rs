pub mod deviation;
pub mod gate;
pub mod repetition;
pub mod window;

pub use deviation::{performance_score, score, DeviationReport, JointError};
pub use gate::{admit, VisibilityGate};
pub use repetition::{RepState, RepetitionCounter};
pub use window::SequenceWindow;
