pub mod controller;
pub mod runtime;
pub mod tuning;

pub use controller::{AdaptiveController, ControlBias, ControllerBounds};
pub use runtime::{Engine, RenderFn, SampleSource};
pub use tuning::TuningHandle;
