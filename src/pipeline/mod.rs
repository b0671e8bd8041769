pub mod decimator;
pub mod fanout;
pub mod null;
pub mod plotter;
pub mod recorder;
pub mod sink;
pub mod streamer;

pub use decimator::Decimator;
pub use fanout::Pipeline;
pub use null::NullSink;
pub use plotter::Plotter;
pub use recorder::{Recorder, StorageBackend};
pub use sink::SampleSink;
pub use streamer::{Streamer, Transport};
