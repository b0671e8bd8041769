pub mod ring;
pub mod store;

pub use ring::RingBuffer;
pub use store::ChannelStore;
