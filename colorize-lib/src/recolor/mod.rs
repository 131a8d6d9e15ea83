pub mod channel;
pub mod engine;
pub mod reactor;

pub use channel::StyleChannel;
pub use engine::OverrideEngine;
pub use reactor::{Reactor, Strategy};
