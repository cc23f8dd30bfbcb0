pub mod event;
pub mod flow;

pub use event::*;
pub use flow::*;
