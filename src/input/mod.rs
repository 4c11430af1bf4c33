pub mod handler;
pub mod pointer;

pub use handler::{InputAction, InputHandler};
pub use pointer::{PointerReader, PointerSlot, pointer_channel};
