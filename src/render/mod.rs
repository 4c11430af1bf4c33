pub mod layout;
pub mod renderer;

pub use layout::GridLayout;
pub use renderer::Renderer;
