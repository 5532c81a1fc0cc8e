pub mod filter;
pub mod layout;
pub mod scene;
pub mod state;

pub use layout::LayoutConfig;
pub use scene::{GeometryClass, SceneConfig, Tint};
pub use state::TreeState;
