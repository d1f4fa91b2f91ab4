mod component;
mod render;
mod state;
mod types;

pub use component::{CanvasFrame, ForceGraphCanvas};
pub use types::GraphData;
