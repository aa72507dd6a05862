// ============================================
// Render Module - wgpu-слой рендеринга
// ============================================

mod bind_groups;
mod depth;
mod pipelines;
mod renderer;
mod shadow_atlas;
mod uniforms;
mod water;

pub use renderer::{FrameContext, Renderer};
pub use water::WaterParams;
