//! # Canopy GPU
//!
//! wgpu rendering for canopy scenes.
//!
//! Every point batch is drawn as instanced, camera-facing quads sized in
//! world units. Uploads are cached per batch role and refreshed only when
//! the batch's revision stamp changes.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use canopy_gpu::{PointCloudRenderer, RenderConfig};
//! use winit::{event_loop::EventLoop, window::WindowBuilder};
//!
//! fn example() -> canopy_core::Result<()> {
//!     let event_loop = EventLoop::new().map_err(|e| canopy_core::Error::Gpu(e.to_string()))?;
//!     let window = Arc::new(
//!         WindowBuilder::new()
//!             .build(&event_loop)
//!             .map_err(|e| canopy_core::Error::Gpu(e.to_string()))?,
//!     );
//!     let renderer = pollster::block_on(PointCloudRenderer::new(window, RenderConfig::default()))?;
//!     # let _ = renderer;
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod renderer;

pub use device::GpuContext;
pub use renderer::{
    opengl_to_wgpu_matrix, CameraUniform, PointCloudRenderer, PointInstance, RenderConfig,
};
