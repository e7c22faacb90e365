//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the window Surface (swapchain)
//! - an offscreen target with CPU readback for headless rendering

mod adapter;
mod frame;
mod gpu;
mod headless;
mod init;
mod surface;

pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use headless::HeadlessGpu;
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
