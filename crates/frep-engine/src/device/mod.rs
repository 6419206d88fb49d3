//! Headless GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - submitting command buffers and handing out fences for readback

mod gpu;
mod init;

pub use gpu::{Fence, GpuContext};
pub use init::GpuInit;
