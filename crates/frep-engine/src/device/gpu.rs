use anyhow::{Context, Result};

use super::GpuInit;

/// Owns the wgpu core objects.
///
/// Creation failures are fatal: the viewer cannot run without a device.
pub struct GpuContext {
    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,
}

/// Marks one queue submission. Host code that reads GPU results waits on it.
#[derive(Debug, Clone)]
#[must_use = "a fence that is never waited on gives no ordering guarantee"]
pub struct Fence {
    index: wgpu::SubmissionIndex,
}

impl Fence {
    /// Blocks until the submission has finished executing.
    pub fn wait(&self, gpu: &GpuContext) -> Result<()> {
        gpu.device
            .poll(wgpu::PollType::Wait {
                submission_index: Some(self.index.clone()),
                timeout: None,
            })
            .context("waiting for GPU submission")?;
        Ok(())
    }
}

impl GpuContext {
    /// Blocking wrapper around [`GpuContext::new_async`].
    pub fn new(init: GpuInit) -> Result<Self> {
        pollster::block_on(Self::new_async(init))
    }

    /// Creates an instance, adapter, device and queue with no surface.
    pub async fn new_async(init: GpuInit) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("frep-engine device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        Ok(Self {
            adapter,
            device,
            queue,
        })
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub fn create_encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

    /// Submits recorded commands without waiting for them.
    pub fn submit(&self, encoder: wgpu::CommandEncoder) -> Fence {
        let index = self.queue.submit(std::iter::once(encoder.finish()));
        Fence { index }
    }
}
