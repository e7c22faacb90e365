use anyhow::{Context, Result};

use super::GpuInit;

/// Instance over all backends; wgpu picks the platform's best one.
pub(super) fn create_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}

/// Requests an adapter (optionally surface-compatible) and its device/queue.
pub(super) async fn request_device(
    instance: &wgpu::Instance,
    compatible_surface: Option<&wgpu::Surface<'_>>,
    init: &GpuInit,
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue)> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface,
            force_fallback_adapter: init.force_fallback_adapter,
        })
        .await
        .context("failed to find a suitable GPU adapter")?;

    let info = adapter.get_info();
    log::info!("using adapter {:?} ({:?})", info.name, info.backend);

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("spanlens device"),
            required_features: init.required_features,
            required_limits: init.required_limits.clone(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        })
        .await
        .context("failed to create wgpu device/queue")?;

    Ok((adapter, device, queue))
}
