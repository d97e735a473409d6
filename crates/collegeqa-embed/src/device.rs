use candle_core::Device;

/// First available accelerator enabled at build time, else CPU.
pub fn select_device() -> Device {
    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(dev) => { tracing::info!("embedding device: CUDA"); return dev; }
            Err(e) => tracing::debug!(error = %e, "CUDA unavailable"),
        }
    }
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(dev) => { tracing::info!("embedding device: Metal"); return dev; }
            Err(e) => tracing::debug!(error = %e, "Metal unavailable"),
        }
    }
    tracing::info!("embedding device: CPU");
    Device::Cpu
}
