//! Error types for framecrate

use thiserror::Error;

/// Main error type for framecrate operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Shader error: {0}")]
    Shader(String),

    #[error("Visualization error: {0}")]
    Visualization(String),
}

/// Result type alias for framecrate operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(feature = "gpu")]
impl From<wgpu::RequestDeviceError> for Error {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        Error::Gpu(format!("Failed to create device: {}", e))
    }
}

#[cfg(feature = "gpu")]
impl From<wgpu::CreateSurfaceError> for Error {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        Error::Gpu(format!("Failed to create surface: {}", e))
    }
}
