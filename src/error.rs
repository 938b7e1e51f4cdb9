//! Configuration errors

/// Errors raised while loading or validating a [`RenderConfig`](crate::RenderConfig)
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A sampling step that would never terminate the sweep
    #[error("Sampling step `{name}` must be finite and strictly positive, got {value}")]
    InvalidStep { name: &'static str, value: f64 },

    /// Surface dimensions that do not describe a strip
    #[error("Geometry parameter `{name}` must be finite and strictly positive, got {value}")]
    InvalidGeometry { name: &'static str, value: f64 },

    /// Camera placed inside the surface
    #[error("View distance must be finite and non-negative, got {0}")]
    InvalidViewDistance(f64),

    /// Unknown color mode name
    #[error("Unknown color mode: {0} (expected green, rainbow, synthwave, depth or white)")]
    UnknownColorMode(String),
}
