use thiserror::Error;

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors raised while validating a layout or computing draw plans.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// An image with a zero dimension cannot be scaled into a box.
    #[error("invalid asset: {width}x{height} has a zero dimension")]
    InvalidAsset { width: u32, height: u32 },

    #[error("padding factor must be in (0, 1], got {0}")]
    InvalidPadding(f64),

    /// The resolved placement box has no positive area.
    #[error("degenerate region: resolved box is {w}x{h} px")]
    DegenerateRegion { w: f64, h: f64 },

    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    #[error("config JSON: {0}")]
    Json(#[from] serde_json::Error),
}
