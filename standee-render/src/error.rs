use standee_core::{LayoutError, Slot};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("SVG parse error: {0}")]
    Svg(String),

    /// A required slot had no asset at generation time.
    #[error("please upload the {} first", .0.label())]
    MissingUpload(Slot),

    #[error("pixmap alloc failed for {width}x{height}")]
    Alloc { width: u32, height: u32 },

    #[error("encode: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::Decode(err.to_string())
    }
}

impl From<png::EncodingError> for RenderError {
    fn from(err: png::EncodingError) -> Self {
        RenderError::Encode(err.to_string())
    }
}
