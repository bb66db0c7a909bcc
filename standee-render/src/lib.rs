//! Raster side of the standee generator: decoded image assets, the drawing
//! surface, the background/QR/logo composition pipeline and PNG/JPEG/PDF
//! export.

pub mod asset;
pub mod compose;
pub mod error;
pub mod export;
pub mod surface;

pub use asset::ImageAsset;
pub use compose::{
    GenerationRequest, Layer, PlannedDraw, check_required, compose, generate, plan_generation,
};
pub use error::{RenderError, Result};
pub use export::{ExportFormat, encode_jpeg, encode_pdf, encode_png, export};
pub use surface::Surface;
