//! Layout engine for standee posters: places a QR code and a logo inside a
//! background template at fractional regions, scaled to fit and rotated
//! about their own center. Pure geometry, no pixels.

pub mod config;
pub mod error;
pub mod layout;

pub use config::{ExportPreset, LayoutConfig, PageSize, Preset};
pub use error::{LayoutError, Result};
pub use layout::{
    AbsoluteRect, BackgroundFit, CanvasSize, CompositeMode, DrawPlan, OverlaySpec, PixelSize,
    Point, Region, Slot, compute_background_plan, compute_centered_placement, compute_draw_plan,
    compute_fit_scale, resolve_region,
};
