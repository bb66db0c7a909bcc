use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Basic two dimensional point used for geometry operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Output raster dimensions in pixels. Fixed for one generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(LayoutError::InvalidCanvas { width, height });
        }
        Ok(CanvasSize { width, height })
    }

    pub fn rect(&self) -> AbsoluteRect {
        AbsoluteRect {
            x: 0.0,
            y: 0.0,
            w: self.width as f64,
            h: self.height as f64,
        }
    }
}

/// Intrinsic dimensions of an image asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        PixelSize { width, height }
    }
}

/// Rectangle expressed as fractions of the canvas size.
///
/// Fractions are usually in `[0, 1]` but nothing clamps them; a region that
/// reaches past the canvas simply places content outside of it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x_frac: f64,
    pub y_frac: f64,
    pub w_frac: f64,
    pub h_frac: f64,
}

impl Region {
    pub const fn new(x_frac: f64, y_frac: f64, w_frac: f64, h_frac: f64) -> Self {
        Region {
            x_frac,
            y_frac,
            w_frac,
            h_frac,
        }
    }
}

/// Rectangle in canvas pixels (sub-pixel values allowed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AbsoluteRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl AbsoluteRect {
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Whether the rectangle lies fully inside `canvas`.
    pub fn within(&self, canvas: CanvasSize) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.right() <= canvas.width as f64
            && self.bottom() <= canvas.height as f64
    }
}

/// Pixel blending rule used when drawing over existing surface content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeMode {
    /// Source-over: the overlay replaces what is underneath.
    #[default]
    Normal,
    /// Darken-blend with the content already on the surface.
    Multiply,
}

/// How the background fills the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundFit {
    /// Stretch to the exact canvas size, ignoring aspect ratio.
    #[default]
    Stretch,
    /// Scale uniformly to fit inside the canvas and center.
    Contain,
}

/// Placement of one overlay slot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlaySpec {
    pub region: Region,
    pub padding_factor: f64,
    #[serde(default)]
    pub rotation_degrees: f64,
    #[serde(default)]
    pub composite_mode: CompositeMode,
}

impl OverlaySpec {
    pub fn validate(&self) -> Result<()> {
        check_padding(self.padding_factor)
    }
}

/// Named overlay slots. The declaration order is the draw order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Qr,
    Logo,
}

impl Slot {
    /// Overlays are drawn in this order, after the background.
    pub const DRAW_ORDER: [Slot; 2] = [Slot::Qr, Slot::Logo];

    /// Order in which missing uploads are reported to the user.
    pub const CHECK_ORDER: [Slot; 2] = [Slot::Logo, Slot::Qr];

    pub fn label(self) -> &'static str {
        match self {
            Slot::Qr => "QR image",
            Slot::Logo => "company logo",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Slot::Qr => "qr",
            Slot::Logo => "logo",
        })
    }
}

/// Final transform for one image: top-left, drawn size, rotation about the
/// drawn center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawPlan {
    pub x: f64,
    pub y: f64,
    pub draw_width: f64,
    pub draw_height: f64,
    pub rotation_radians: f64,
}

impl DrawPlan {
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.draw_width / 2.0,
            y: self.y + self.draw_height / 2.0,
        }
    }

    pub fn bounds(&self) -> AbsoluteRect {
        AbsoluteRect {
            x: self.x,
            y: self.y,
            w: self.draw_width,
            h: self.draw_height,
        }
    }
}

fn check_padding(padding: f64) -> Result<()> {
    if !(padding > 0.0 && padding <= 1.0) {
        return Err(LayoutError::InvalidPadding(padding));
    }
    Ok(())
}

/// Convert a fractional region into canvas pixels.
pub fn resolve_region(region: &Region, canvas: CanvasSize) -> AbsoluteRect {
    let w = canvas.width as f64;
    let h = canvas.height as f64;
    AbsoluteRect {
        x: region.x_frac * w,
        y: region.y_frac * h,
        w: region.w_frac * w,
        h: region.h_frac * h,
    }
}

/// Largest uniform scale keeping `asset` inside a `box_w` x `box_h` box,
/// shrunk by `padding`.
pub fn compute_fit_scale(asset: PixelSize, box_w: f64, box_h: f64, padding: f64) -> Result<f64> {
    if asset.width == 0 || asset.height == 0 {
        return Err(LayoutError::InvalidAsset {
            width: asset.width,
            height: asset.height,
        });
    }
    check_padding(padding)?;
    if !(box_w.is_finite() && box_h.is_finite() && box_w > 0.0 && box_h > 0.0) {
        return Err(LayoutError::DegenerateRegion { w: box_w, h: box_h });
    }
    let sx = box_w / asset.width as f64;
    let sy = box_h / asset.height as f64;
    Ok(sx.min(sy) * padding)
}

/// Top-left offset that centers `content_w` x `content_h` inside `bx`.
pub fn compute_centered_placement(bx: &AbsoluteRect, content_w: f64, content_h: f64) -> Point {
    Point {
        x: bx.x + (bx.w - content_w) / 2.0,
        y: bx.y + (bx.h - content_h) / 2.0,
    }
}

fn plan_in_box(
    bx: &AbsoluteRect,
    asset: PixelSize,
    padding: f64,
    rotation_degrees: f64,
) -> Result<DrawPlan> {
    let scale = compute_fit_scale(asset, bx.w, bx.h, padding)?;
    let draw_width = asset.width as f64 * scale;
    let draw_height = asset.height as f64 * scale;
    let at = compute_centered_placement(bx, draw_width, draw_height);
    Ok(DrawPlan {
        x: at.x,
        y: at.y,
        draw_width,
        draw_height,
        rotation_radians: rotation_degrees.to_radians(),
    })
}

/// Resolve the overlay region, fit the asset into it, center it and attach
/// the rotation. Pure: identical inputs give identical plans.
pub fn compute_draw_plan(
    overlay: &OverlaySpec,
    asset: PixelSize,
    canvas: CanvasSize,
) -> Result<DrawPlan> {
    let bx = resolve_region(&overlay.region, canvas);
    if !bx.within(canvas) {
        log::warn!(
            "overlay box ({:.1}, {:.1}, {:.1}x{:.1}) reaches outside the {}x{} canvas",
            bx.x,
            bx.y,
            bx.w,
            bx.h,
            canvas.width,
            canvas.height
        );
    }
    plan_in_box(
        &bx,
        asset,
        overlay.padding_factor,
        overlay.rotation_degrees,
    )
}

/// Plan for the background layer: never padded, never rotated.
pub fn compute_background_plan(
    fit: BackgroundFit,
    asset: PixelSize,
    canvas: CanvasSize,
) -> Result<DrawPlan> {
    if asset.width == 0 || asset.height == 0 {
        return Err(LayoutError::InvalidAsset {
            width: asset.width,
            height: asset.height,
        });
    }
    match fit {
        BackgroundFit::Stretch => Ok(DrawPlan {
            x: 0.0,
            y: 0.0,
            draw_width: canvas.width as f64,
            draw_height: canvas.height as f64,
            rotation_radians: 0.0,
        }),
        BackgroundFit::Contain => plan_in_box(&canvas.rect(), asset, 1.0, 0.0),
    }
}
