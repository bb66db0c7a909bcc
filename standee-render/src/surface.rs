use standee_core::{CanvasSize, CompositeMode, DrawPlan};
use tiny_skia::{BlendMode, FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::asset::ImageAsset;
use crate::error::{RenderError, Result};

/// The output raster. One surface has exactly one writer per generation.
#[derive(Clone, Debug)]
pub struct Surface {
    canvas: CanvasSize,
    pixmap: Pixmap,
}

impl Surface {
    /// Transparent surface of the canvas size.
    pub fn new(canvas: CanvasSize) -> Result<Self> {
        let pixmap = Pixmap::new(canvas.width, canvas.height).ok_or(RenderError::Alloc {
            width: canvas.width,
            height: canvas.height,
        })?;
        Ok(Surface { canvas, pixmap })
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Draw `asset` so its center lands on the plan's center, scaled to the
    /// planned size and rotated about that center.
    pub fn render(&mut self, plan: &DrawPlan, asset: &ImageAsset, mode: CompositeMode) {
        let paint = PixmapPaint {
            opacity: 1.0,
            blend_mode: blend_mode(mode),
            quality: FilterQuality::Bilinear,
        };
        let ts = plan_transform(plan, asset);
        self.pixmap
            .draw_pixmap(0, 0, asset.pixmap().as_ref(), &paint, ts, None);
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight-alpha RGBA at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
    }

    /// Straight-alpha RGBA rows, as browser `ImageData` expects.
    pub fn to_rgba(&self) -> Vec<u8> {
        demultiplied_rgba(&self.pixmap)
    }

    /// Copy of the surface scaled to `width` x `height`.
    pub fn resampled(&self, width: u32, height: u32) -> Result<Pixmap> {
        if width == self.canvas.width && height == self.canvas.height {
            return Ok(self.pixmap.clone());
        }
        let mut out = Pixmap::new(width, height).ok_or(RenderError::Alloc { width, height })?;
        let sx = width as f32 / self.canvas.width as f32;
        let sy = height as f32 / self.canvas.height as f32;
        let paint = PixmapPaint {
            quality: FilterQuality::Bicubic,
            ..PixmapPaint::default()
        };
        out.draw_pixmap(
            0,
            0,
            self.pixmap.as_ref(),
            &paint,
            Transform::from_scale(sx, sy),
            None,
        );
        Ok(out)
    }
}

pub(crate) fn demultiplied_rgba(pixmap: &Pixmap) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixmap.data().len());
    for p in pixmap.pixels() {
        let c = p.demultiply();
        out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

fn blend_mode(mode: CompositeMode) -> BlendMode {
    match mode {
        CompositeMode::Normal => BlendMode::SourceOver,
        CompositeMode::Multiply => BlendMode::Multiply,
    }
}

// asset space -> centered at origin -> scaled -> rotated -> moved to the plan center
fn plan_transform(plan: &DrawPlan, asset: &ImageAsset) -> Transform {
    let size = asset.size();
    let (w, h) = (size.width as f32, size.height as f32);
    let sx = plan.draw_width as f32 / w;
    let sy = plan.draw_height as f32 / h;
    let c = plan.center();
    Transform::from_translate(-w / 2.0, -h / 2.0)
        .post_scale(sx, sy)
        .post_rotate(plan.rotation_radians.to_degrees() as f32)
        .post_translate(c.x as f32, c.y as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(x: f64, y: f64, w: f64, h: f64, rot_deg: f64) -> DrawPlan {
        DrawPlan {
            x,
            y,
            draw_width: w,
            draw_height: h,
            rotation_radians: rot_deg.to_radians(),
        }
    }

    #[test]
    fn transform_maps_asset_corners_onto_plan() {
        let asset = ImageAsset::solid(10, 20, [0, 0, 0, 255]).unwrap();
        let ts = plan_transform(&plan(5.0, 7.0, 30.0, 60.0, 0.0), &asset);
        let mut pts = [
            tiny_skia::Point::from_xy(0.0, 0.0),
            tiny_skia::Point::from_xy(10.0, 20.0),
        ];
        ts.map_points(&mut pts);
        assert!((pts[0].x - 5.0).abs() < 1e-4 && (pts[0].y - 7.0).abs() < 1e-4);
        assert!((pts[1].x - 35.0).abs() < 1e-4 && (pts[1].y - 67.0).abs() < 1e-4);
    }

    #[test]
    fn rotation_pivots_on_center() {
        let asset = ImageAsset::solid(10, 10, [0, 0, 0, 255]).unwrap();
        let p = plan(0.0, 0.0, 10.0, 10.0, -5.0);
        let ts = plan_transform(&p, &asset);
        let mut pts = [tiny_skia::Point::from_xy(5.0, 5.0)];
        ts.map_points(&mut pts);
        assert!((pts[0].x - 5.0).abs() < 1e-4 && (pts[0].y - 5.0).abs() < 1e-4);
    }

    #[test]
    fn normal_draw_covers_plan_area() {
        let mut s = Surface::new(CanvasSize::new(20, 20).unwrap()).unwrap();
        let red = ImageAsset::solid(4, 4, [255, 0, 0, 255]).unwrap();
        s.render(&plan(5.0, 5.0, 10.0, 10.0, 0.0), &red, CompositeMode::Normal);
        let [r, g, _, a] = s.pixel(10, 10).unwrap();
        assert!(r >= 254 && g <= 1 && a >= 254, "got {r} {g} {a}");
        assert_eq!(s.pixel(1, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn multiply_darkens_existing_content() {
        let canvas = CanvasSize::new(20, 20).unwrap();
        let full = plan(0.0, 0.0, 20.0, 20.0, 0.0);
        let gray = ImageAsset::solid(1, 1, [200, 200, 200, 255]).unwrap();
        let half = ImageAsset::solid(1, 1, [128, 255, 255, 255]).unwrap();

        let mut s = Surface::new(canvas).unwrap();
        s.render(&full, &gray, CompositeMode::Normal);
        s.render(&full, &half, CompositeMode::Multiply);
        let [r, g, b, a] = s.pixel(10, 10).unwrap();
        assert!(a >= 254);
        assert!((r as i32 - 100).abs() <= 2, "red {r}");
        assert!((g as i32 - 200).abs() <= 1 && (b as i32 - 200).abs() <= 1);

        let mut s = Surface::new(canvas).unwrap();
        s.render(&full, &gray, CompositeMode::Normal);
        s.render(&full, &half, CompositeMode::Normal);
        let [r, g, _, a] = s.pixel(10, 10).unwrap();
        assert!((r as i32 - 128).abs() <= 1, "red {r}");
        assert!(g >= 254 && a >= 254);
    }

    #[test]
    fn resample_changes_size() {
        let mut s = Surface::new(CanvasSize::new(8, 4).unwrap()).unwrap();
        let blue = ImageAsset::solid(1, 1, [0, 0, 255, 255]).unwrap();
        s.render(&plan(0.0, 0.0, 8.0, 4.0, 0.0), &blue, CompositeMode::Normal);
        let big = s.resampled(16, 8).unwrap();
        assert_eq!((big.width(), big.height()), (16, 8));
        let px = big.pixel(8, 4).unwrap();
        assert!(px.blue() >= 254 && px.alpha() >= 254);
    }
}
