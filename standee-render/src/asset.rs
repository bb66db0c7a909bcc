use standee_core::{LayoutError, PixelSize};
use tiny_skia::{Color, ColorU8, Pixmap};

use crate::error::{RenderError, Result};

/// A fully decoded raster, read-only to the engine. Pixels are stored
/// premultiplied, the way tiny-skia draws them.
#[derive(Clone, Debug)]
pub struct ImageAsset {
    pixmap: Pixmap,
}

impl ImageAsset {
    /// Decode PNG/JPEG bytes, or rasterize an SVG document at its intrinsic
    /// size.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if looks_like_svg(bytes) {
            return rasterize_svg(bytes).map(ImageAsset::from_pixmap);
        }
        let img = image::load_from_memory(bytes)?;
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        log::debug!("decoded {w}x{h} raster ({} bytes)", bytes.len());
        ImageAsset::from_rgba(w, h, rgba.as_raw())
    }

    /// Build from straight (non-premultiplied) RGBA8 rows.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self> {
        let mut pixmap = alloc_asset(width, height)?;
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(RenderError::Decode(format!(
                "expected {expected} RGBA bytes for {width}x{height}, got {}",
                rgba.len()
            )));
        }
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.chunks_exact(4)) {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        Ok(ImageAsset { pixmap })
    }

    /// Single-color image; handy for placeholders and tests.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self> {
        let mut pixmap = alloc_asset(width, height)?;
        pixmap.fill(Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]));
        Ok(ImageAsset { pixmap })
    }

    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        ImageAsset { pixmap }
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.pixmap.width(), self.pixmap.height())
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

// tiny-skia refuses zero-sized pixmaps, which is exactly the invalid-asset case.
fn alloc_asset(width: u32, height: u32) -> Result<Pixmap> {
    if width == 0 || height == 0 {
        return Err(LayoutError::InvalidAsset { width, height }.into());
    }
    Pixmap::new(width, height).ok_or(RenderError::Alloc { width, height })
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

fn rasterize_svg(bytes: &[u8]) -> Result<Pixmap> {
    // No fonts are loaded: backgrounds are expected to carry outlined text.
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opt).map_err(|e| RenderError::Svg(format!("{e:?}")))?;
    let size = tree.size().to_int_size();
    let mut pixmap = alloc_asset(size.width(), size.height())?;
    let mut pm = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pm);
    log::debug!("rasterized SVG at {}x{}", size.width(), size.height());
    Ok(pixmap)
}
