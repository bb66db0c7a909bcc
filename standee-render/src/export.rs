use std::path::Path;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref};
use png::{BitDepth, ColorType, Encoder};
use standee_core::{ExportPreset, LayoutError, PageSize};
use tiny_skia::Pixmap;

use crate::error::{RenderError, Result};
use crate::surface::{Surface, demultiplied_rgba};

/// PDF points per CSS pixel (72 / 96).
const PT_PER_PX: f32 = 0.75;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Pdf,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// Download name configured for this format.
    pub fn file_name(self, preset: &ExportPreset) -> &str {
        match self {
            ExportFormat::Png => &preset.png_name,
            ExportFormat::Jpeg => &preset.jpeg_name,
            ExportFormat::Pdf => &preset.pdf_name,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = LayoutError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(LayoutError::InvalidConfig(format!(
                "unknown export format '{other}'"
            ))),
        }
    }
}

// Shared PNG encoder: RGBA -> PNG bytes (deterministic for same input)
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>> {
    let rgba = demultiplied_rgba(pixmap);
    let mut buf = Vec::new();
    {
        let mut enc = Encoder::new(&mut buf, pixmap.width(), pixmap.height());
        enc.set_color(ColorType::Rgba);
        enc.set_depth(BitDepth::Eight);
        let mut writer = enc.write_header()?;
        writer.write_image_data(&rgba)?;
    }
    Ok(buf)
}

/// RGB8 JPEG. Transparent areas are flattened onto white.
pub fn encode_jpeg(pixmap: &Pixmap, quality: u8) -> Result<Vec<u8>> {
    let rgb = flatten_on_white(pixmap);
    let mut buf = Vec::new();
    {
        let mut enc = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
        enc.encode(&rgb, pixmap.width(), pixmap.height(), image::ColorType::Rgb8)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
    }
    Ok(buf)
}

/// Single-page PDF whose page is covered by the surface, resampled to the
/// page's pixel size and embedded as a JPEG.
pub fn encode_pdf(surface: &Surface, page: PageSize, quality: u8) -> Result<Vec<u8>> {
    let (w_px, h_px) = page.pixels(surface.canvas());
    let pixmap = surface.resampled(w_px, h_px)?;
    let jpeg = encode_jpeg(&pixmap, quality)?;

    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let image_id = Ref::new(4);
    let content_id = Ref::new(5);
    let image_name = Name(b"Im1");
    let (w_pt, h_pt) = (w_px as f32 * PT_PER_PX, h_px as f32 * PT_PER_PX);

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);
    {
        let mut pg = pdf.page(page_id);
        pg.media_box(Rect::new(0.0, 0.0, w_pt, h_pt));
        pg.parent(page_tree_id);
        pg.contents(content_id);
        pg.resources().x_objects().pair(image_name, image_id);
    }
    {
        let mut xobject = pdf.image_xobject(image_id, &jpeg);
        xobject.filter(Filter::DctDecode);
        xobject.width(w_px as i32);
        xobject.height(h_px as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
    }
    let mut content = Content::new();
    content.save_state();
    content.transform([w_pt, 0.0, 0.0, h_pt, 0.0, 0.0]);
    content.x_object(image_name);
    content.restore_state();
    pdf.stream(content_id, &content.finish());

    log::info!("pdf page {w_px}x{h_px} px ({w_pt}x{h_pt} pt), jpeg {} bytes", jpeg.len());
    Ok(pdf.finish())
}

/// Encode the surface in `format` using the preset's quality and page size.
pub fn export(surface: &Surface, format: ExportFormat, preset: &ExportPreset) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Png => encode_png(surface.pixmap()),
        ExportFormat::Jpeg => encode_jpeg(surface.pixmap(), preset.jpeg_quality),
        ExportFormat::Pdf => encode_pdf(surface, preset.pdf_page, preset.jpeg_quality),
    }
}

fn flatten_on_white(pixmap: &Pixmap) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(pixmap.width() as usize * pixmap.height() as usize * 3);
    for p in pixmap.pixels() {
        // premultiplied source over opaque white
        let back = 255 - p.alpha();
        rgb.extend_from_slice(&[p.red() + back, p.green() + back, p.blue() + back]);
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(
            ExportFormat::from_path(Path::new("out/Standee.JPG")),
            Some(ExportFormat::Jpeg)
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("a.pdf")),
            Some(ExportFormat::Pdf)
        );
        assert_eq!(ExportFormat::from_path(Path::new("a.gif")), None);
        assert_eq!(ExportFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn transparent_flattens_to_white() {
        let pm = Pixmap::new(2, 1).unwrap();
        assert_eq!(flatten_on_white(&pm), vec![255; 6]);
    }

    #[test]
    fn file_names_follow_preset() {
        let preset = ExportPreset::default();
        assert_eq!(ExportFormat::Png.file_name(&preset), "OfferImage.png");
        assert_eq!(ExportFormat::Pdf.mime(), "application/pdf");
    }
}
