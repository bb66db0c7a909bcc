//! Export encoders: PNG, JPEG and single-page PDF.

use standee_core::{CanvasSize, ExportPreset, PageSize, PixelSize, Preset, Slot};
use standee_render::{
    ExportFormat, GenerationRequest, ImageAsset, Surface, encode_jpeg, encode_pdf, encode_png,
    export, generate,
};

fn small_surface() -> Surface {
    let mut cfg = Preset::Native.config();
    cfg.canvas = CanvasSize::new(40, 50).unwrap();
    let req = GenerationRequest::new(ImageAsset::solid(4, 5, [10, 120, 200, 255]).unwrap())
        .with_overlay(Slot::Qr, Some(ImageAsset::solid(8, 8, [0, 0, 0, 255]).unwrap()))
        .with_overlay(Slot::Logo, Some(ImageAsset::solid(6, 2, [255, 0, 0, 255]).unwrap()));
    generate(&cfg, &req).unwrap()
}

fn find(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[test]
fn png_decodes_back_to_canvas_size() {
    let s = small_surface();
    let bytes = encode_png(s.pixmap()).unwrap();
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    let back = ImageAsset::decode(&bytes).unwrap();
    assert_eq!(back.size(), PixelSize::new(40, 50));
}

#[test]
fn png_is_deterministic() {
    let s = small_surface();
    assert_eq!(encode_png(s.pixmap()).unwrap(), encode_png(s.pixmap()).unwrap());
}

#[test]
fn jpeg_has_markers_and_decodes() {
    let s = small_surface();
    let bytes = encode_jpeg(s.pixmap(), 98).unwrap();
    assert!(bytes.starts_with(&[0xFF, 0xD8]));
    assert!(bytes.ends_with(&[0xFF, 0xD9]));
    let back = ImageAsset::decode(&bytes).unwrap();
    assert_eq!(back.size(), PixelSize::new(40, 50));
}

#[test]
fn lower_quality_gives_smaller_jpeg() {
    let s = small_surface();
    let hi = encode_jpeg(s.pixmap(), 98).unwrap();
    let lo = encode_jpeg(s.pixmap(), 10).unwrap();
    assert!(lo.len() < hi.len());
}

#[test]
fn pdf_embeds_one_jpeg_page() {
    let s = small_surface();
    let bytes = encode_pdf(&s, PageSize::Native, 90).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(find(&bytes, b"/DCTDecode"));
    assert!(find(&bytes, b"/Im1"));
    // 40x50 px at 0.75 pt/px
    assert!(find(&bytes, b"/MediaBox"));
    assert!(find(&bytes, b"37.5"));
}

#[test]
fn pdf_page_size_is_configurable() {
    let s = small_surface();
    let page = PageSize::Pixels {
        width: 80,
        height: 100,
    };
    let bytes = encode_pdf(&s, page, 90).unwrap();
    assert!(find(&bytes, b"/MediaBox"));
    assert!(find(&bytes, b" 75]"));
    assert!(find(&bytes, b"/Width 80"));
    assert!(find(&bytes, b"/Height 100"));
}

#[test]
fn export_dispatches_on_format() {
    let s = small_surface();
    let preset = ExportPreset::default();
    assert!(export(&s, ExportFormat::Png, &preset).unwrap().starts_with(b"\x89PNG"));
    assert!(export(&s, ExportFormat::Jpeg, &preset).unwrap().starts_with(&[0xFF, 0xD8]));
    assert!(export(&s, ExportFormat::Pdf, &preset).unwrap().starts_with(b"%PDF"));
}

#[test]
fn format_names_parse() {
    assert_eq!("JPG".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
    assert!("tiff".parse::<ExportFormat>().is_err());
}
