use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::layout::{BackgroundFit, CanvasSize, CompositeMode, OverlaySpec, Region, Slot};

/// Target page of a PDF export. Pixel sizes are taken at 96 DPI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// Same pixel size as the canvas.
    #[default]
    Native,
    Pixels { width: u32, height: u32 },
}

impl PageSize {
    /// A4 portrait at 96 DPI.
    pub const A4_96DPI: PageSize = PageSize::Pixels {
        width: 794,
        height: 1123,
    };
    /// A4 portrait at 600 DPI.
    pub const A4_600DPI: PageSize = PageSize::Pixels {
        width: 4960,
        height: 7016,
    };

    /// Page size in pixels for a surface of `canvas` size.
    pub fn pixels(&self, canvas: CanvasSize) -> (u32, u32) {
        match *self {
            PageSize::Native => (canvas.width, canvas.height),
            PageSize::Pixels { width, height } => (width, height),
        }
    }
}

impl FromStr for PageSize {
    type Err = LayoutError;

    /// Accepts `native` or `WIDTHxHEIGHT`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("native") {
            return Ok(PageSize::Native);
        }
        let bad = || LayoutError::InvalidConfig(format!("page size '{s}' is not 'native' or WxH"));
        let (w, h) = s.split_once(['x', 'X']).ok_or_else(bad)?;
        let width: u32 = w.trim().parse().map_err(|_| bad())?;
        let height: u32 = h.trim().parse().map_err(|_| bad())?;
        Ok(PageSize::Pixels { width, height })
    }
}

/// Export settings for one variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPreset {
    /// JPEG quality, 1..=100. Also used for the image embedded in PDFs.
    pub jpeg_quality: u8,
    #[serde(default)]
    pub pdf_page: PageSize,
    pub png_name: String,
    pub jpeg_name: String,
    pub pdf_name: String,
}

impl Default for ExportPreset {
    fn default() -> Self {
        ExportPreset {
            jpeg_quality: 98,
            pdf_page: PageSize::Native,
            png_name: "OfferImage.png".to_string(),
            jpeg_name: "Standee_A4_HQ.jpg".to_string(),
            pdf_name: "Standee_A4_UltraQuality.pdf".to_string(),
        }
    }
}

fn default_required() -> Vec<Slot> {
    Slot::DRAW_ORDER.to_vec()
}

/// Everything one generator variant needs: canvas, slot placements,
/// background catalog and export presets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub canvas: CanvasSize,
    #[serde(default)]
    pub background_fit: BackgroundFit,
    pub qr: OverlaySpec,
    pub logo: OverlaySpec,
    /// Slots that must have an asset before anything is drawn.
    #[serde(default = "default_required")]
    pub required: Vec<Slot>,
    /// Background id -> image path.
    #[serde(default)]
    pub backgrounds: BTreeMap<String, String>,
    #[serde(default)]
    pub default_background: Option<String>,
    #[serde(default)]
    pub export: ExportPreset,
}

impl LayoutConfig {
    pub fn overlay(&self, slot: Slot) -> &OverlaySpec {
        match slot {
            Slot::Qr => &self.qr,
            Slot::Logo => &self.logo,
        }
    }

    pub fn is_required(&self, slot: Slot) -> bool {
        self.required.contains(&slot)
    }

    pub fn validate(&self) -> Result<()> {
        CanvasSize::new(self.canvas.width, self.canvas.height)?;
        for slot in Slot::DRAW_ORDER {
            self.overlay(slot).validate()?;
        }
        let q = self.export.jpeg_quality;
        if !(1..=100).contains(&q) {
            return Err(LayoutError::InvalidConfig(format!(
                "jpeg_quality must be 1..=100, got {q}"
            )));
        }
        if let PageSize::Pixels { width, height } = self.export.pdf_page
            && (width == 0 || height == 0)
        {
            return Err(LayoutError::InvalidConfig(format!(
                "pdf page {width}x{height} has a zero dimension"
            )));
        }
        if let Some(id) = &self.default_background
            && !self.backgrounds.contains_key(id)
        {
            return Err(LayoutError::InvalidConfig(format!(
                "default background '{id}' is not in the catalog"
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json(text: &str) -> Result<Self> {
        let cfg: LayoutConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Map a background selection to an image path. Catalog ids win; any
    /// other value is taken as a path. `None` picks the default background.
    pub fn resolve_background(&self, selection: Option<&str>) -> Option<String> {
        match selection {
            Some(sel) => Some(
                self.backgrounds
                    .get(sel)
                    .cloned()
                    .unwrap_or_else(|| sel.to_string()),
            ),
            None => self
                .default_background
                .as_ref()
                .and_then(|id| self.backgrounds.get(id).cloned()),
        }
    }
}

/// Built-in generator variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// Full A4 at 600 DPI for print.
    PrintA4,
    /// Small canvas, PDF pages at A4 96 DPI.
    ScreenA4,
    /// Small canvas, PDF pages at canvas size.
    Native,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::PrintA4, Preset::ScreenA4, Preset::Native];

    pub fn name(self) -> &'static str {
        match self {
            Preset::PrintA4 => "print-a4",
            Preset::ScreenA4 => "screen-a4",
            Preset::Native => "native",
        }
    }

    pub fn config(self) -> LayoutConfig {
        let (canvas, qr_region, pdf_page) = match self {
            Preset::PrintA4 => (
                CanvasSize {
                    width: 4960,
                    height: 7016,
                },
                // 0.33 + 0.024 nudges the QR right into the phone screen.
                Region::new(0.354, 0.34, 0.37, 0.33),
                PageSize::A4_600DPI,
            ),
            Preset::ScreenA4 => (
                CanvasSize {
                    width: 800,
                    height: 1000,
                },
                Region::new(0.325, 0.32, 0.37, 0.33),
                PageSize::A4_96DPI,
            ),
            Preset::Native => (
                CanvasSize {
                    width: 800,
                    height: 1000,
                },
                Region::new(0.325, 0.32, 0.37, 0.33),
                PageSize::Native,
            ),
        };
        let backgrounds = (1..=4)
            .map(|i| (format!("rgb-{i:02}"), format!("images/rgb-{i:02}.jpg")))
            .collect();
        LayoutConfig {
            canvas,
            background_fit: BackgroundFit::Stretch,
            qr: OverlaySpec {
                region: qr_region,
                padding_factor: 0.98,
                rotation_degrees: -5.0,
                composite_mode: CompositeMode::Multiply,
            },
            logo: OverlaySpec {
                region: Region::new(0.07, 0.86, 0.40, 0.12),
                padding_factor: 0.85,
                rotation_degrees: 0.0,
                composite_mode: CompositeMode::Normal,
            },
            required: default_required(),
            backgrounds,
            default_background: Some("rgb-01".to_string()),
            export: ExportPreset {
                pdf_page,
                ..ExportPreset::default()
            },
        }
    }
}

impl FromStr for Preset {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LayoutError::UnknownPreset(s.to_string()))
    }
}
