use standee_core::Slot;

/// DOM ids and selectors the host page provides.
pub const CANVAS_ID: &str = "canvas";
pub const QR_INPUT_ID: &str = "UploadQR";
pub const LOGO_INPUT_ID: &str = "companyLogo";
pub const GENERATE_BUTTON_ID: &str = "generateButton";
/// Anchor refreshed with a PNG of every finished generation.
pub const DOWNLOAD_LINK_ID: &str = "downloadLink";
pub const DOWNLOAD_JPEG_ID: &str = "downloadStandee";
pub const DOWNLOAD_PDF_ID: &str = "downloadPDF";
/// Background picker buttons; each carries a `data-file` catalog id or path.
pub const BACKGROUND_BUTTONS: &str = ".controls button";
pub const SELECTED_CLASS: &str = "selected";

pub fn slot_input_id(slot: Slot) -> &'static str {
    match slot {
        Slot::Qr => QR_INPUT_ID,
        Slot::Logo => LOGO_INPUT_ID,
    }
}
