use standee_core::Slot;
use standee_render::ImageAsset;
use wasm_bindgen::JsCast;
use web_sys::{Document, File, HtmlInputElement};

use crate::constants::slot_input_id;

/// First file chosen in the `<input type=file>` with `id`, if any.
pub fn selected_file(document: &Document, id: &str) -> Option<File> {
    let input: HtmlInputElement = document.get_element_by_id(id)?.dyn_into().ok()?;
    input.files()?.item(0)
}

pub fn has_file(document: &Document, slot: Slot) -> bool {
    selected_file(document, slot_input_id(slot)).is_some()
}

async fn read_file_bytes(file: &File) -> Result<Vec<u8>, String> {
    let buf = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("failed to read {}: {:?}", file.name(), e))?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

/// Decode the upload for `slot`. `Ok(None)` means nothing was selected.
pub async fn load_slot(document: &Document, slot: Slot) -> Result<Option<ImageAsset>, String> {
    let Some(file) = selected_file(document, slot_input_id(slot)) else {
        return Ok(None);
    };
    let bytes = read_file_bytes(&file).await?;
    let asset = ImageAsset::decode(&bytes)
        .map_err(|e| format!("{} ({}): {e}", slot.label(), file.name()))?;
    log::debug!("{slot}: {} is {:?}", file.name(), asset.size());
    Ok(Some(asset))
}
