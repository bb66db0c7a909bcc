use standee_core::CanvasSize;
use standee_render::Surface;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, ImageData};

pub fn init_canvas(
    document: &Document,
    id: &str,
) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let cv = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("canvas #{id} not found")))?
        .dyn_into::<HtmlCanvasElement>()?;
    let ctx = cv
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D context not available"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    Ok((cv, ctx))
}

/// Match the canvas backing store to the generation size.
pub fn sync_canvas_size(canvas: &HtmlCanvasElement, size: CanvasSize) {
    if canvas.width() != size.width {
        canvas.set_width(size.width);
    }
    if canvas.height() != size.height {
        canvas.set_height(size.height);
    }
}

/// Copy a finished surface onto the page canvas.
pub fn blit_surface(
    canvas: &HtmlCanvasElement,
    ctx: &CanvasRenderingContext2d,
    surface: &Surface,
) -> Result<(), JsValue> {
    let size = surface.canvas();
    sync_canvas_size(canvas, size);
    let rgba = surface.to_rgba();
    let img = ImageData::new_with_u8_clamped_array_and_sh(Clamped(rgba.as_slice()), size.width, size.height)?;
    ctx.put_image_data(&img, 0.0, 0.0)
}
