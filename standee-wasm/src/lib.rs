use std::cell::RefCell;
use std::rc::Rc;

use standee_core::{LayoutConfig, Preset, Slot};
use standee_render::{ExportFormat, GenerationRequest, ImageAsset, Surface, check_required};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, Window};

mod canvas;
mod constants;
mod state;
mod upload;
mod utils;

use crate::constants::*;
use crate::state::{GenerationGate, State};
use crate::utils::{asset_url, fetch_bytes, get_query_param, log};

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let search = window.location().search().unwrap_or_default();
    let level = if get_query_param(&search, "debug").is_some() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    utils::init_logging(level);

    let (canvas, ctx) = canvas::init_canvas(&document, CANVAS_ID)?;
    let config = match get_query_param(&search, "preset") {
        Some(name) => name.parse::<Preset>().unwrap_or_else(|e| {
            log(&format!("{e}; falling back to {}", Preset::PrintA4.name()));
            Preset::PrintA4
        }),
        None => Preset::PrintA4,
    }
    .config();
    canvas::sync_canvas_size(&canvas, config.canvas);

    let state = Rc::new(RefCell::new(State {
        window,
        document,
        canvas,
        ctx,
        config,
        background: None,
        gate: GenerationGate::default(),
    }));

    // A JSON config replaces the preset once it arrives.
    if let Some(url) = get_query_param(&search, "config") {
        let st = state.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = load_remote_config(&st, &url).await {
                log::error!("config '{url}': {err}");
                alert(&st.borrow().window, &format!("⚠️ Could not load config: {err}"));
            }
        });
    }

    attach_ui(state)?;
    Ok(())
}

async fn load_remote_config(state: &Rc<RefCell<State>>, url: &str) -> Result<(), String> {
    let window = state.borrow().window.clone();
    let full = asset_url(url);
    let text = utils::fetch_text(&window, &full)
        .await
        .ok_or("not found")?;
    let config = LayoutConfig::from_json(&text).map_err(|e| e.to_string())?;
    let mut s = state.borrow_mut();
    canvas::sync_canvas_size(&s.canvas, config.canvas);
    s.config = config;
    log::info!("loaded layout config from {url}");
    Ok(())
}

fn alert(window: &Window, msg: &str) {
    let _ = window.alert_with_message(msg);
}

fn on_click<F>(document: &Document, id: &str, f: F) -> Result<(), JsValue>
where
    F: FnMut() + 'static,
{
    if let Some(el) = document.get_element_by_id(id) {
        let el: HtmlElement = el.dyn_into()?;
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(f));
        el.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }
    Ok(())
}

fn attach_ui(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let doc = state.borrow().document.clone();
    attach_background_buttons(&doc, state.clone())?;

    let st = state.clone();
    on_click(&doc, GENERATE_BUTTON_ID, move || {
        let st = st.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let _ = run_generation(&st).await;
        });
    })?;

    let st = state.clone();
    on_click(&doc, DOWNLOAD_JPEG_ID, move || {
        download_fresh(st.clone(), ExportFormat::Jpeg);
    })?;

    let st = state.clone();
    on_click(&doc, DOWNLOAD_PDF_ID, move || {
        download_fresh(st.clone(), ExportFormat::Pdf);
    })?;
    Ok(())
}

// Color buttons: mark the clicked one selected, remember its background and
// regenerate right away.
fn attach_background_buttons(doc: &Document, state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let list = doc.query_selector_all(BACKGROUND_BUTTONS)?;
    let mut buttons: Vec<HtmlElement> = Vec::new();
    for i in 0..list.length() {
        if let Some(node) = list.item(i)
            && let Ok(el) = node.dyn_into::<HtmlElement>()
        {
            buttons.push(el);
        }
    }
    let buttons = Rc::new(buttons);
    for btn in buttons.iter() {
        let all = buttons.clone();
        let me = btn.clone();
        let st = state.clone();
        let onclick = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |e: web_sys::Event| {
            e.prevent_default();
            for b in all.iter() {
                let _ = b.class_list().remove_1(SELECTED_CLASS);
            }
            let _ = me.class_list().add_1(SELECTED_CLASS);
            st.borrow_mut().background = me.get_attribute("data-file");
            let st = st.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let _ = run_generation(&st).await;
            });
        }));
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }
    Ok(())
}

fn set_disabled(el: &web_sys::Element, disabled: bool) {
    let _ = if disabled {
        el.set_attribute("disabled", "")
    } else {
        el.remove_attribute("disabled")
    };
}

// Generate button and color buttons are inert while a generation runs.
fn set_controls_enabled(document: &Document, enabled: bool) {
    if let Some(btn) = document.get_element_by_id(GENERATE_BUTTON_ID) {
        set_disabled(&btn, !enabled);
    }
    if let Ok(list) = document.query_selector_all(BACKGROUND_BUTTONS) {
        for i in 0..list.length() {
            if let Some(node) = list.item(i)
                && let Ok(el) = node.dyn_into::<web_sys::Element>()
            {
                set_disabled(&el, !enabled);
            }
        }
    }
}

/// Run a generation end to end. A trigger arriving while one is in flight
/// makes the running one go again from the latest inputs once it is done.
/// Failures are alerted and nothing is drawn.
async fn run_generation(state: &Rc<RefCell<State>>) -> Option<Surface> {
    {
        let mut s = state.borrow_mut();
        if !s.gate.try_begin() {
            log::debug!("generation running; queued one more pass");
            return None;
        }
        set_controls_enabled(&s.document, false);
    }
    loop {
        let result = generate_once(state).await;
        let shown = show_result(&state.borrow(), result);
        let mut s = state.borrow_mut();
        if s.gate.finish_pass() {
            log::debug!("inputs changed during generation; running again");
            continue;
        }
        set_controls_enabled(&s.document, true);
        return shown;
    }
}

fn show_result(s: &State, result: Result<Surface, String>) -> Option<Surface> {
    match result {
        Ok(surface) => {
            if let Err(e) = canvas::blit_surface(&s.canvas, &s.ctx, &surface) {
                log(&format!("blit failed: {e:?}"));
            }
            if let Err(e) = refresh_download_link(s, &surface) {
                log(&format!("download link: {e:?}"));
            }
            Some(surface)
        }
        Err(msg) => {
            log::warn!("generation aborted: {msg}");
            alert(&s.window, &format!("⚠️ {msg}"));
            None
        }
    }
}

async fn generate_once(state: &Rc<RefCell<State>>) -> Result<Surface, String> {
    let (window, document, config, selection) = {
        let s = state.borrow();
        (
            s.window.clone(),
            s.document.clone(),
            s.config.clone(),
            s.background.clone(),
        )
    };

    check_required(&config, |slot| upload::has_file(&document, slot)).map_err(|e| e.to_string())?;

    let bg_path = config
        .resolve_background(selection.as_deref())
        .ok_or("No background selected.")?;
    let url = asset_url(&bg_path);
    let bg_bytes = fetch_bytes(&window, &url)
        .await
        .ok_or("Background image not found! Check your path.")?;
    let background = ImageAsset::decode(&bg_bytes).map_err(|e| format!("Background image: {e}"))?;

    // Both uploads resolve independently; nothing is drawn until both are in.
    let (qr, logo) = futures::future::try_join(
        upload::load_slot(&document, Slot::Qr),
        upload::load_slot(&document, Slot::Logo),
    )
    .await?;

    let request = GenerationRequest::new(background)
        .with_overlay(Slot::Qr, qr)
        .with_overlay(Slot::Logo, logo);
    standee_render::generate(&config, &request).map_err(|e| e.to_string())
}

fn refresh_download_link(state: &State, surface: &Surface) -> Result<(), JsValue> {
    let Some(link) = state.document.get_element_by_id(DOWNLOAD_LINK_ID) else {
        return Ok(());
    };
    let bytes = standee_render::encode_png(surface.pixmap())
        .map_err(|e| JsValue::from_str(&format!("encode: {e}")))?;
    if let Some(old) = link.get_attribute("href")
        && old.starts_with("blob:")
    {
        let _ = web_sys::Url::revoke_object_url(&old);
    }
    let url = utils::object_url(&bytes, ExportFormat::Png.mime())?;
    link.set_attribute("href", &url)?;
    link.set_attribute("download", &state.config.export.png_name)?;
    Ok(())
}

/// Regenerate from the current inputs, then offer the result in `format`.
fn download_fresh(state: Rc<RefCell<State>>, format: ExportFormat) {
    wasm_bindgen_futures::spawn_local(async move {
        if state.borrow().gate.is_busy() {
            log::info!("{format:?} download requested while generating");
            alert(
                &state.borrow().window,
                "⏳ Still generating, try the download again in a moment.",
            );
            return;
        }
        let Some(surface) = run_generation(&state).await else {
            return;
        };
        let s = state.borrow();
        let preset = &s.config.export;
        let result = standee_render::export(&surface, format, preset)
            .map_err(|e| JsValue::from_str(&e.to_string()))
            .and_then(|bytes| {
                utils::save_bytes_as_file(
                    &s.document,
                    format.file_name(preset),
                    format.mime(),
                    &bytes,
                )
            });
        if let Err(e) = result {
            log(&format!("export failed: {e:?}"));
            alert(&s.window, "⚠️ Export failed.");
        }
    });
}
