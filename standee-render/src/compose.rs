use std::collections::BTreeMap;

use serde::Serialize;
use standee_core::{
    CompositeMode, DrawPlan, LayoutConfig, Slot, compute_background_plan, compute_draw_plan,
};

use crate::asset::ImageAsset;
use crate::error::{RenderError, Result};
use crate::surface::Surface;

/// Inputs of one "generate" action. Built fresh for every call.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub background: ImageAsset,
    pub overlays: BTreeMap<Slot, ImageAsset>,
}

impl GenerationRequest {
    pub fn new(background: ImageAsset) -> Self {
        GenerationRequest {
            background,
            overlays: BTreeMap::new(),
        }
    }

    /// Attach the asset for `slot`; `None` leaves the slot empty.
    pub fn with_overlay(mut self, slot: Slot, asset: Option<ImageAsset>) -> Self {
        match asset {
            Some(a) => {
                self.overlays.insert(slot, a);
            }
            None => {
                self.overlays.remove(&slot);
            }
        }
        self
    }

    pub fn overlay(&self, slot: Slot) -> Option<&ImageAsset> {
        self.overlays.get(&slot)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Background,
    Qr,
    Logo,
}

impl From<Slot> for Layer {
    fn from(s: Slot) -> Self {
        match s {
            Slot::Qr => Layer::Qr,
            Slot::Logo => Layer::Logo,
        }
    }
}

/// One draw call of a generation, in z-order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlannedDraw {
    pub layer: Layer,
    pub plan: DrawPlan,
    pub mode: CompositeMode,
}

/// Fail with `MissingUpload` for the first required slot `present` says is
/// empty, logo before QR. Front ends call this before loading anything.
pub fn check_required(config: &LayoutConfig, present: impl Fn(Slot) -> bool) -> Result<()> {
    for slot in Slot::CHECK_ORDER {
        if config.is_required(slot) && !present(slot) {
            return Err(RenderError::MissingUpload(slot));
        }
    }
    Ok(())
}

/// Every draw `compose` would issue, background first. Slots without an
/// asset are left out.
pub fn plan_generation(
    config: &LayoutConfig,
    request: &GenerationRequest,
) -> Result<Vec<PlannedDraw>> {
    let canvas = config.canvas;
    let mut draws = Vec::with_capacity(1 + Slot::DRAW_ORDER.len());
    draws.push(PlannedDraw {
        layer: Layer::Background,
        plan: compute_background_plan(config.background_fit, request.background.size(), canvas)?,
        mode: CompositeMode::Normal,
    });
    for slot in Slot::DRAW_ORDER {
        let Some(asset) = request.overlay(slot) else {
            log::debug!("{slot}: no asset, skipped");
            continue;
        };
        let spec = config.overlay(slot);
        let plan = compute_draw_plan(spec, asset.size(), canvas)?;
        log::debug!(
            "{slot}: {:.2}x{:.2} at ({:.2}, {:.2}) rot {:.4} rad",
            plan.draw_width,
            plan.draw_height,
            plan.x,
            plan.y,
            plan.rotation_radians
        );
        draws.push(PlannedDraw {
            layer: slot.into(),
            plan,
            mode: spec.composite_mode,
        });
    }
    Ok(draws)
}

/// Draw background, QR and logo onto a fresh surface. All plans are computed
/// before the first pixel is touched, so an invalid asset draws nothing.
pub fn compose(config: &LayoutConfig, request: &GenerationRequest) -> Result<Surface> {
    let draws = plan_generation(config, request)?;
    let mut surface = Surface::new(config.canvas)?;
    for d in &draws {
        let asset = match d.layer {
            Layer::Background => &request.background,
            Layer::Qr => request.overlay(Slot::Qr).ok_or(RenderError::MissingUpload(Slot::Qr))?,
            Layer::Logo => request
                .overlay(Slot::Logo)
                .ok_or(RenderError::MissingUpload(Slot::Logo))?,
        };
        surface.render(&d.plan, asset, d.mode);
    }
    log::info!(
        "composed {}x{} surface with {} layer(s)",
        config.canvas.width,
        config.canvas.height,
        draws.len()
    );
    Ok(surface)
}

/// `compose`, after checking that every required slot has an asset.
pub fn generate(config: &LayoutConfig, request: &GenerationRequest) -> Result<Surface> {
    check_required(config, |slot| request.overlay(slot).is_some())?;
    compose(config, request)
}
