//! Geometry properties of the layout engine: containment, centering,
//! determinism and the reference QR scenario.

use pretty_assertions::assert_eq;
use standee_core::{
    AbsoluteRect, CanvasSize, CompositeMode, LayoutError, OverlaySpec, PixelSize, Preset, Region,
    compute_centered_placement, compute_draw_plan, compute_fit_scale, resolve_region,
};

const EPS: f64 = 1e-9;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// Fit containment

#[test]
fn scaled_content_never_exceeds_box() {
    let assets = [(1, 1), (200, 200), (640, 120), (90, 1600), (3, 7), (4960, 7016)];
    let boxes = [(296.0, 330.0), (10.0, 1000.0), (1000.0, 10.0), (0.5, 0.5)];
    let paddings = [1.0, 0.98, 0.85, 0.5, 0.01];
    for (w, h) in assets {
        for (bw, bh) in boxes {
            for p in paddings {
                let s = compute_fit_scale(PixelSize::new(w, h), bw, bh, p).unwrap();
                let cw = w as f64 * s;
                let ch = h as f64 * s;
                assert!(cw <= bw + EPS, "{w}x{h} in {bw}x{bh} p={p}: width {cw}");
                assert!(ch <= bh + EPS, "{w}x{h} in {bw}x{bh} p={p}: height {ch}");
                if p == 1.0 {
                    assert!(
                        close(cw, bw) || close(ch, bh),
                        "{w}x{h} in {bw}x{bh}: no axis touches at p=1 ({cw}x{ch})"
                    );
                }
            }
        }
    }
}

#[test]
fn zero_dimension_asset_is_reported() {
    for size in [PixelSize::new(0, 0), PixelSize::new(10, 0)] {
        let err = compute_fit_scale(size, 100.0, 100.0, 1.0).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidAsset { .. }));
    }
}

// Centering

#[test]
fn centered_content_stays_inside_box() {
    let bx = AbsoluteRect {
        x: 260.0,
        y: 320.0,
        w: 296.0,
        h: 330.0,
    };
    for (cw, ch) in [(296.0, 330.0), (290.08, 290.08), (1.0, 330.0), (0.0, 0.0)] {
        let p = compute_centered_placement(&bx, cw, ch);
        assert!(bx.x <= p.x && p.x + cw <= bx.right() + EPS);
        assert!(bx.y <= p.y && p.y + ch <= bx.bottom() + EPS);
        // equal slack on both sides
        assert!(close(p.x - bx.x, bx.right() - (p.x + cw)));
        assert!(close(p.y - bx.y, bx.bottom() - (p.y + ch)));
    }
}

// Determinism

#[test]
fn draw_plan_is_bit_identical_across_calls() {
    let cfg = Preset::PrintA4.config();
    let asset = PixelSize::new(1234, 567);
    let a = compute_draw_plan(&cfg.qr, asset, cfg.canvas).unwrap();
    let b = compute_draw_plan(&cfg.qr, asset, cfg.canvas).unwrap();
    assert_eq!(a.x.to_bits(), b.x.to_bits());
    assert_eq!(a.y.to_bits(), b.y.to_bits());
    assert_eq!(a.draw_width.to_bits(), b.draw_width.to_bits());
    assert_eq!(a.draw_height.to_bits(), b.draw_height.to_bits());
    assert_eq!(a.rotation_radians.to_bits(), b.rotation_radians.to_bits());
}

// Reference scenario

#[test]
fn qr_scenario_on_800_by_1000_canvas() {
    let canvas = CanvasSize::new(800, 1000).unwrap();
    let qr = OverlaySpec {
        region: Region::new(0.325, 0.32, 0.37, 0.33),
        padding_factor: 0.98,
        rotation_degrees: -5.0,
        composite_mode: CompositeMode::Multiply,
    };

    let bx = resolve_region(&qr.region, canvas);
    assert!(close(bx.x, 260.0) && close(bx.y, 320.0));
    assert!(close(bx.w, 296.0) && close(bx.h, 330.0));

    let scale = compute_fit_scale(PixelSize::new(200, 200), bx.w, bx.h, 0.98).unwrap();
    assert!(close(scale, 1.4504), "scale {scale}");

    let plan = compute_draw_plan(&qr, PixelSize::new(200, 200), canvas).unwrap();
    assert!(close(plan.draw_width, 290.08));
    assert!(close(plan.draw_height, 290.08));
    assert!(close(plan.x, 262.96), "x {}", plan.x);
    assert!(close(plan.y, 339.96), "y {}", plan.y);
    let c = plan.center();
    assert!(close(c.x, 260.0 + 296.0 / 2.0));
    assert!(close(c.y, 320.0 + 330.0 / 2.0));
}

#[test]
fn screen_preset_matches_scenario_box() {
    let cfg = Preset::ScreenA4.config();
    let bx = resolve_region(&cfg.qr.region, cfg.canvas);
    assert!(close(bx.x, 260.0) && close(bx.w, 296.0));
    assert!(close(bx.y, 320.0) && close(bx.h, 330.0));
}

#[test]
fn logo_fits_wide_box_by_height() {
    let cfg = Preset::PrintA4.config();
    let plan = compute_draw_plan(&cfg.logo, PixelSize::new(400, 400), cfg.canvas).unwrap();
    let bx = resolve_region(&cfg.logo.region, cfg.canvas);
    // box is wider than tall, a square logo is limited by height
    assert!(close(plan.draw_height, bx.h * 0.85));
    assert!(close(plan.draw_width, plan.draw_height));
    assert_eq!(plan.rotation_radians, 0.0);
}

// Config files

#[test]
fn config_json_round_trips_through_validation() {
    let cfg = Preset::ScreenA4.config();
    let text = cfg.to_json_pretty().unwrap();
    let back = standee_core::LayoutConfig::from_json(&text).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn minimal_config_fills_defaults() {
    let text = r#"{
        "canvas": { "width": 100, "height": 200 },
        "qr":   { "region": { "x_frac": 0.1, "y_frac": 0.1, "w_frac": 0.5, "h_frac": 0.5 },
                  "padding_factor": 0.9, "composite_mode": "multiply" },
        "logo": { "region": { "x_frac": 0.1, "y_frac": 0.7, "w_frac": 0.5, "h_frac": 0.2 },
                  "padding_factor": 1.0 }
    }"#;
    let cfg = standee_core::LayoutConfig::from_json(text).unwrap();
    assert_eq!(cfg.required.len(), 2);
    assert_eq!(cfg.logo.composite_mode, CompositeMode::Normal);
    assert_eq!(cfg.export.jpeg_quality, 98);
    assert_eq!(cfg.resolve_background(None), None);
}

#[test]
fn config_with_negative_padding_is_rejected() {
    let text = r#"{
        "canvas": { "width": 100, "height": 200 },
        "qr":   { "region": { "x_frac": 0, "y_frac": 0, "w_frac": 1, "h_frac": 1 },
                  "padding_factor": -0.5 },
        "logo": { "region": { "x_frac": 0, "y_frac": 0, "w_frac": 1, "h_frac": 1 },
                  "padding_factor": 1.0 }
    }"#;
    let err = standee_core::LayoutConfig::from_json(text).unwrap_err();
    assert!(matches!(err, LayoutError::InvalidPadding(_)));
}
