use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use standee_core::{LayoutConfig, PageSize, Preset, Slot};
use standee_render::{
    ExportFormat, GenerationRequest, ImageAsset, RenderError, check_required, export, generate,
    plan_generation,
};

/// Compose a QR code and a company logo onto a standee background and export
/// it as PNG, JPEG or PDF.
#[derive(Parser, Debug)]
#[command(name = "standee", version)]
struct Args {
    /// Built-in variant: print-a4, screen-a4 or native.
    #[arg(long, default_value = "print-a4")]
    preset: String,

    /// JSON layout config; replaces the preset.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Background catalog id (e.g. rgb-02) or image path.
    #[arg(long, short)]
    background: Option<String>,

    /// Directory that relative background paths are resolved against.
    #[arg(long, default_value = ".")]
    assets_dir: PathBuf,

    #[arg(long)]
    qr: Option<PathBuf>,

    #[arg(long)]
    logo: Option<PathBuf>,

    /// Output file; repeat for several formats. Format follows the extension.
    #[arg(long = "out", short)]
    outputs: Vec<PathBuf>,

    /// Force the output format (png, jpg, pdf) for every --out.
    #[arg(long)]
    format: Option<String>,

    /// JPEG quality 1-100 (also used for the image inside PDFs).
    #[arg(long)]
    quality: Option<u8>,

    /// PDF page: "native" or WIDTHxHEIGHT in pixels at 96 DPI.
    #[arg(long)]
    page: Option<String>,

    /// Print the computed draw plans as JSON.
    #[arg(long)]
    dump_plan: bool,

    /// Print the effective layout config as JSON.
    #[arg(long)]
    print_config: bool,

    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    if let Err(e) = run(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    if args.print_config {
        println!("{}", config.to_json_pretty()?);
    }
    if args.outputs.is_empty() && !args.dump_plan {
        if args.print_config {
            return Ok(());
        }
        return Err("nothing to do: pass --out <file> or --dump-plan".into());
    }

    // Refuse before touching any file, like the upload form does.
    check_required(&config, |slot| slot_path(args, slot).is_some())?;

    let bg_path = config
        .resolve_background(args.background.as_deref())
        .ok_or("no background selected and the config has no default")?;
    let bg_path = args.assets_dir.join(bg_path);
    let background = load_asset(&bg_path)
        .map_err(|e| format!("background image not found or unreadable ({}): {e}", bg_path.display()))?;

    let mut request = GenerationRequest::new(background);
    for slot in Slot::DRAW_ORDER {
        let asset = match slot_path(args, slot) {
            Some(p) => Some(load_asset(p).map_err(|e| format!("{slot} ({}): {e}", p.display()))?),
            None => None,
        };
        request = request.with_overlay(slot, asset);
    }

    if args.dump_plan {
        let draws = plan_generation(&config, &request)?;
        println!("{}", serde_json::to_string_pretty(&draws)?);
    }
    if args.outputs.is_empty() {
        return Ok(());
    }

    let surface = generate(&config, &request)?;
    for out in &args.outputs {
        let format = output_format(args.format.as_deref(), out)?;
        let bytes = export(&surface, format, &config.export)?;
        fs::write(out, &bytes)?;
        log::info!("wrote {} ({} bytes)", out.display(), bytes.len());
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<LayoutConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            let txt = fs::read_to_string(path)?;
            LayoutConfig::from_json(&txt)?
        }
        None => args.preset.parse::<Preset>()?.config(),
    };
    if let Some(q) = args.quality {
        config.export.jpeg_quality = q;
    }
    if let Some(p) = &args.page {
        config.export.pdf_page = p.parse::<PageSize>()?;
    }
    config.validate()?;
    Ok(config)
}

fn slot_path(args: &Args, slot: Slot) -> Option<&Path> {
    match slot {
        Slot::Qr => args.qr.as_deref(),
        Slot::Logo => args.logo.as_deref(),
    }
}

fn load_asset(path: &Path) -> Result<ImageAsset, RenderError> {
    let bytes = fs::read(path)?;
    ImageAsset::decode(&bytes)
}

fn output_format(forced: Option<&str>, out: &Path) -> Result<ExportFormat, Box<dyn std::error::Error>> {
    if let Some(f) = forced {
        return Ok(f.parse()?);
    }
    ExportFormat::from_path(out).ok_or_else(|| {
        format!(
            "cannot tell the format of {}; use .png, .jpg or .pdf or pass --format",
            out.display()
        )
        .into()
    })
}
