use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};

use plananchor::{
    Anchor, FsPlanStore, Letterbox, PixelPos, PlanConfig, PlanId, PlanRenderer, PlanStore,
    PlanView, Viewport, anchor_to_pixel, is_anchor_set, pixel_to_anchor,
};

#[derive(Parser)]
#[command(name = "plananchor")]
#[command(about = "Render site plans and map anchor points between viewports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Args, Clone, Copy)]
struct ViewportArgs {
    /// Viewport width in pixels (defaults to the configured preview size)
    #[arg(long)]
    width: Option<u32>,

    /// Viewport height in pixels (defaults to the configured preview size)
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a plan into a PNG, with markers for the given anchors
    Render {
        /// Plan file (.pdf renders the first page, anything else is decoded as an image)
        plan: PathBuf,

        #[command(flatten)]
        viewport: ViewportArgs,

        /// Anchor as "x,y" fractions of the viewport (repeatable)
        #[arg(long = "anchor", value_parser = parse_anchor)]
        anchors: Vec<Anchor>,

        /// Stored anchor record as JSON, e.g. '{"x":0.5,"y":0.5}' (repeatable)
        #[arg(long = "record")]
        records: Vec<String>,

        /// Output PNG path
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Convert a click position to a normalized anchor
    Pick {
        #[command(flatten)]
        viewport: ViewportArgs,

        /// Horizontal click position in pixels
        #[arg(allow_negative_numbers = true)]
        px: f64,

        /// Vertical click position in pixels
        #[arg(allow_negative_numbers = true)]
        py: f64,
    },

    /// Convert a normalized anchor to a pixel position
    Locate {
        #[command(flatten)]
        viewport: ViewportArgs,

        /// Anchor x as a fraction of the viewport width
        x: f64,

        /// Anchor y as a fraction of the viewport height
        y: f64,
    },

    /// Print where a plan lands inside a viewport
    Fit {
        /// Plan file
        plan: PathBuf,

        #[command(flatten)]
        viewport: ViewportArgs,
    },
}

fn parse_anchor(s: &str) -> Result<Anchor, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got {s:?}"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x in {s:?}: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y in {s:?}: {e}"))?;
    Ok(Anchor::new(x, y))
}

fn resolve_viewport(args: ViewportArgs, config: &PlanConfig) -> Result<Viewport> {
    let (default_w, default_h) = config.preview_viewport;
    let width = args.width.unwrap_or(default_w);
    let height = args.height.unwrap_or(default_h);
    Viewport::try_new(width, height)
        .ok_or_else(|| anyhow!("viewport must be at least 1x1, got {width}x{height}"))
}

/// Split a plan path into a file store rooted at its directory and an id
fn open_plan_store(plan: &Path) -> Result<(FsPlanStore, PlanId)> {
    let name = plan
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("not a plan file: {}", plan.display()))?;
    let root = match plan.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((FsPlanStore::new(root), PlanId::new(name)))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => PlanConfig::load_from(path),
        None => PlanConfig::load(),
    };

    match cli.command {
        Commands::Render {
            plan,
            viewport,
            anchors,
            records,
            out,
        } => {
            let viewport = resolve_viewport(viewport, &config)?;
            let (store, id) = open_plan_store(&plan)?;
            let source = store.fetch(&id).await?;

            let mut all: Vec<Option<Anchor>> = anchors.into_iter().map(Some).collect();
            for record in &records {
                let value: serde_json::Value = serde_json::from_str(record)
                    .with_context(|| format!("invalid anchor record {record:?}"))?;
                let anchor = Anchor::from_value(&value);
                if !is_anchor_set(anchor.as_ref()) {
                    log::info!("Anchor record {record} is not set, skipping marker");
                }
                all.push(anchor);
            }

            let renderer = PlanRenderer::from_config(&config);
            let mut view = PlanView::new(source, viewport);
            view.refresh(&renderer)
                .await
                .with_context(|| format!("could not render {}", plan.display()))?;

            let Some(bitmap) = view.compose(&all, &config.marker) else {
                bail!("render of {} was superseded", plan.display());
            };
            bitmap
                .save(&out)
                .with_context(|| format!("could not write {}", out.display()))?;
            log::info!(
                "Wrote {}x{} plan to {}",
                viewport.width(),
                viewport.height(),
                out.display()
            );
        }
        Commands::Pick { viewport, px, py } => {
            let viewport = resolve_viewport(viewport, &config)?;
            print_json(&pixel_to_anchor(PixelPos::new(px, py), viewport))?;
        }
        Commands::Locate { viewport, x, y } => {
            let viewport = resolve_viewport(viewport, &config)?;
            let anchor = Anchor::new(x, y);
            if !is_anchor_set(Some(&anchor)) {
                log::warn!("Anchor (0, 0) is the unset marker and is never drawn");
            }
            print_json(&anchor_to_pixel(anchor, viewport))?;
        }
        Commands::Fit { plan, viewport } => {
            let viewport = resolve_viewport(viewport, &config)?;
            let (store, id) = open_plan_store(&plan)?;
            let source = store.fetch(&id).await?;
            let size = PlanRenderer::from_config(&config)
                .measure(&source)
                .await
                .with_context(|| format!("could not read {}", plan.display()))?;
            print_json(&Letterbox::fit(size, viewport))?;
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    run(Cli::parse()).await
}
