//! Spatial CLI
//!
//! Preview the landing page headlessly and inspect its configuration.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spatial_core::{FrameScheduler, Host, Viewport};
use spatial_site::{LandingPage, PageSnapshot, SiteConfig};
use std::path::PathBuf;
use std::rc::Rc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod sources;

use sources::{FileFeed, OfflineRelay};

#[derive(Parser)]
#[command(name = "spatial")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Spatial landing page preview", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount the page, simulate some time and print what is on screen
    Preview {
        /// Site config (TOML); defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Scroll offset to jump to after mounting (px)
        #[arg(short, long, default_value = "0")]
        scroll: f64,

        /// Simulated time (ms)
        #[arg(short, long, default_value = "5000")]
        duration: f64,

        /// Frame interval (ms)
        #[arg(short, long, default_value = "16")]
        frame: f64,

        /// Window size as WIDTHxHEIGHT
        #[arg(long, default_value = "1440x900")]
        window: String,

        /// Serve the earthquake feed from a GeoJSON file
        #[arg(long)]
        feed_file: Option<PathBuf>,

        /// Override the scene seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Preview {
            config,
            scroll,
            duration,
            frame,
            window,
            feed_file,
            seed,
            json,
        } => cmd_preview(PreviewArgs {
            config,
            scroll,
            duration,
            frame,
            window,
            feed_file,
            seed,
            json,
        }),

        Commands::Config => cmd_config(),
    }
}

struct PreviewArgs {
    config: Option<PathBuf>,
    scroll: f64,
    duration: f64,
    frame: f64,
    window: String,
    feed_file: Option<PathBuf>,
    seed: Option<u64>,
    json: bool,
}

fn parse_window(window: &str) -> Result<(f64, f64)> {
    let (w, h) = window
        .split_once('x')
        .with_context(|| format!("Window size '{window}' is not WIDTHxHEIGHT"))?;
    let width: f64 = w.trim().parse().with_context(|| format!("Invalid width '{w}'"))?;
    let height: f64 = h.trim().parse().with_context(|| format!("Invalid height '{h}'"))?;
    if width <= 0.0 || height <= 0.0 {
        anyhow::bail!("Window size must be positive, got {window}");
    }
    Ok((width, height))
}

fn cmd_preview(args: PreviewArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SiteConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => SiteConfig::default(),
    };
    if args.seed.is_some() {
        config.scene.seed = args.seed;
    }
    let (width, height) = parse_window(&args.window)?;

    let scheduler = FrameScheduler::new();
    let viewport = Rc::new(Viewport::new(width, height));
    let host = Host::new(scheduler.handle(), Rc::clone(&viewport));

    let page = LandingPage::mount(
        &host,
        &config,
        Rc::new(OfflineRelay),
        Rc::new(FileFeed::new(args.feed_file)),
    )
    .context("Failed to mount the page")?;

    viewport.scroll_to(args.scroll);
    let frames = scheduler.run_for(args.duration, args.frame);
    info!(frames, duration = args.duration, "preview simulated");

    let snapshot = page.snapshot();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_snapshot(&snapshot);
    }
    Ok(())
}

fn cmd_config() -> Result<()> {
    let toml = SiteConfig::default()
        .to_toml()
        .context("Failed to serialize the default config")?;
    print!("{toml}");
    Ok(())
}

fn print_snapshot(snap: &PageSnapshot) {
    println!(
        "t = {:.0} ms, scroll = {:.0} px, window = {:.0}x{:.0}",
        snap.time_ms, snap.scroll.offset, snap.scroll.width, snap.scroll.height
    );
    println!();
    println!(
        "navigation   {}{}",
        if snap.navigation.scrolled { "solid" } else { "transparent" },
        if snap.navigation.menu_open { ", menu open" } else { "" }
    );
    println!("typewriter   {:?}", snap.typewriter);
    print_offsets("hero", &snap.hero_parallax);
    println!(
        "globe        rotation ({:.3}, {:.3}, {:.3}), camera ({:.2}, {:.2}, {:.2})",
        snap.globe.rotation.x,
        snap.globe.rotation.y,
        snap.globe.rotation.z,
        snap.globe.camera.position.x,
        snap.globe.camera.position.y,
        snap.globe.camera.position.z
    );
    print_offsets("stars", &snap.stars);
    println!("code rain    {} drops", snap.rain.len());
    println!();

    for counter in &snap.metrics {
        println!("metric       {:<22} {}", counter.label, counter.display);
    }
    for headline in &snap.headlines {
        println!("headline     {headline:?}");
    }
    print_offsets("story map", &snap.story_map);
    print_offsets("journey", &snap.data_journey);
    println!();

    for item in &snap.status {
        println!("status       {:<22} {:<8} {:?}", item.label, item.value, item.status);
    }
    for counter in &snap.live_counters {
        println!("live         {:<22} {}", counter.label, counter.display);
    }
    println!();

    println!("feed         {:?}, {} events", snap.feed.origin, snap.feed.events.len());
    for event in &snap.feed.events {
        println!(
            "  M{}  {:<33} {}  {:?}",
            event.magnitude_label(),
            event.short_place(),
            event.coordinates_label(),
            event.class()
        );
    }
    println!();

    println!("contact      {:?}", snap.form);
    println!("slider       {:.0}%", snap.slider);
    match &snap.cursor {
        Some(cursor) => {
            let (x, y) = cursor.labels();
            println!("cursor       {x} {y}{}", if cursor.hovering { " (hover)" } else { "" });
        }
        None => println!("cursor       hidden"),
    }
}

fn print_offsets(name: &str, offsets: &[(&'static str, f64)]) {
    let values: Vec<_> = offsets
        .iter()
        .map(|(layer, value)| format!("{layer} {value:.1}"))
        .collect();
    println!("{name:<12} {}", values.join(", "));
}
