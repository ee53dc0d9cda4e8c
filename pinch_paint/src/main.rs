//! pinch_paint — interactive entry point.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use pinch_ink::AppMode;
use pinch_paint::app::{run, AppConfig, SourceKind};
use pinch_paint::args::Args;
use pinch_paint::detector::DetectorCommand;

#[derive(thiserror::Error, Debug)]
#[error("no global tracing subscriber set")]
struct NoTracingSubscriber;

fn configure_tracing(verbose: bool) -> Result<()> {
    let result = Err(NoTracingSubscriber);

    let result = result.or_else(|_| {
        let max_level = if verbose {
            tracing::Level::TRACE
        } else if cfg!(debug_assertions) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        tracing::subscriber::set_global_default(
            tracing_subscriber::FmtSubscriber::builder()
                .with_max_level(max_level)
                .with_writer(io::stderr)
                .finish(),
        )
    });

    Ok(result?)
}

fn main() {
    let args = Args::parse();

    if let Err(error) = configure_tracing(args.verbose) {
        // We can technically continue without logging.
        eprintln!("warning: {error}");
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Pinch Paint — draw in the air with a pinch          ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    if let Err(e) = try_main(args) {
        tracing::error!(error = format!("{e:#}"), "fatal");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn try_main(args: Args) -> Result<()> {
    let mut cfg = AppConfig::load(&args.config)?;
    args.apply(&mut cfg);

    if args.quick {
        println!("  Quick-start: {} source, {} mode\n", cfg.source.name(), cfg.mode.name());
    } else {
        configure_interactively(&mut cfg);
    }

    println!();
    println!("  Opening canvas window… press S to start detection, Q to quit.");
    println!();

    run(cfg)
}

fn configure_interactively(cfg: &mut AppConfig) {
    println!("  Landmark source:");
    #[cfg(feature = "leap")]
    println!("    1.Mouse simulation  2.External detector  3.LeapMotion");
    #[cfg(not(feature = "leap"))]
    println!("    1.Mouse simulation  2.External detector  (build with --features leap for LeapMotion)");
    let current = match cfg.source {
        SourceKind::Sim      => "1",
        SourceKind::Detector => "2",
        SourceKind::Leap     => "3",
    };
    let choice = read_line(&format!("    Choice (default {current}): "));
    cfg.source = match choice.trim() {
        "1" => SourceKind::Sim,
        "2" => SourceKind::Detector,
        "3" => SourceKind::Leap,
        _   => cfg.source,
    };

    if cfg.source == SourceKind::Detector {
        let prompt = format!("    Detector command (default \"{}\"): ", cfg.detector.display());
        if let Some(cmd) = DetectorCommand::parse(&read_line(&prompt)) {
            cfg.detector = DetectorCommand { min_score: cfg.detector.min_score, ..cmd };
        }
    }

    let mode = read_line(&format!("  Start in 1.draw  2.drag mode (default {}): ", cfg.mode.name()));
    match mode.trim() {
        "1" => cfg.mode = AppMode::Draw,
        "2" => cfg.mode = AppMode::Drag,
        _   => {}
    }

    let colour = read_line(&format!("  Stroke colour #rrggbb (default {}): ", cfg.pipeline.stroke_color));
    let colour = colour.trim();
    if !colour.is_empty() {
        if pinch_ink::config::parse_hex_color(colour).is_ok() {
            cfg.pipeline.stroke_color = colour.to_string();
        } else {
            println!("    ⚠  not a #rrggbb colour, keeping {}", cfg.pipeline.stroke_color);
        }
    }

    let width: f32 = read_line(&format!("  Stroke width 1–40 px (default {}): ", cfg.pipeline.stroke_width))
        .trim().parse().unwrap_or(cfg.pipeline.stroke_width);
    cfg.pipeline.stroke_width = width.clamp(1.0, 40.0);

    if cfg.image_path.is_none() {
        let image = read_line("  Image to drag (PNG path, empty for a checkerboard): ");
        let image = image.trim();
        if !image.is_empty() {
            cfg.image_path = Some(PathBuf::from(image));
        }
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
