mod cli;
mod gui;
mod visual_engine;

use anyhow::Context;
use log::{debug, info};
use radiopulse::audio::{LiveSource, SpectrumSource, SyntheticKick};
use radiopulse::config::AppConfig;
use radiopulse::consts::DEMO_BPM;
use radiopulse::controller::Player;
use radiopulse::ticker::{self, IntervalTicker};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting up...");

    let args = cli::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    args.apply_overrides(&mut config);
    config.validate()?;
    debug!("Effective config: {config:?}");

    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if let Some(path) = &args.write_config {
        config.save(path)?;
        info!("Config written to {}", path.display());
        return Ok(());
    }

    if args.headless {
        run_headless(&args, config)
    } else {
        run_gui(args, config)
    }
}

fn run_headless(args: &cli::Args, config: AppConfig) -> anyhow::Result<()> {
    let interval = config.audio.frame_interval();

    let source: Box<dyn SpectrumSource> = if args.demo {
        Box::new(SyntheticKick::new(
            DEMO_BPM,
            config.audio.bin_count(),
            config.detector.bass_band_size,
        ))
    } else {
        let source = LiveSource::open(args.device.as_deref(), &config.audio)
            .context("Couldn't open audio input")?;
        Box::new(source)
    };

    let mut player = Player::new(config);
    player.start(source)?;

    let mut ticks = IntervalTicker::new(interval);
    if let Some(frames) = args.frames {
        ticks = ticks.with_limit(frames);
    }

    debug!("Running headless frame loop every {interval:?}");
    let frames = ticker::drive(&mut player, &mut ticks, |output| {
        if let Some(hit) = output.hit {
            info!(
                "Bass hit: power {:.1}, pulse scale {:.2}",
                hit.power, output.scale
            );
        }
    })?;

    let hits = player.session().map_or(0, |session| session.hits());
    player.stop();

    info!("Processed {frames} frames, {hits} hits");
    Ok(())
}

fn run_gui(args: cli::Args, config: AppConfig) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([520.0, 720.0])
            .with_title("radiopulse"),
        ..Default::default()
    };

    debug!("Launching GUI...");
    eframe::run_native(
        "radiopulse",
        options,
        Box::new(move |_cc| Ok(Box::new(gui::AppState::new(config, args.device, args.demo)))),
    )
    .map_err(|err| anyhow::anyhow!("GUI failed: {err}"))?;

    info!("Clean shutdown complete");
    Ok(())
}
