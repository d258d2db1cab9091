use std::path::PathBuf;

use clap::Parser;

use radiopulse::config::AppConfig;

#[derive(Parser, Debug)]
#[command(version, about = "Bass-reactive pulse visualizer for radio streams")]
pub struct Args {
    /// JSON config file. Missing fields fall back to their defaults.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Run without a window and log every detected hit.
    #[arg(long)]
    pub headless: bool,

    /// Use a synthetic kick drum instead of an audio device.
    #[arg(long)]
    pub demo: bool,

    /// Stop after this many frames (headless only).
    #[arg(long)]
    pub frames: Option<u64>,

    /// Name of the input device to capture from. Defaults to the system default.
    #[arg(long, short)]
    pub device: Option<String>,

    /// Override the absolute hit threshold (0 - 255).
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Override the required rise over the previous frame.
    #[arg(long)]
    pub multiplier: Option<f32>,

    /// Override the cooldown in frames.
    #[arg(long)]
    pub cooldown: Option<u32>,

    /// Override the number of bass bins.
    #[arg(long)]
    pub band_size: Option<usize>,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    pub dump_config: bool,

    /// Write the effective config to the given file and exit.
    #[arg(long, value_name = "PATH")]
    pub write_config: Option<PathBuf>,
}

impl Args {
    /// Applies the command line overrides on top of `config`.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(threshold) = self.threshold {
            config.detector.absolute_threshold = threshold;
        }
        if let Some(multiplier) = self.multiplier {
            config.detector.relative_multiplier = multiplier;
        }
        if let Some(cooldown) = self.cooldown {
            config.detector.cooldown_cycles = cooldown;
        }
        if let Some(band_size) = self.band_size {
            config.detector.bass_band_size = band_size;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_only_touch_given_values() {
        let args = Args::parse_from(["radiopulse", "--threshold", "140", "--cooldown", "4"]);
        let mut config = AppConfig::default();

        args.apply_overrides(&mut config);

        assert_eq!(config.detector.absolute_threshold, 140.0);
        assert_eq!(config.detector.cooldown_cycles, 4);
        assert_eq!(
            config.detector.relative_multiplier,
            AppConfig::default().detector.relative_multiplier
        );
    }

    #[test]
    fn headless_demo_flags() {
        let args = Args::parse_from(["radiopulse", "--headless", "--demo", "--frames", "300"]);

        assert!(args.headless);
        assert!(args.demo);
        assert_eq!(args.frames, Some(300));
        assert!(args.device.is_none());
    }
}
