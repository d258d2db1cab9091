use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::consts;
use crate::error::Error;

pub const APP_VERSION: &str = "v0.1.0";

#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub detector: DetectorConfig,
    pub pulse: PulseConfig,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Nominal sample rate in Hz the low-pass cutoff is checked against.
    /// Live capture runs at whatever rate the device reports.
    pub sample_rate: f32,

    /// Number of samples to analyze at once. Must be a power of 2 for FFT.
    /// Larger = better frequency resolution but more latency.
    pub fft_size: usize,

    /// Cutoff of the low-pass filter in front of the analyzer.
    pub low_pass_cutoff_hz: f32,

    /// How much of the previous spectrum is blended into the current one.
    /// Must be within `[0, 1)`.
    pub smoothing_time_constant: f32,

    /// Lower end of the decibel range mapped onto 0 - 255.
    pub min_decibels: f32,

    /// Upper end of the decibel range mapped onto 0 - 255.
    pub max_decibels: f32,

    /// Frame interval when running without a display.
    pub frame_interval_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: consts::SAMPLE_RATE,
            fft_size: consts::FFT_SIZE,
            low_pass_cutoff_hz: consts::LOW_PASS_CUTOFF_HZ,
            smoothing_time_constant: consts::SMOOTHING_TIME_CONSTANT,
            min_decibels: consts::MIN_DECIBELS,
            max_decibels: consts::MAX_DECIBELS,
            frame_interval_ms: consts::FRAME_INTERVAL_MS,
        }
    }
}

impl AudioConfig {
    /// Amount of bins in one frequency snapshot.
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Tuning of the bass hit detector.
///
/// The defaults were picked by ear, not derived. Expect to retune them for
/// material that is mixed very differently.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Mean bass magnitude (0 - 255) a frame has to exceed.
    pub absolute_threshold: f32,

    /// Factor the energy has to rise by compared to the previous frame.
    pub relative_multiplier: f32,

    /// Frames during which hits are suppressed after a hit.
    pub cooldown_cycles: u32,

    /// Number of lowest bins that make up the bass band.
    pub bass_band_size: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            absolute_threshold: consts::ABSOLUTE_THRESHOLD,
            relative_multiplier: consts::RELATIVE_MULTIPLIER,
            cooldown_cycles: consts::COOLDOWN_CYCLES,
            bass_band_size: consts::BASS_BAND_SIZE,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Length of one pulse in milliseconds.
    pub duration_ms: u64,

    /// Peak scale of the strongest possible pulse.
    pub max_scale: f32,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            duration_ms: consts::PULSE_DURATION_MS,
            max_scale: consts::PULSE_MAX_SCALE,
        }
    }
}

impl PulseConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Couldn't read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("Couldn't parse config file {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Couldn't write config file {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Error> {
        let audio = &self.audio;
        let detector = &self.detector;
        let pulse = &self.pulse;

        if !audio.fft_size.is_power_of_two() || audio.fft_size < 32 {
            return Err(invalid(format!(
                "fft_size must be a power of 2 and at least 32, got {}",
                audio.fft_size
            )));
        }
        for (name, value) in [
            ("sample_rate", audio.sample_rate),
            ("low_pass_cutoff_hz", audio.low_pass_cutoff_hz),
            ("min_decibels", audio.min_decibels),
            ("max_decibels", audio.max_decibels),
            ("relative_multiplier", detector.relative_multiplier),
            ("pulse max_scale", pulse.max_scale),
        ] {
            if !value.is_finite() {
                return Err(invalid(format!("{name} must be a finite number, got {value}")));
            }
        }

        if audio.sample_rate <= 0.0 {
            return Err(invalid("sample_rate must be positive"));
        }
        if audio.low_pass_cutoff_hz <= 0.0 || audio.low_pass_cutoff_hz >= audio.sample_rate / 2.0
        {
            return Err(invalid(format!(
                "low_pass_cutoff_hz must be between 0 and {} Hz",
                audio.sample_rate / 2.0
            )));
        }
        if !(0.0..1.0).contains(&audio.smoothing_time_constant) {
            return Err(invalid("smoothing_time_constant must be within [0, 1)"));
        }
        if audio.min_decibels >= audio.max_decibels {
            return Err(invalid("min_decibels must be below max_decibels"));
        }
        if audio.frame_interval_ms == 0 {
            return Err(invalid("frame_interval_ms can't be 0"));
        }

        if detector.bass_band_size == 0 {
            return Err(invalid("bass_band_size can't be 0"));
        }
        if detector.bass_band_size > audio.bin_count() {
            return Err(Error::BassBandOutOfRange {
                requested: detector.bass_band_size,
                available: audio.bin_count(),
            });
        }
        if detector.relative_multiplier <= 0.0 {
            return Err(invalid("relative_multiplier must be positive"));
        }
        if !(0.0..=255.0).contains(&detector.absolute_threshold) {
            return Err(invalid("absolute_threshold must be within [0, 255]"));
        }

        if pulse.duration_ms == 0 {
            return Err(invalid("pulse duration_ms can't be 0"));
        }
        if pulse.max_scale < 1.0 {
            return Err(invalid("pulse max_scale can't be below 1.0"));
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidConfig(msg.into())
}
