//! Bass hit detection.
//!
//! A hit is a frame whose mean bass magnitude is loud in absolute terms, rose
//! sharply compared to the previous frame and isn't within the cooldown of a
//! previous hit.

use crate::config::DetectorConfig;
use crate::error::Error;

/// One magnitude (0 - 255) per frequency bin, lowest frequency first.
pub type FrequencySnapshot = Vec<u8>;

/// The lowest bins of a [FrequencySnapshot]. Never empty.
#[derive(Debug, Clone, Copy)]
pub struct BassBand<'a> {
    magnitudes: &'a [u8],
}

impl<'a> BassBand<'a> {
    pub fn new(magnitudes: &'a [u8]) -> Result<Self, Error> {
        if magnitudes.is_empty() {
            return Err(Error::EmptyBassBand);
        }

        Ok(Self { magnitudes })
    }

    /// Takes the lowest `size` bins of the snapshot.
    pub fn from_snapshot(snapshot: &'a [u8], size: usize) -> Result<Self, Error> {
        if size > snapshot.len() {
            return Err(Error::BassBandOutOfRange {
                requested: size,
                available: snapshot.len(),
            });
        }

        Self::new(&snapshot[..size])
    }

    pub fn magnitudes(&self) -> &'a [u8] {
        self.magnitudes
    }

    /// Arithmetic mean of the magnitudes.
    pub fn energy(&self) -> f32 {
        let sum: u32 = self.magnitudes.iter().map(|&mag| mag as u32).sum();
        sum as f32 / self.magnitudes.len() as f32
    }
}

/// Everything the detector remembers between two frames.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DetectorState {
    /// Mean bass energy of the last evaluated frame.
    pub previous_energy: f32,

    /// Frames left until hits are allowed again. `0` means "ready".
    pub cooldown_ticks: u32,
}

/// Outcome of a single [evaluate] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub hit: bool,

    /// Bass energy of the frame. Only meaningful to consumers if `hit` is set.
    pub power: f32,

    pub state: DetectorState,
}

impl Evaluation {
    pub fn hit_event(&self) -> Option<HitEvent> {
        self.hit.then_some(HitEvent { power: self.power })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEvent {
    pub power: f32,
}

/// Decides whether `band` is a hit given the state of the previous frame.
pub fn evaluate(band: &BassBand, state: DetectorState, config: &DetectorConfig) -> Evaluation {
    let energy = band.energy();

    let is_hit = energy > config.absolute_threshold
        && energy > state.previous_energy * config.relative_multiplier
        && state.cooldown_ticks == 0;

    let cooldown_ticks = if is_hit {
        config.cooldown_cycles
    } else {
        state.cooldown_ticks.saturating_sub(1)
    };

    Evaluation {
        hit: is_hit,
        power: energy,
        state: DetectorState {
            previous_energy: energy,
            cooldown_ticks,
        },
    }
}

/// Stateful wrapper around [evaluate] for one playback session.
#[derive(Debug, Clone)]
pub struct BassHitDetector {
    config: DetectorConfig,
    state: DetectorState,
}

impl BassHitDetector {
    pub fn new(config: DetectorConfig) -> Result<Self, Error> {
        if config.bass_band_size == 0 {
            return Err(Error::InvalidConfig("bass_band_size can't be 0".into()));
        }

        Ok(Self {
            config,
            state: DetectorState::default(),
        })
    }

    pub fn process(&mut self, band: &BassBand) -> Evaluation {
        let evaluation = evaluate(band, self.state, &self.config);
        self.state = evaluation.state;
        evaluation
    }

    /// Extracts the bass band of `snapshot` and evaluates it.
    pub fn process_snapshot(&mut self, snapshot: &[u8]) -> Result<Evaluation, Error> {
        let band = BassBand::from_snapshot(snapshot, self.config.bass_band_size)?;
        Ok(self.process(&band))
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}
