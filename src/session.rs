use std::time::Instant;

use log::{debug, info};

use crate::audio::SpectrumSource;
use crate::config::AppConfig;
use crate::detector::{BassBand, BassHitDetector, DetectorState, FrequencySnapshot, HitEvent};
use crate::error::Error;
use crate::pulse::PulseAnimator;

/// Result of one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutput {
    pub hit: Option<HitEvent>,
    /// Mean bass energy of this frame (0 - 255).
    pub energy: f32,
    pub state: DetectorState,
    /// Pulse scale right after this frame was processed.
    pub scale: f32,
    pub bass_band: Vec<u8>,
}

/// Everything that lives as long as one playback: the spectrum source, the
/// detector state and the pulse.
///
/// Dropping the session stops its source and forgets all detector state, so a
/// new session always starts from scratch.
pub struct VisualizerSession {
    detector: BassHitDetector,
    pulse: PulseAnimator,
    source: Box<dyn SpectrumSource>,
    snapshot: FrequencySnapshot,

    frames: u64,
    hits: u64,
}

impl VisualizerSession {
    pub fn new(config: &AppConfig, source: Box<dyn SpectrumSource>) -> Result<Self, Error> {
        config.validate()?;

        info!("Starting visualizer session on {}", source.name());

        Ok(Self {
            detector: BassHitDetector::new(config.detector.clone())?,
            pulse: PulseAnimator::new(config.pulse.clone()),
            source,
            snapshot: FrequencySnapshot::with_capacity(config.audio.bin_count()),
            frames: 0,
            hits: 0,
        })
    }

    /// Pulls one snapshot from the source and runs it through the detector.
    pub fn tick(&mut self, now: Instant) -> Result<FrameOutput, Error> {
        self.source.fill_snapshot(&mut self.snapshot, now);

        let band = BassBand::from_snapshot(&self.snapshot, self.detector.config().bass_band_size)?;
        let evaluation = self.detector.process(&band);
        self.frames += 1;

        let hit = evaluation.hit_event();
        if let Some(hit) = hit {
            self.hits += 1;
            self.pulse.trigger(hit, now);
            debug!(
                "Bass hit #{} at frame {} (power {:.1})",
                self.hits, self.frames, hit.power
            );
        }

        Ok(FrameOutput {
            hit,
            energy: evaluation.power,
            state: evaluation.state,
            scale: self.pulse.scale_at(now),
            bass_band: band.magnitudes().to_vec(),
        })
    }

    pub fn scale_at(&self, now: Instant) -> f32 {
        self.pulse.scale_at(now)
    }

    pub fn detector_state(&self) -> DetectorState {
        self.detector.state()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn source_name(&self) -> String {
        self.source.name()
    }
}

impl Drop for VisualizerSession {
    fn drop(&mut self) {
        info!(
            "Visualizer session ended after {} frames, {} hits",
            self.frames, self.hits
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ScriptedSource;
    use std::time::Duration;

    fn session(levels: &[u8]) -> VisualizerSession {
        let config = AppConfig::default();
        let source = ScriptedSource::from_levels(levels.iter().copied(), config.audio.bin_count());
        VisualizerSession::new(&config, Box::new(source)).unwrap()
    }

    #[test]
    fn hit_starts_pulse() {
        let mut session = session(&[0, 200]);
        let start = Instant::now();

        let quiet = session.tick(start).unwrap();
        assert_eq!(quiet.hit, None);
        assert_eq!(quiet.scale, 1.);

        let loud = session.tick(start + Duration::from_millis(16)).unwrap();
        assert_eq!(loud.hit, Some(HitEvent { power: 200. }));
        assert!(loud.scale > 1.);
        assert_eq!(loud.state.cooldown_ticks, 8);
        assert_eq!(loud.bass_band, vec![200; 8]);

        assert_eq!(session.frames(), 2);
        assert_eq!(session.hits(), 1);
    }

    #[test]
    fn hits_are_spaced_by_cooldown() {
        // a beat every other frame, much faster than the cooldown allows
        let levels: Vec<u8> = (0..40).map(|i| if i % 2 == 0 { 250 } else { 0 }).collect();
        let mut session = session(&levels);
        let now = Instant::now();

        let hit_frames: Vec<usize> = (0..levels.len())
            .filter(|_| session.tick(now).unwrap().hit.is_some())
            .collect();

        assert!(!hit_frames.is_empty());
        for pair in hit_frames.windows(2) {
            assert!(pair[1] - pair[0] > 8, "hits at {pair:?}");
        }
    }

    #[test]
    fn snapshot_too_small_for_band_fails_fast() {
        let config = AppConfig::default();
        let source = ScriptedSource::new(vec![vec![255; 4]]);
        let mut session = VisualizerSession::new(&config, Box::new(source)).unwrap();

        assert_eq!(
            session.tick(Instant::now()).unwrap_err(),
            Error::BassBandOutOfRange {
                requested: 8,
                available: 4
            }
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = AppConfig::default();
        config.detector.bass_band_size = 0;
        let source = ScriptedSource::from_levels([0], 8);

        assert!(VisualizerSession::new(&config, Box::new(source)).is_err());
    }
}
