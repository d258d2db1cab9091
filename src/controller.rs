use std::time::Instant;

use log::{info, warn};

use crate::audio::SpectrumSource;
use crate::config::AppConfig;
use crate::detector::DetectorState;
use crate::error::Error;
use crate::session::{FrameOutput, VisualizerSession};

/// Start/stop state of the player. Owns at most one [VisualizerSession].
pub struct Player {
    config: AppConfig,
    session: Option<VisualizerSession>,
    last_output: Option<FrameOutput>,
}

impl Player {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            session: None,
            last_output: None,
        }
    }

    /// Starts a fresh session on `source`. A running session is stopped first.
    pub fn start(&mut self, source: Box<dyn SpectrumSource>) -> Result<(), Error> {
        if self.session.is_some() {
            warn!("Player already running, restarting");
            self.stop();
        }

        self.session = Some(VisualizerSession::new(&self.config, source)?);
        info!("Playback started");
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.session.take().is_some() {
            self.last_output = None;
            info!("Playback stopped");
        }
    }

    /// Stops if running, otherwise starts on the source returned by `open`.
    pub fn toggle<F>(&mut self, open: F) -> anyhow::Result<()>
    where
        F: FnOnce() -> anyhow::Result<Box<dyn SpectrumSource>>,
    {
        if self.is_playing() {
            self.stop();
        } else {
            self.start(open()?)?;
        }

        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_some()
    }

    /// Runs one frame. Does nothing while stopped.
    pub fn tick(&mut self, now: Instant) -> Result<Option<FrameOutput>, Error> {
        let Some(session) = self.session.as_mut() else {
            return Ok(None);
        };

        let output = session.tick(now)?;
        self.last_output = Some(output.clone());
        Ok(Some(output))
    }

    pub fn last_output(&self) -> Option<&FrameOutput> {
        self.last_output.as_ref()
    }

    /// Current pulse scale, `1.0` while stopped.
    pub fn scale_at(&self, now: Instant) -> f32 {
        self.session
            .as_ref()
            .map_or(1., |session| session.scale_at(now))
    }

    pub fn detector_state(&self) -> Option<DetectorState> {
        self.session.as_ref().map(VisualizerSession::detector_state)
    }

    pub fn session(&self) -> Option<&VisualizerSession> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Replaces the config. It takes effect with the next started session.
    pub fn set_config(&mut self, config: AppConfig) -> Result<(), Error> {
        config.validate()?;
        self.config = config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ScriptedSource;

    fn source(levels: &[u8]) -> Box<dyn SpectrumSource> {
        let bins = AppConfig::default().audio.bin_count();
        Box::new(ScriptedSource::from_levels(levels.iter().copied(), bins))
    }

    #[test]
    fn stopped_player_does_not_evaluate() {
        let mut player = Player::new(AppConfig::default());

        assert!(!player.is_playing());
        assert_eq!(player.tick(Instant::now()), Ok(None));
        assert_eq!(player.detector_state(), None);
        assert_eq!(player.scale_at(Instant::now()), 1.);
    }

    #[test]
    fn restart_resets_detector_state() {
        let mut player = Player::new(AppConfig::default());
        let now = Instant::now();

        player.start(source(&[220, 100])).unwrap();
        assert!(player.tick(now).unwrap().unwrap().hit.is_some());
        player.tick(now).unwrap();
        assert_eq!(
            player.detector_state(),
            Some(DetectorState {
                previous_energy: 100.,
                cooldown_ticks: 7
            })
        );

        player.stop();
        assert!(player.last_output().is_none());

        // loud first frame hits right away, nothing left from the old session
        player.start(source(&[170])).unwrap();
        assert_eq!(player.detector_state(), Some(DetectorState::default()));
        let output = player.tick(now).unwrap().unwrap();
        assert!(output.hit.is_some());
        assert_eq!(output.energy, 170.);
    }

    #[test]
    fn start_while_running_replaces_session() {
        let mut player = Player::new(AppConfig::default());
        let now = Instant::now();

        player.start(source(&[220])).unwrap();
        player.tick(now).unwrap();
        player.start(source(&[220])).unwrap();

        assert_eq!(player.session().map(VisualizerSession::frames), Some(0));
        assert!(player.tick(now).unwrap().unwrap().hit.is_some());
    }

    #[test]
    fn toggle_switches_between_states() {
        let mut player = Player::new(AppConfig::default());

        player.toggle(|| Ok(source(&[0]))).unwrap();
        assert!(player.is_playing());

        player
            .toggle(|| unreachable!("must not open a source while stopping"))
            .unwrap();
        assert!(!player.is_playing());
    }

    #[test]
    fn toggle_reports_source_failures() {
        let mut player = Player::new(AppConfig::default());

        let result = player.toggle(|| Err(anyhow::anyhow!("no device")));

        assert!(result.is_err());
        assert!(!player.is_playing());
    }

    #[test]
    fn invalid_config_is_refused() {
        let mut player = Player::new(AppConfig::default());
        let mut config = AppConfig::default();
        config.pulse.max_scale = 0.5;

        assert!(player.set_config(config).is_err());
        assert_eq!(player.config(), &AppConfig::default());
    }

    #[test]
    fn nan_multiplier_never_reaches_a_session() {
        let mut config = AppConfig::default();
        config.detector.relative_multiplier = "NaN".parse().unwrap();

        let mut player = Player::new(AppConfig::default());
        assert!(player.set_config(config.clone()).is_err());

        let mut player = Player::new(config);
        assert!(player.start(source(&[0, 250, 0, 250])).is_err());
        assert!(!player.is_playing());
    }
}
