//! Everything a [crate::session::VisualizerSession] can pull frequency
//! snapshots from.
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::analyzer::SpectrumAnalyzer;
use super::audio_stream::{self, AudioStream};
use crate::config::AudioConfig;
use crate::detector::FrequencySnapshot;

/// Interface for all spectrum sources in this module.
pub trait SpectrumSource {
    /// **Replaces** the content of `snapshot` with the spectrum at `now`.
    fn fill_snapshot(&mut self, snapshot: &mut FrequencySnapshot, now: Instant);

    /// Short human readable name, used for logging.
    fn name(&self) -> String;
}

/// Spectrum of a live input device.
pub struct LiveSource {
    analyzer: Arc<Mutex<SpectrumAnalyzer>>,
    stream: AudioStream,
}

impl LiveSource {
    /// Starts capturing from the named device, or the default input device.
    pub fn open(device_name: Option<&str>, config: &AudioConfig) -> anyhow::Result<Self> {
        let (stream, analyzer) = audio_stream::open_input(device_name, config)?;
        Ok(Self { analyzer, stream })
    }

    pub fn analyzer(&self) -> Arc<Mutex<SpectrumAnalyzer>> {
        self.analyzer.clone()
    }
}

impl SpectrumSource for LiveSource {
    fn fill_snapshot(&mut self, snapshot: &mut FrequencySnapshot, _now: Instant) {
        self.analyzer
            .lock()
            .unwrap()
            .fill_byte_frequency_data(snapshot);
    }

    fn name(&self) -> String {
        format!("{} @ {} Hz", self.stream.device_name(), self.stream.sample_rate())
    }
}

/// Replays prepared snapshots, one per call.
///
/// Once the script is exhausted it either starts over or keeps returning
/// silence.
pub struct ScriptedSource {
    frames: Vec<FrequencySnapshot>,
    position: usize,
    looping: bool,
    bin_count: usize,
}

impl ScriptedSource {
    pub fn new(frames: Vec<FrequencySnapshot>) -> Self {
        let bin_count = frames.iter().map(Vec::len).max().unwrap_or(0);

        Self {
            frames,
            position: 0,
            looping: false,
            bin_count,
        }
    }

    /// One frame per level where every bin has that level.
    pub fn from_levels(levels: impl IntoIterator<Item = u8>, bin_count: usize) -> Self {
        let frames = levels
            .into_iter()
            .map(|level| vec![level; bin_count])
            .collect();

        Self {
            bin_count,
            ..Self::new(frames)
        }
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn is_exhausted(&self) -> bool {
        !self.looping && self.position >= self.frames.len()
    }
}

impl SpectrumSource for ScriptedSource {
    fn fill_snapshot(&mut self, snapshot: &mut FrequencySnapshot, _now: Instant) {
        if self.looping && self.position >= self.frames.len() {
            self.position = 0;
        }

        snapshot.clear();
        match self.frames.get(self.position) {
            Some(frame) => {
                snapshot.extend_from_slice(frame);
                self.position += 1;
            }
            None => snapshot.resize(self.bin_count, 0),
        }
    }

    fn name(&self) -> String {
        format!("script ({} frames)", self.frames.len())
    }
}

const KICK_PEAK: f32 = 230.0;
const KICK_FLOOR: f32 = 40.0;
const KICK_RELEASE_SECS: f32 = 0.03;

/// A steady four-on-the-floor kick, rendered straight into the spectrum.
///
/// Beats follow the frame timestamps, so the tempo doesn't depend on how often
/// frames are pulled. The first frame of every beat carries the full peak.
/// Used by `--demo` to run without any audio hardware.
pub struct SyntheticKick {
    bpm: f32,
    beat: Duration,
    started: Option<Instant>,
    last_beat: Option<u128>,
    bin_count: usize,
    bass_bins: usize,
}

impl SyntheticKick {
    pub fn new(bpm: f32, bin_count: usize, bass_bins: usize) -> Self {
        let beat = Duration::from_secs_f32(60.0 / bpm.max(1.0));

        Self {
            bpm,
            beat,
            started: None,
            last_beat: None,
            bin_count,
            bass_bins: bass_bins.min(bin_count),
        }
    }

    pub fn beat_period(&self) -> Duration {
        self.beat
    }

    fn level_at(&mut self, now: Instant) -> f32 {
        let started = *self.started.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started);

        let beat = elapsed.as_nanos() / self.beat.as_nanos();
        if self.last_beat != Some(beat) {
            self.last_beat = Some(beat);
            return KICK_PEAK;
        }

        let since_beat = elapsed.as_secs_f32() - beat as f32 * self.beat.as_secs_f32();
        KICK_FLOOR + (KICK_PEAK - KICK_FLOOR) * (-since_beat / KICK_RELEASE_SECS).exp()
    }
}

impl SpectrumSource for SyntheticKick {
    fn fill_snapshot(&mut self, snapshot: &mut FrequencySnapshot, now: Instant) {
        let level = self.level_at(now);

        snapshot.clear();
        snapshot.resize(self.bin_count, 0);
        for bin in snapshot.iter_mut().take(self.bass_bins) {
            *bin = level as u8;
        }
    }

    fn name(&self) -> String {
        format!("synthetic kick at {} bpm", self.bpm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_source_replays_in_order_then_goes_silent() {
        let mut source = ScriptedSource::from_levels([10, 20], 4);
        let mut snapshot = FrequencySnapshot::new();
        let now = Instant::now();

        source.fill_snapshot(&mut snapshot, now);
        assert_eq!(snapshot, vec![10; 4]);
        source.fill_snapshot(&mut snapshot, now);
        assert_eq!(snapshot, vec![20; 4]);
        assert!(source.is_exhausted());

        source.fill_snapshot(&mut snapshot, now);
        assert_eq!(snapshot, vec![0; 4]);
    }

    #[test]
    fn looping_script_starts_over() {
        let mut source = ScriptedSource::from_levels([1, 2], 1).looping();
        let mut snapshot = FrequencySnapshot::new();
        let now = Instant::now();

        let seen: Vec<u8> = (0..5)
            .map(|_| {
                source.fill_snapshot(&mut snapshot, now);
                snapshot[0]
            })
            .collect();

        assert_eq!(seen, vec![1, 2, 1, 2, 1]);
        assert!(!source.is_exhausted());
    }

    fn count_kick_peaks(frame_interval: Duration, frames: u32) -> usize {
        let mut source = SyntheticKick::new(120.0, 32, 8);
        let mut snapshot = FrequencySnapshot::new();
        let start = Instant::now();

        (0..frames)
            .filter(|&frame| {
                source.fill_snapshot(&mut snapshot, start + frame_interval * frame);
                snapshot[0] == KICK_PEAK as u8
            })
            .count()
    }

    #[test]
    fn synthetic_kick_peaks_once_per_beat() {
        let mut source = SyntheticKick::new(120.0, 32, 8);
        let mut snapshot = FrequencySnapshot::new();
        assert_eq!(source.beat_period(), Duration::from_millis(500));

        // 2 seconds at 20ms frames
        assert_eq!(count_kick_peaks(Duration::from_millis(20), 100), 4);

        source.fill_snapshot(&mut snapshot, Instant::now());
        assert_eq!(snapshot.len(), 32);
        assert!(snapshot[8..].iter().all(|&mag| mag == 0));
    }

    #[test]
    fn synthetic_kick_tempo_ignores_frame_rate() {
        // 2 seconds at roughly 144, 60 and 30 frames per second
        assert_eq!(count_kick_peaks(Duration::from_micros(6_944), 288), 4);
        assert_eq!(count_kick_peaks(Duration::from_micros(16_667), 120), 4);
        assert_eq!(count_kick_peaks(Duration::from_micros(33_333), 60), 4);
    }

    #[test]
    fn synthetic_kick_decays_between_beats() {
        let mut source = SyntheticKick::new(120.0, 32, 8);
        let mut snapshot = FrequencySnapshot::new();
        let start = Instant::now();

        source.fill_snapshot(&mut snapshot, start);
        let peak = snapshot[0];
        source.fill_snapshot(&mut snapshot, start + Duration::from_millis(20));
        let shortly_after = snapshot[0];
        source.fill_snapshot(&mut snapshot, start + Duration::from_millis(400));
        let late = snapshot[0];

        assert!(peak > shortly_after && shortly_after > late);
        assert_eq!(late, KICK_FLOOR as u8);
    }
}
