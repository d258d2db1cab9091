use rustfft::{FftPlanner, num_complex::Complex};

use super::low_pass::LowPassFilter;
use crate::config::AudioConfig;
use crate::detector::FrequencySnapshot;

/// Turns raw samples into byte frequency snapshots.
///
/// The samples are low-passed on arrival, the most recent `fft_size` of them
/// are windowed (Blackman), transformed, smoothed over time and mapped from
/// decibels onto `0..=255`.
pub struct SpectrumAnalyzer {
    config: AudioConfig,
    sample_rate: f32,

    buffer: Vec<f32>,
    low_pass: LowPassFilter,

    fft_planner: FftPlanner<f32>,
    window: Vec<f32>,
    fft_buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl SpectrumAnalyzer {
    pub fn new(config: &AudioConfig, sample_rate: f32) -> Self {
        let fft_size = config.fft_size;

        Self {
            config: config.clone(),
            sample_rate,
            buffer: Vec::with_capacity(fft_size),
            low_pass: LowPassFilter::new(sample_rate, config.low_pass_cutoff_hz),
            fft_planner: FftPlanner::new(),
            window: apodize::blackman_iter(fft_size)
                .map(|w| w as f32)
                .collect(),
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; config.bin_count()],
        }
    }

    /// Adds mono samples.
    pub fn add_samples(&mut self, samples: &[f32]) {
        let low_pass = &mut self.low_pass;
        self.buffer
            .extend(samples.iter().map(|&sample| low_pass.process(sample)));

        self.trim_buffer();
    }

    /// Adds interleaved samples and mixes them down to mono.
    pub fn add_interleaved(&mut self, data: &[f32], channels: usize) {
        if channels <= 1 {
            self.add_samples(data);
            return;
        }

        let low_pass = &mut self.low_pass;
        self.buffer.extend(data.chunks_exact(channels).map(|frame| {
            let mono = frame.iter().sum::<f32>() / channels as f32;
            low_pass.process(mono)
        }));

        self.trim_buffer();
    }

    fn trim_buffer(&mut self) {
        let fft_size = self.config.fft_size;

        // Keep only the most recent samples
        if self.buffer.len() > fft_size {
            self.buffer.drain(0..self.buffer.len() - fft_size);
        }
    }

    /// RMS of the (low-passed) analysis window, clamped to 0-1.
    pub fn calculate_loudness(&self) -> f32 {
        if self.buffer.is_empty() {
            return 0.0;
        }

        let sum_squares: f32 = self.buffer.iter().map(|&x| x * x).sum();
        (sum_squares / self.buffer.len() as f32).sqrt().min(1.0)
    }

    /// Writes the current byte spectrum into `out`, resizing it to the bin count.
    pub fn fill_byte_frequency_data(&mut self, out: &mut FrequencySnapshot) {
        let fft_size = self.config.fft_size;
        let bin_count = self.config.bin_count();

        // zero-pad in front while the buffer isn't full yet
        let missing = fft_size - self.buffer.len();
        for (i, slot) in self.fft_buffer.iter_mut().enumerate() {
            let sample = if i < missing {
                0.0
            } else {
                self.buffer[i - missing]
            };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        let fft = self.fft_planner.plan_fft_forward(fft_size);
        fft.process(&mut self.fft_buffer);

        let tau = self.config.smoothing_time_constant;
        let norm = 1.0 / fft_size as f32;
        for (smoothed, bin) in self.smoothed.iter_mut().zip(&self.fft_buffer[..bin_count]) {
            let magnitude = bin.norm() * norm;
            let next = tau * *smoothed + (1.0 - tau) * magnitude;
            *smoothed = if next.is_finite() { next } else { 0.0 };
        }

        let min_db = self.config.min_decibels;
        let scale = 255.0 / (self.config.max_decibels - min_db);

        out.clear();
        out.extend(self.smoothed.iter().map(|&magnitude| {
            let db = 20.0 * magnitude.log10();
            ((db - min_db) * scale).floor().clamp(0.0, 255.0) as u8
        }));
    }

    /// Frequency (in Hz) at the start of the given bin.
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate / self.config.fft_size as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const SAMPLE_RATE: f32 = 44_100.0;

    fn config_without_smoothing() -> AudioConfig {
        AudioConfig {
            smoothing_time_constant: 0.0,
            ..Default::default()
        }
    }

    fn sine(freq: f32, amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| amplitude * (2.0 * PI * freq * i as f32 / SAMPLE_RATE).sin())
            .collect()
    }

    fn bass_energy(snapshot: &[u8]) -> f32 {
        snapshot[..8].iter().map(|&mag| mag as f32).sum::<f32>() / 8.0
    }

    #[test]
    fn silence_gives_zeroes() {
        let config = AudioConfig::default();
        let mut analyzer = SpectrumAnalyzer::new(&config, SAMPLE_RATE);
        let mut snapshot = FrequencySnapshot::new();

        analyzer.fill_byte_frequency_data(&mut snapshot);

        assert_eq!(snapshot.len(), config.bin_count());
        assert!(snapshot.iter().all(|&mag| mag == 0));
        assert_eq!(analyzer.calculate_loudness(), 0.0);
    }

    #[test]
    fn bass_tone_fills_bass_band() {
        let config = config_without_smoothing();
        let mut analyzer = SpectrumAnalyzer::new(&config, SAMPLE_RATE);
        let mut snapshot = FrequencySnapshot::new();

        analyzer.add_samples(&sine(60.0, 0.8, 2 * config.fft_size));
        analyzer.fill_byte_frequency_data(&mut snapshot);

        let energy = bass_energy(&snapshot);
        assert!(energy > 160.0, "bass energy of a 60Hz tone: {energy}");
    }

    #[test]
    fn treble_tone_is_filtered_out() {
        let config = config_without_smoothing();
        let mut analyzer = SpectrumAnalyzer::new(&config, SAMPLE_RATE);
        let mut snapshot = FrequencySnapshot::new();

        analyzer.add_samples(&sine(5_000.0, 0.8, 2 * config.fft_size));
        analyzer.fill_byte_frequency_data(&mut snapshot);

        let energy = bass_energy(&snapshot);
        assert!(energy < 40.0, "bass energy of a 5kHz tone: {energy}");
    }

    #[test]
    fn smoothing_blends_with_previous_frame() {
        let config = AudioConfig::default();
        let mut analyzer = SpectrumAnalyzer::new(&config, SAMPLE_RATE);
        let mut first = FrequencySnapshot::new();
        let mut second = FrequencySnapshot::new();

        analyzer.add_samples(&sine(60.0, 0.8, config.fft_size));
        analyzer.fill_byte_frequency_data(&mut first);
        analyzer.fill_byte_frequency_data(&mut second);

        // same input twice: the smoothed spectrum can only grow towards it
        assert!(bass_energy(&second) > bass_energy(&first));
    }

    #[test]
    fn interleaved_input_is_mixed_down() {
        let config = AudioConfig::default();
        let mut analyzer = SpectrumAnalyzer::new(&config, SAMPLE_RATE);

        // left and right cancel out
        let data: Vec<f32> = (0..512).flat_map(|_| [0.5, -0.5]).collect();
        analyzer.add_interleaved(&data, 2);

        assert_eq!(analyzer.buffer.len(), 512);
        assert_eq!(analyzer.calculate_loudness(), 0.0);
    }

    #[test]
    fn keeps_only_most_recent_window() {
        let config = AudioConfig::default();
        let mut analyzer = SpectrumAnalyzer::new(&config, SAMPLE_RATE);

        analyzer.add_samples(&vec![0.0; config.fft_size * 3 + 17]);

        assert_eq!(analyzer.buffer.len(), config.fft_size);
    }

    #[test]
    fn window_tapers_to_zero_at_the_edges() {
        let analyzer = SpectrumAnalyzer::new(&AudioConfig::default(), SAMPLE_RATE);
        let window = &analyzer.window;

        assert_eq!(window.len(), 2048);
        assert!(window[0].abs() < 1e-6);
        assert!(window[2047].abs() < 1e-6);
        assert!(window[1024] > 0.99);
    }

    #[test]
    fn bin_frequency_matches_resolution() {
        let analyzer = SpectrumAnalyzer::new(&AudioConfig::default(), SAMPLE_RATE);

        assert_eq!(analyzer.bin_frequency(0), 0.0);
        assert!((analyzer.bin_frequency(8) - 172.265_62).abs() < 1e-2);
    }
}
