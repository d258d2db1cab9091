use std::f32::consts::{FRAC_1_SQRT_2, PI};

/// Second order low-pass filter (RBJ audio EQ cookbook), direct form I.
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl LowPassFilter {
    /// Butterworth response (`Q = 1/sqrt(2)`).
    pub fn new(sample_rate: f32, cutoff_hz: f32) -> Self {
        Self::with_q(sample_rate, cutoff_hz, FRAC_1_SQRT_2)
    }

    pub fn with_q(sample_rate: f32, cutoff_hz: f32, q: f32) -> Self {
        debug_assert!(cutoff_hz > 0. && cutoff_hz < sample_rate / 2.);

        let w0 = 2. * PI * cutoff_hz / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2. * q);

        let a0 = 1. + alpha;
        let b1 = (1. - cos_w0) / a0;

        Self {
            b0: b1 / 2.,
            b1,
            b2: b1 / 2.,
            a1: (-2. * cos_w0) / a0,
            a2: (1. - alpha) / a0,

            x1: 0.,
            x2: 0.,
            y1: 0.,
            y2: 0.,
        }
    }

    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;

        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak_after_settling(filter: &mut LowPassFilter, freq: f32, sample_rate: f32) -> f32 {
        let samples = sample_rate as usize;
        (0..samples)
            .map(|i| {
                let t = i as f32 / sample_rate;
                filter.process((2. * PI * freq * t).sin())
            })
            .skip(samples / 2)
            .fold(0f32, |max, y| max.max(y.abs()))
    }

    #[test]
    fn passes_dc() {
        let mut filter = LowPassFilter::new(44_100., 150.);
        let mut out = 0.;
        for _ in 0..44_100 {
            out = filter.process(1.);
        }

        assert!((out - 1.).abs() < 1e-3, "DC gain: {out}");
    }

    #[test]
    fn keeps_bass_and_attenuates_treble() {
        let sample_rate = 44_100.;

        let bass = peak_after_settling(&mut LowPassFilter::new(sample_rate, 150.), 50., sample_rate);
        let treble =
            peak_after_settling(&mut LowPassFilter::new(sample_rate, 150.), 5_000., sample_rate);

        assert!(bass > 0.9, "50Hz peak: {bass}");
        assert!(treble < 0.01, "5kHz peak: {treble}");
    }
}
