/// Sample rate in Hz assumed when no device reports its own.
/// Live capture always uses the rate of the selected device.
pub const SAMPLE_RATE: f32 = 44100.0;

/// Number of samples per analysis window. Must be a power of 2 for FFT.
/// 2048 samples at 44.1kHz = ~46ms of audio, ~21.5Hz per bin.
pub const FFT_SIZE: usize = 2048;

/// Cutoff (in Hz) of the low-pass filter in front of the analyzer.
/// Everything above this is attenuated before the FFT sees it.
pub const LOW_PASS_CUTOFF_HZ: f32 = 150.0;

/// How much of the previous frame is kept per bin (0.0 - 1.0).
/// Higher = smoother but slower to react.
pub const SMOOTHING_TIME_CONSTANT: f32 = 0.8;

/// Magnitudes at or below this level map to 0.
pub const MIN_DECIBELS: f32 = -100.0;

/// Magnitudes at or above this level map to 255.
pub const MAX_DECIBELS: f32 = -30.0;

/// Number of lowest FFT bins averaged into the bass energy.
/// 8 bins at the default FFT size cover roughly 0 - 170Hz.
pub const BASS_BAND_SIZE: usize = 8;

/// Mean bass magnitude (0 - 255) a frame must exceed to count as a hit.
/// Keeps rising ambient noise from triggering.
/// Recommended range: 130 - 200
pub const ABSOLUTE_THRESHOLD: f32 = 160.0;

/// Required rise over the previous frame's energy.
/// 1.4 = the bass must be 40% louder than one frame ago.
/// Recommended range: 1.1 - 2.0
pub const RELATIVE_MULTIPLIER: f32 = 1.4;

/// Frames after a hit during which no new hit is reported.
/// 8 frames at 60fps = ~133ms
pub const COOLDOWN_CYCLES: u32 = 8;

/// How long a pulse lasts before the element is back at rest.
pub const PULSE_DURATION_MS: u64 = 120;

/// Largest scale a pulse may reach (1.0 = rest).
pub const PULSE_MAX_SCALE: f32 = 1.35;

/// Interval between frames when no display drives the loop.
/// 16ms = ~60fps
pub const FRAME_INTERVAL_MS: u64 = 16;

/// Tempo of the synthetic kick used by `--demo`.
pub const DEMO_BPM: f32 = 120.0;
