use crate::audio::analyzer::SpectrumAnalyzer;
use crate::config::AudioConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat};
use log::{debug, error, info};
use std::sync::{Arc, Mutex};

/// A running capture stream. Capturing stops when this is dropped.
pub struct AudioStream {
    _stream: cpal::Stream,
    device_name: String,
    sample_rate: f32,
}

impl AudioStream {
    pub fn new(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        sample_format: SampleFormat,
        analyzer: Arc<Mutex<SpectrumAnalyzer>>,
    ) -> Result<Self, anyhow::Error> {
        let channels = config.channels as usize;
        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(device, config, channels, analyzer)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(device, config, channels, analyzer)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(device, config, channels, analyzer)?,
            other => return Err(anyhow::anyhow!("Unsupported sample format: {other:?}")),
        };

        stream.play()?;

        Ok(Self {
            _stream: stream,
            device_name: device.name().unwrap_or_else(|_| "Unknown".into()),
            sample_rate: config.sample_rate.0 as f32,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

/// Names of all input devices of the default host.
pub fn input_device_names() -> Vec<String> {
    cpal::default_host()
        .input_devices()
        .ok()
        .map(|iter| iter.filter_map(|d| d.name().ok()).collect())
        .unwrap_or_default()
}

pub fn default_input_device_name() -> Option<String> {
    cpal::default_host()
        .default_input_device()
        .and_then(|d| d.name().ok())
}

/// Opens the named input device (or the default one) and feeds its samples
/// into a fresh analyzer running at the device's sample rate.
pub fn open_input(
    device_name: Option<&str>,
    config: &AudioConfig,
) -> Result<(AudioStream, Arc<Mutex<SpectrumAnalyzer>>), anyhow::Error> {
    let host = cpal::default_host();

    let device = match device_name {
        Some(name) => host
            .input_devices()?
            .find(|d| d.name().ok().as_deref() == Some(name))
            .ok_or_else(|| anyhow::anyhow!("No input device named '{name}'"))?,
        None => host
            .default_input_device()
            .ok_or_else(|| anyhow::anyhow!("No default input device available"))?,
    };

    let supported_config = device.default_input_config()?;
    let sample_format = supported_config.sample_format();
    let stream_config: cpal::StreamConfig = supported_config.into();
    let sample_rate = stream_config.sample_rate.0 as f32;

    if config.low_pass_cutoff_hz >= sample_rate / 2.0 {
        return Err(anyhow::anyhow!(
            "Low-pass cutoff of {} Hz is above the Nyquist frequency of the device",
            config.low_pass_cutoff_hz
        ));
    }

    debug!(
        "Input stream config: {} channels, {} Hz, {:?}",
        stream_config.channels, sample_rate, sample_format
    );

    let analyzer = Arc::new(Mutex::new(SpectrumAnalyzer::new(config, sample_rate)));
    let stream = AudioStream::new(&device, &stream_config, sample_format, analyzer.clone())?;
    info!("Listening on '{}'", stream.device_name());

    Ok((stream, analyzer))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    analyzer: Arc<Mutex<SpectrumAnalyzer>>,
) -> Result<cpal::Stream, anyhow::Error>
where
    T: Sample + FromSample<f32> + cpal::SizedSample,
    f32: FromSample<T>,
{
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let samples: Vec<f32> = data.iter().map(|&s| s.to_sample()).collect();
            analyzer.lock().unwrap().add_interleaved(&samples, channels);
        },
        |err| error!("Stream error: {err}"),
        None,
    )?;

    Ok(stream)
}
