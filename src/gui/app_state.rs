use crate::visual_engine::VisualEngine;
use eframe::egui;
use log::{debug, error, info};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use radiopulse::audio::{LiveSource, SpectrumAnalyzer, SpectrumSource, SyntheticKick, audio_stream};
use radiopulse::config::{APP_VERSION, AppConfig};
use radiopulse::consts::DEMO_BPM;
use radiopulse::controller::Player;

use super::components::{render_bass_band, render_config_panel, render_live_monitoring};

pub struct AppState {
    player: Player,
    pending_config: AppConfig, // Local copy for sliders
    devices: Vec<String>,
    active_device_idx: usize,
    pending_device_idx: usize, // Local selection for device selector
    demo: bool,
    analyzer: Option<Arc<Mutex<SpectrumAnalyzer>>>,
    last_error: Option<String>,
    visuals_window_open: bool,
    visuals_window: VisualEngine,
}

impl eframe::App for AppState {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // one detector evaluation per displayed frame
        self.run_frame();

        self.render_top_panel(ctx);
        self.render_bottom_panel(ctx);
        self.render_central_panel(ctx);
        self.render_visualizer_window(ctx);

        ctx.request_repaint();
    }
}

impl AppState {
    pub fn new(config: AppConfig, device: Option<String>, demo: bool) -> Self {
        debug!("Initializing GUI state...");

        let devices = audio_stream::input_device_names();
        debug!("Found {} audio input devices", devices.len());

        let preferred = device.or_else(audio_stream::default_input_device_name);
        let selected_device_idx = preferred
            .as_ref()
            .and_then(|name| devices.iter().position(|d| d == name))
            .unwrap_or(0);

        let selected_device = devices
            .get(selected_device_idx)
            .map(|s| s.as_str())
            .unwrap_or("None");
        info!("Selected initial audio device: {selected_device}");

        debug!("Initial config loaded: {config:?}");

        let visuals_window = VisualEngine::new(config.pulse.max_scale);

        Self {
            pending_config: config.clone(),
            player: Player::new(config),
            devices,
            pending_device_idx: selected_device_idx,
            active_device_idx: selected_device_idx,
            demo,
            analyzer: None,
            last_error: None,
            visuals_window_open: false,
            visuals_window,
        }
    }

    fn run_frame(&mut self) {
        if let Err(err) = self.player.tick(Instant::now()) {
            error!("Stopping playback: {err}");
            self.last_error = Some(err.to_string());
            self.stop();
        }
    }

    fn open_source(&mut self) -> anyhow::Result<Box<dyn SpectrumSource>> {
        let config = self.player.config();

        if self.demo {
            return Ok(Box::new(SyntheticKick::new(
                DEMO_BPM,
                config.audio.bin_count(),
                config.detector.bass_band_size,
            )));
        }

        let device_name = self.devices.get(self.active_device_idx).map(|s| s.as_str());
        let source = LiveSource::open(device_name, &config.audio)?;
        self.analyzer = Some(source.analyzer());
        Ok(Box::new(source))
    }

    fn start(&mut self) {
        let result = self.open_source().and_then(|source| {
            self.player.start(source)?;
            Ok(())
        });

        match result {
            Ok(()) => self.last_error = None,
            Err(err) => {
                error!("Couldn't start playback: {err:#}");
                self.last_error = Some(format!("{err:#}"));
                self.analyzer = None;
            }
        }
    }

    fn stop(&mut self) {
        self.player.stop();
        self.analyzer = None;
    }

    fn toggle_playback(&mut self) {
        if self.player.is_playing() {
            self.stop();
        } else {
            self.start();
        }
    }

    fn apply_settings(&mut self) {
        let device_name = self
            .devices
            .get(self.pending_device_idx)
            .map(|s| s.as_str())
            .unwrap_or("Unknown");

        debug!(
            "Applying settings - Device: {}, Config: {:?}",
            device_name, self.pending_config
        );

        if let Err(err) = self.player.set_config(self.pending_config.clone()) {
            error!("Rejected settings: {err}");
            self.last_error = Some(err.to_string());
            return;
        }

        self.active_device_idx = self.pending_device_idx;
        self.visuals_window
            .set_max_scale(self.player.config().pulse.max_scale);

        if self.player.is_playing() {
            debug!("Restarting session with new settings...");
            self.stop();
            self.start();
        }

        info!("Settings applied successfully");
    }

    fn reset_to_default(&mut self) {
        debug!("Resetting config to defaults");
        self.pending_config = AppConfig::default();
    }

    fn disable_apply_button(&self) -> bool {
        let config_unchanged = &self.pending_config == self.player.config();
        let device_unchanged = self.pending_device_idx == self.active_device_idx;

        config_unchanged && device_unchanged
    }

    fn render_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading(format!("radiopulse {APP_VERSION}"));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(session) = self.player.session() {
                        ui.colored_label(
                            egui::Color32::GREEN,
                            format!("Playing: {}", session.source_name()),
                        );
                    } else if let Some(err) = &self.last_error {
                        ui.colored_label(egui::Color32::RED, err);
                    } else {
                        ui.colored_label(egui::Color32::GRAY, "Stopped");
                    }
                });
            });
            ui.add_space(4.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let label = if self.player.is_playing() {
                    "⏹ Stop"
                } else {
                    "▶ Start"
                };
                if ui.button(label).clicked() {
                    self.toggle_playback();
                }

                ui.separator();

                if self.demo {
                    ui.label(format!("Demo source: synthetic kick at {DEMO_BPM} bpm"));
                } else {
                    ui.label("Audio Device:");
                    egui::ComboBox::from_id_salt("device_selector")
                        .selected_text(
                            self.devices
                                .get(self.pending_device_idx)
                                .map(|name| name.as_str())
                                .unwrap_or("No devices"),
                        )
                        .show_ui(ui, |ui| {
                            for (idx, name) in self.devices.iter().enumerate() {
                                ui.selectable_value(&mut self.pending_device_idx, idx, name);
                            }
                        });
                }
            });
            ui.add_space(4.0);
        });
    }

    fn render_bottom_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                ui.add_space(4.0);
                let apply_enabled = !self.disable_apply_button();

                if apply_enabled {
                    if ui.button("Apply Settings").clicked() {
                        self.apply_settings();
                    }
                } else {
                    ui.add_enabled(false, egui::Button::new("Apply Settings"));
                }

                if ui.button("↺ Reset to Default").clicked() {
                    self.reset_to_default();
                }

                ui.separator();

                ui.add_enabled_ui(!self.visuals_window_open, |ui| {
                    if ui.button("Open Visualizer").clicked() {
                        self.visuals_window_open = true;
                        info!("Visualizer window opened");
                    }
                });

                if self.visuals_window_open {
                    ui.colored_label(egui::Color32::GREEN, "● Visuals Active");
                }
            });
            ui.add_space(8.0);
        });
    }

    fn render_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    ui.add_space(8.0);

                    let output = self.player.last_output();
                    let detector = &self.player.config().detector;
                    let (loudness, band_hz) = match &self.analyzer {
                        Some(analyzer) => {
                            let analyzer = analyzer.lock().unwrap();
                            (
                                Some(analyzer.calculate_loudness()),
                                Some(analyzer.bin_frequency(detector.bass_band_size)),
                            )
                        }
                        None => (None, None),
                    };
                    let hits = self.player.session().map_or(0, |session| session.hits());
                    render_live_monitoring(
                        ui,
                        output,
                        self.player.detector_state(),
                        loudness,
                        hits,
                    );

                    render_bass_band(ui, output, detector.absolute_threshold, band_hz);

                    ui.add_space(20.0);

                    render_config_panel(ui, &mut self.pending_config);
                });
        });
    }

    fn render_visualizer_window(&mut self, ctx: &egui::Context) {
        if self.visuals_window_open {
            let visualizer_id = egui::ViewportId::from_hash_of("radiopulse_visualizer");
            let scale = self.player.scale_at(Instant::now());
            let playing = self.player.is_playing();

            ctx.show_viewport_immediate(
                visualizer_id,
                egui::ViewportBuilder::default()
                    .with_title("radiopulse visuals")
                    .with_inner_size([600.0, 600.0])
                    .with_resizable(true),
                |ctx, _class| {
                    if ctx.input(|i| i.viewport().close_requested()) {
                        self.visuals_window_open = false;
                    }
                    self.visuals_window.render(ctx, scale, playing);
                },
            );
        }
    }
}
