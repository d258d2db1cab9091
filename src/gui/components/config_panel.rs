use eframe::egui;

use radiopulse::config::AppConfig;

pub fn render_config_panel(ui: &mut egui::Ui, config: &mut AppConfig) {
    ui.label(egui::RichText::new("Configuration").size(16.0));
    ui.add_space(8.0);

    render_bass_detection(ui, config);

    ui.add_space(8.0);

    render_audio_processing(ui, config);

    ui.add_space(8.0);

    render_pulse(ui, config);

    ui.add_space(20.0);
}

fn render_bass_detection(ui: &mut egui::Ui, config: &mut AppConfig) {
    let detector = &mut config.detector;
    let max_band = config.audio.bin_count().min(64);

    egui::CollapsingHeader::new("Bass Detection")
        .default_open(true)
        .show(ui, |ui| {
            ui.add_space(4.0);
            egui::Grid::new("bass_settings_grid")
                .num_columns(2)
                .spacing([20.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Hit Threshold:")
                        .on_hover_text("Minimum bass level for a hit - higher = only loud kicks");
                    ui.add(egui::Slider::new(
                        &mut detector.absolute_threshold,
                        0.0..=255.0,
                    ));
                    ui.end_row();

                    ui.label("Required Rise:")
                        .on_hover_text("How much louder than the previous frame a hit must be");
                    ui.add(
                        egui::Slider::new(&mut detector.relative_multiplier, 1.0..=3.0)
                            .suffix("x"),
                    );
                    ui.end_row();

                    ui.label("Cooldown:")
                        .on_hover_text("Frames to ignore after a hit");
                    ui.add(
                        egui::Slider::new(&mut detector.cooldown_cycles, 0..=30).suffix(" frames"),
                    );
                    ui.end_row();

                    ui.label("Bass Bins:")
                        .on_hover_text("Number of lowest frequency bins that count as bass");
                    ui.add(egui::Slider::new(&mut detector.bass_band_size, 1..=max_band));
                    ui.end_row();
                });
        });
}

fn render_audio_processing(ui: &mut egui::Ui, config: &mut AppConfig) {
    let audio = &mut config.audio;

    egui::CollapsingHeader::new("Audio Processing")
        .default_open(false)
        .show(ui, |ui| {
            ui.add_space(4.0);
            egui::Grid::new("audio_settings_grid")
                .num_columns(2)
                .spacing([20.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Low-pass Cutoff:")
                        .on_hover_text("Everything above this is filtered before analysis");
                    ui.add(
                        egui::Slider::new(&mut audio.low_pass_cutoff_hz, 40.0..=400.0)
                            .suffix(" Hz"),
                    );
                    ui.end_row();

                    ui.label("Smoothing:")
                        .on_hover_text("Higher = calmer spectrum, slower reaction");
                    ui.add(egui::Slider::new(
                        &mut audio.smoothing_time_constant,
                        0.0..=0.95,
                    ));
                    ui.end_row();

                    ui.label("Min Level:")
                        .on_hover_text("Quietest level that still shows up");
                    ui.add(egui::Slider::new(&mut audio.min_decibels, -140.0..=-40.0).suffix(" dB"));
                    ui.end_row();

                    ui.label("Max Level:")
                        .on_hover_text("Level that maps to full scale");
                    ui.add(egui::Slider::new(&mut audio.max_decibels, -39.0..=0.0).suffix(" dB"));
                    ui.end_row();
                });
        });
}

fn render_pulse(ui: &mut egui::Ui, config: &mut AppConfig) {
    let pulse = &mut config.pulse;

    egui::CollapsingHeader::new("Pulse")
        .default_open(false)
        .show(ui, |ui| {
            ui.add_space(4.0);
            egui::Grid::new("pulse_settings_grid")
                .num_columns(2)
                .spacing([20.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Duration:");
                    ui.add(egui::Slider::new(&mut pulse.duration_ms, 40..=500).suffix(" ms"));
                    ui.end_row();

                    ui.label("Max Scale:")
                        .on_hover_text("Size of the strongest pulse");
                    ui.add(egui::Slider::new(&mut pulse.max_scale, 1.0..=2.0));
                    ui.end_row();
                });
        });
}
