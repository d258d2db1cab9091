use eframe::egui;
use radiopulse::detector::DetectorState;
use radiopulse::session::FrameOutput;

pub fn render_live_monitoring(
    ui: &mut egui::Ui,
    output: Option<&FrameOutput>,
    state: Option<DetectorState>,
    loudness: Option<f32>,
    hits: u64,
) {
    ui.label(egui::RichText::new("Live Monitoring").size(16.0));
    ui.add_space(8.0);

    render_analyzer_metrics(ui, output, loudness);
    ui.add_space(8.0);

    render_detector_output(ui, output, state, hits);
    ui.add_space(12.0);
}

fn render_analyzer_metrics(ui: &mut egui::Ui, output: Option<&FrameOutput>, loudness: Option<f32>) {
    ui.group(|ui| {
        ui.colored_label(egui::Color32::LIGHT_BLUE, "Analyzer Output:");
        ui.horizontal(|ui| {
            ui.label("Loudness:");
            match loudness {
                Some(loudness) => ui.strong(format!("{:.1}%", loudness * 100.0)),
                None => ui.weak("n/a"),
            };

            ui.separator();

            ui.label("Bass Energy:");
            match output {
                Some(output) => ui.strong(format!("{:.1} / 255", output.energy)),
                None => ui.weak("n/a"),
            };
        });
    });
}

fn render_detector_output(
    ui: &mut egui::Ui,
    output: Option<&FrameOutput>,
    state: Option<DetectorState>,
    hits: u64,
) {
    ui.group(|ui| {
        ui.colored_label(egui::Color32::LIGHT_GREEN, "Detector Output:");
        ui.horizontal(|ui| {
            let Some(state) = state else {
                ui.colored_label(egui::Color32::GRAY, "Stopped");
                return;
            };

            ui.label("Previous:");
            ui.strong(format!("{:.1}", state.previous_energy));

            ui.separator();

            ui.label("Cooldown:");
            ui.strong(state.cooldown_ticks.to_string());

            ui.separator();

            ui.label("Hits:");
            ui.strong(hits.to_string());

            ui.separator();

            if let Some(hit) = output.and_then(|output| output.hit) {
                ui.colored_label(egui::Color32::RED, format!("HIT ({:.0})", hit.power));
            } else {
                ui.colored_label(egui::Color32::GRAY, "Normal");
            }
        });
    });
}
