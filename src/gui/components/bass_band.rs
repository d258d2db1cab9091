use eframe::egui;

use radiopulse::session::FrameOutput;

/// `upper_hz` is where the band ends, if the source knows its sample rate.
pub fn render_bass_band(
    ui: &mut egui::Ui,
    output: Option<&FrameOutput>,
    threshold: f32,
    upper_hz: Option<f32>,
) {
    ui.group(|ui| {
        match upper_hz {
            Some(upper_hz) => ui.label(format!("Bass Band (0 - {upper_hz:.0} Hz)")),
            None => ui.label("Bass Band"),
        };

        let desired_height = 120.0;
        let (response, painter) = ui.allocate_painter(
            egui::vec2(ui.available_width(), desired_height),
            egui::Sense::hover(),
        );

        let rect = response.rect;

        // Draw background
        painter.rect_filled(rect, 0.0, egui::Color32::from_gray(20));

        let level_to_y = |level: f32| rect.bottom() - (level / 255.0) * rect.height();

        if let Some(output) = output.filter(|output| !output.bass_band.is_empty()) {
            let bins = output.bass_band.len();
            let slot = rect.width() / bins as f32;
            let color = if output.hit.is_some() {
                egui::Color32::from_rgb(255, 94, 0)
            } else {
                egui::Color32::from_rgb(100, 200, 255)
            };

            for (i, &magnitude) in output.bass_band.iter().enumerate() {
                let left = rect.left() + i as f32 * slot;
                let bar = egui::Rect::from_min_max(
                    egui::pos2(left + slot * 0.1, level_to_y(magnitude as f32)),
                    egui::pos2(left + slot * 0.9, rect.bottom()),
                );
                painter.rect_filled(bar, 0.0, color);
            }

            // Mean energy of the frame
            let energy_y = level_to_y(output.energy);
            painter.line_segment(
                [
                    egui::pos2(rect.left(), energy_y),
                    egui::pos2(rect.right(), energy_y),
                ],
                egui::Stroke::new(1.0, egui::Color32::WHITE),
            );
        }

        // Absolute threshold
        let threshold_y = level_to_y(threshold);
        painter.line_segment(
            [
                egui::pos2(rect.left(), threshold_y),
                egui::pos2(rect.right(), threshold_y),
            ],
            egui::Stroke::new(1.0, egui::Color32::RED),
        );
    });
}
