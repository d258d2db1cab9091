use eframe::egui;

const DISC_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 94, 0);
const GLOW_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 157, 92);

/// Renders the pulse: a disc that grows with the current pulse scale.
pub struct VisualEngine {
    max_scale: f32,
}

impl VisualEngine {
    pub fn new(max_scale: f32) -> Self {
        Self { max_scale }
    }

    pub fn set_max_scale(&mut self, max_scale: f32) {
        self.max_scale = max_scale;
    }

    pub fn render(&mut self, ctx: &egui::Context, scale: f32, playing: bool) {
        egui::CentralPanel::default()
            .frame(
                egui::Frame::default()
                    .fill(egui::Color32::BLACK)
                    .inner_margin(0.0),
            )
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let painter = ui.painter();
                let center = rect.center();
                let base_radius = rect.width().min(rect.height()) * 0.25;

                if !playing {
                    painter.circle_stroke(
                        center,
                        base_radius,
                        egui::Stroke::new(2.0, egui::Color32::from_gray(80)),
                    );
                    return;
                }

                // 0 at rest, 1 at the largest possible pulse
                let intensity = if self.max_scale > 1.0 {
                    ((scale - 1.0) / (self.max_scale - 1.0)).clamp(0.0, 1.0)
                } else {
                    0.0
                };

                let glow_alpha = (intensity * 160.0) as u8;
                painter.circle_filled(
                    center,
                    base_radius * scale * 1.2,
                    egui::Color32::from_rgba_unmultiplied(
                        GLOW_COLOR.r(),
                        GLOW_COLOR.g(),
                        GLOW_COLOR.b(),
                        glow_alpha,
                    ),
                );
                painter.circle_filled(center, base_radius * scale, DISC_COLOR);
            });

        ctx.request_repaint();
    }
}
